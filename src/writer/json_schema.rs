//! JSON rendering of compiled schemas, shared by the writers.

use crate::error::Result;
use crate::schema::{Field, FieldType, Schema, SchemaRepository, SchemaType};
use serde_json::{json, Map, Value};

/// Reference and type conventions of the target document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavor {
    /// `{"$ref": "Foo"}`, `id` on every schema, `any` for untyped values,
    /// 64-bit integers as strings.
    Discovery,
    /// `{"$ref": "#/components/schemas/Foo"}`, `{}` for untyped values.
    OpenApi,
}

impl Flavor {
    pub(crate) fn reference(&self, name: &str) -> Value {
        match self {
            Flavor::Discovery => json!({ "$ref": name }),
            Flavor::OpenApi => json!({ "$ref": format!("#/components/schemas/{name}") }),
        }
    }

    fn untyped(&self) -> Value {
        match self {
            Flavor::Discovery => json!({ "type": "any" }),
            Flavor::OpenApi => json!({}),
        }
    }

    /// `type`/`format` pair of a scalar.
    pub(crate) fn scalar(&self, field_type: FieldType) -> Map<String, Value> {
        let (ty, format) = match self {
            Flavor::Discovery => field_type.discovery_type(),
            Flavor::OpenApi => field_type.openapi_type(),
        };
        let mut out = Map::new();
        out.insert("type".to_string(), json!(ty));
        if let Some(format) = format {
            out.insert("format".to_string(), json!(format));
        }
        out
    }

    /// Reference to `schema`, or an inline untyped value for the "any" schema.
    pub(crate) fn schema_reference(&self, schema: &Schema) -> Value {
        if schema.is_any() {
            self.untyped()
        } else {
            self.reference(&schema.name)
        }
    }
}

/// Render a schema definition.
pub(crate) fn schema_json(schema: &Schema, repo: &SchemaRepository, flavor: Flavor) -> Result<Value> {
    let mut out = Map::new();
    if flavor == Flavor::Discovery {
        out.insert("id".to_string(), json!(schema.name));
    }
    match schema.schema_type {
        SchemaType::Any => return Ok(flavor.untyped()),
        SchemaType::String => {
            out.insert("type".to_string(), json!("string"));
        }
        SchemaType::Object => {
            out.insert("type".to_string(), json!("object"));
        }
    }
    if let Some(description) = &schema.description {
        out.insert("description".to_string(), json!(description));
    }
    if schema.is_enum() {
        out.insert("enum".to_string(), json!(schema.enum_values));
        if flavor == Flavor::Discovery {
            out.insert("enumDescriptions".to_string(), json!(schema.enum_descriptions));
        }
    }
    if schema.schema_type == SchemaType::Object {
        if schema.fields.is_empty() && flavor == Flavor::OpenApi {
            out.insert("additionalProperties".to_string(), json!(true));
        }
        if !schema.fields.is_empty() {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for (name, field) in &schema.fields {
                properties.insert(name.clone(), field_json(field, repo, flavor)?);
                if field.required == Some(true) {
                    required.push(name.clone());
                }
            }
            out.insert("properties".to_string(), Value::Object(properties));
            if flavor == Flavor::OpenApi && !required.is_empty() {
                out.insert("required".to_string(), json!(required));
            }
        }
    }
    Ok(Value::Object(out))
}

fn field_json(field: &Field, repo: &SchemaRepository, flavor: Flavor) -> Result<Value> {
    let mut out = match field.field_type {
        FieldType::Array => {
            let mut out = Map::new();
            out.insert("type".to_string(), json!("array"));
            if let Some(item) = &field.array_item {
                out.insert("items".to_string(), field_json(item, repo, flavor)?);
            }
            out
        }
        FieldType::Object | FieldType::Enum => match &field.schema_reference {
            Some(reference) => {
                let target = repo.resolve(reference)?;
                match flavor.schema_reference(&target) {
                    Value::Object(map) => map,
                    _ => Map::new(),
                }
            }
            None => flavor.scalar(field.field_type),
        },
        scalar => flavor.scalar(scalar),
    };
    if let Some(description) = &field.description {
        out.insert("description".to_string(), json!(description));
    }
    if flavor == Flavor::Discovery && field.required == Some(true) {
        out.insert("required".to_string(), json!(true));
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::schema::Field;

    #[test]
    fn test_int64_formats_differ_by_flavor() {
        let discovery = Flavor::Discovery.scalar(FieldType::Int64);
        assert_eq!(discovery["type"], "string");
        assert_eq!(discovery["format"], "int64");
        let openapi = Flavor::OpenApi.scalar(FieldType::Int64);
        assert_eq!(openapi["type"], "integer");
    }

    #[test]
    fn test_scalar_object_schema() {
        let repo = SchemaRepository::new();
        let schema = Schema::object("Greeting")
            .with_field(Field::scalar("message", FieldType::String))
            .with_field(Field {
                required: Some(true),
                ..Field::scalar("id", FieldType::Int64)
            });

        let discovery = schema_json(&schema, &repo, Flavor::Discovery).unwrap();
        assert_eq!(discovery["id"], "Greeting");
        assert_eq!(discovery["properties"]["id"]["format"], "int64");
        assert_eq!(discovery["properties"]["id"]["required"], true);

        let openapi = schema_json(&schema, &repo, Flavor::OpenApi).unwrap();
        assert!(openapi.get("id").is_none());
        assert_eq!(openapi["required"], json!(["id"]));
    }
}
