use crate::transformer::ApiSerializationConfig;
use crate::types::TypeRef;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Classified type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    Date,
    DateTime,
    Boolean,
    ByteString,
    Enum,
    Object,
    Array,
}

impl FieldType {
    /// Values that fit in a path or query string. Enums count as scalars.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldType::Object | FieldType::Array)
    }

    /// Discovery `(type, format)`. 64-bit integers travel as strings.
    pub fn discovery_type(&self) -> (&'static str, Option<&'static str>) {
        match self {
            FieldType::String | FieldType::Enum => ("string", None),
            FieldType::Int8 | FieldType::Int16 | FieldType::Int32 => ("integer", Some("int32")),
            FieldType::Int64 => ("string", Some("int64")),
            FieldType::Float => ("number", Some("float")),
            FieldType::Double => ("number", Some("double")),
            FieldType::Boolean => ("boolean", None),
            FieldType::ByteString => ("string", Some("byte")),
            FieldType::Date => ("string", Some("date")),
            FieldType::DateTime => ("string", Some("date-time")),
            FieldType::Object => ("object", None),
            FieldType::Array => ("array", None),
        }
    }

    /// OpenAPI `(type, format)`.
    pub fn openapi_type(&self) -> (&'static str, Option<&'static str>) {
        match self {
            FieldType::Int64 => ("integer", Some("int64")),
            other => other.discovery_type(),
        }
    }
}

/// Kind of a compiled schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    /// Strings, including enums (which carry `enum_values`).
    String,
    /// Untyped value.
    Any,
}

/// Lazy pointer to another schema in a [`SchemaRepository`](super::SchemaRepository).
///
/// Fields store references rather than schemas so a bean can refer to
/// itself, or to a schema that is still being built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaReference {
    /// Type after transformer resolution.
    pub ty: TypeRef,
    pub serialization: ApiSerializationConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Set for `Object` and `Enum` fields.
    pub schema_reference: Option<SchemaReference>,
    /// Set for `Array` fields.
    pub array_item: Option<Box<Field>>,
    pub description: Option<String>,
    pub required: Option<bool>,
}

impl Field {
    pub fn scalar(name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            name: name.into(),
            field_type,
            schema_reference: None,
            array_item: None,
            description: None,
            required: None,
        }
    }
}

/// A compiled, immutable schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub schema_type: SchemaType,
    /// Ordered by field name.
    pub fields: BTreeMap<String, Field>,
    pub enum_values: Vec<String>,
    pub enum_descriptions: Vec<String>,
    pub description: Option<String>,
}

/// Name of the shared untyped schema.
pub const ANY_SCHEMA_NAME: &str = "_any";
/// Name of the shared untyped map schema.
pub const MAP_SCHEMA_NAME: &str = "JsonMap";

impl Schema {
    pub fn object(name: impl Into<String>) -> Self {
        Schema {
            name: name.into(),
            schema_type: SchemaType::Object,
            fields: BTreeMap::new(),
            enum_values: Vec::new(),
            enum_descriptions: Vec::new(),
            description: None,
        }
    }

    pub(crate) fn any() -> Arc<Schema> {
        Arc::new(Schema {
            schema_type: SchemaType::Any,
            ..Schema::object(ANY_SCHEMA_NAME)
        })
    }

    pub(crate) fn map() -> Arc<Schema> {
        Arc::new(Schema::object(MAP_SCHEMA_NAME))
    }

    pub fn is_any(&self) -> bool {
        self.schema_type == SchemaType::Any
    }

    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}
