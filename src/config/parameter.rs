use crate::error::{ApiConfigError, Result};
use crate::schema::FieldType;
use crate::transformer::{self, ApiSerializationConfig};
use crate::types::{TypeRef, TypeUniverse};
use serde::Serialize;

/// Query parameter names reserved by the serving infrastructure. A method
/// parameter with one of these names is supplied by the framework.
pub const STANDARD_PARAMETERS: [&str; 11] = [
    "alt",
    "fields",
    "key",
    "oauth_token",
    "prettyPrint",
    "quotaUser",
    "userIp",
    "trace",
    "callback",
    "access_token",
    "upload_protocol",
];

/// How a method parameter travels. Always derived from the parameter's
/// current name, type and the API's serialization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Supplied by the framework (request, user, context, standard parameters).
    Injected,
    /// Path or query parameter (scalar, enum, or repeated scalar).
    ApiParameter,
    /// The request body.
    Resource,
    /// The type still mentions a type variable or wildcard.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiParameterConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub nullable: bool,
    pub default_value: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Explicit transformer override for the parameter type.
    pub serializers: Option<Vec<String>>,
    /// Explicit transformer override for the item type of a repeated parameter.
    pub repeated_item_serializers: Option<Vec<String>>,
}

impl ApiParameterConfig {
    pub fn new(ty: TypeRef) -> Self {
        ApiParameterConfig {
            name: None,
            description: None,
            nullable: false,
            default_value: None,
            ty,
            serializers: None,
            repeated_item_serializers: None,
        }
    }

    pub fn named(ty: TypeRef, name: impl Into<String>) -> Self {
        ApiParameterConfig {
            name: Some(name.into()),
            ..ApiParameterConfig::new(ty)
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Neither nullable nor defaulted.
    pub fn is_required(&self) -> bool {
        !self.nullable && self.default_value.is_none()
    }

    pub fn effective_serializers(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Vec<String> {
        match &self.serializers {
            Some(explicit) => explicit.clone(),
            None => transformer::serializer_classes(universe, &self.ty, Some(serialization)),
        }
    }

    /// The type the parameter is serialized as, after its first transformer.
    pub fn schema_base_type(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Result<TypeRef> {
        apply_first(universe, &self.ty, &self.effective_serializers(universe, serialization))
    }

    pub fn is_repeated(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Result<bool> {
        Ok(universe.is_array_type(&self.schema_base_type(universe, serialization)?))
    }

    pub fn repeated_item_type(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Result<Option<TypeRef>> {
        Ok(universe.array_item_type(&self.schema_base_type(universe, serialization)?))
    }

    pub fn effective_repeated_item_serializers(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Result<Vec<String>> {
        if let Some(explicit) = &self.repeated_item_serializers {
            return Ok(explicit.clone());
        }
        let base = self.schema_base_type(universe, serialization)?;
        Ok(transformer::repeated_item_serializers(
            universe,
            &base,
            Some(serialization),
        ))
    }

    /// Item type of a repeated parameter, after the item's first transformer.
    pub fn schema_repeated_item_type(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Result<Option<TypeRef>> {
        let Some(item) = self.repeated_item_type(universe, serialization)? else {
            return Ok(None);
        };
        let serializers = self.effective_repeated_item_serializers(universe, serialization)?;
        apply_first(universe, &item, &serializers).map(Some)
    }

    pub fn classification(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Result<Classification> {
        if universe.is_injected_type(&self.ty)
            || self
                .name
                .as_deref()
                .is_some_and(|n| STANDARD_PARAMETERS.contains(&n))
        {
            return Ok(Classification::Injected);
        }
        if self.ty.is_unresolved() {
            return Ok(Classification::Unknown);
        }
        let base = self.schema_base_type(universe, serialization)?;
        if base.is_unresolved() {
            return Ok(Classification::Unknown);
        }
        if universe.is_parameter_type(&base) {
            return Ok(Classification::ApiParameter);
        }
        if let Some(item) = self.schema_repeated_item_type(universe, serialization)? {
            if item.is_unresolved() {
                return Ok(Classification::Unknown);
            }
            if universe.is_parameter_type(&item) {
                return Ok(Classification::ApiParameter);
            }
        }
        Ok(Classification::Resource)
    }

    /// Check that the default value converts to the parameter's scalar type.
    pub fn validate_default_value(
        &self,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
        method: &str,
    ) -> Result<()> {
        let Some(value) = &self.default_value else {
            return Ok(());
        };
        if self.classification(universe, serialization)? != Classification::ApiParameter {
            return Ok(());
        }
        let scalar = match self.schema_repeated_item_type(universe, serialization)? {
            Some(item) => item,
            None => self.schema_base_type(universe, serialization)?,
        };
        let valid = match universe.field_type(&scalar) {
            Some(FieldType::Int8) => value.trim().parse::<i8>().is_ok(),
            Some(FieldType::Int16) => value.trim().parse::<i16>().is_ok(),
            Some(FieldType::Int32) => value.trim().parse::<i32>().is_ok(),
            Some(FieldType::Int64) => value.trim().parse::<i64>().is_ok(),
            Some(FieldType::Float) => value.trim().parse::<f32>().is_ok(),
            Some(FieldType::Double) => value.trim().parse::<f64>().is_ok(),
            Some(FieldType::Boolean) => matches!(value.to_ascii_lowercase().as_str(), "true" | "false"),
            Some(FieldType::Enum) => scalar
                .raw_name()
                .and_then(|raw| universe.class(raw))
                .is_some_and(|def| def.enum_constants.iter().any(|c| c == value)),
            _ => true,
        };
        if valid {
            Ok(())
        } else {
            Err(ApiConfigError::InvalidParameterDefault {
                method: method.to_string(),
                parameter: self.display_name().to_string(),
                value: value.clone(),
                ty: scalar.to_string(),
            })
        }
    }
}

fn apply_first(universe: &TypeUniverse, ty: &TypeRef, serializers: &[String]) -> Result<TypeRef> {
    match serializers.first() {
        Some(name) => {
            let t = transformer::instantiate(universe, name, ty)?;
            if t.is_resource_transformer() {
                Ok(ty.clone())
            } else {
                Ok(t.serialized_type)
            }
        }
        None => Ok(ty.clone()),
    }
}
