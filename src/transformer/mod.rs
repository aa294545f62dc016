//! # Transformer Registry
//!
//! Transformers are user-pluggable converters between a declared type and the
//! type it is serialized as. A transformer applies to a type either through a
//! type-level annotation ([`ClassDef::transformer`](crate::types::ClassDef))
//! or through a per-API registration in [`ApiSerializationConfig`].
//!
//! A *resource transformer* additionally exposes a [`ResourceSchemaDef`]; it
//! leaves the schema type unchanged and instead supplies the property set and
//! name the schema repository builds from.
//!
//! ## Resolution
//!
//! [`serializer_classes`] walks the ancestor closure of a type, most specific
//! first. For each ancestor the type-level annotation wins over an API-level
//! registration, and ancestors that are supertypes of an already-matched type
//! are skipped, so the most specific registration shadows the rest.
//!
//! ## Instantiation
//!
//! Constructor shapes are tried in a fixed order: one taking the reflective
//! type argument, one taking the raw class, then the no-argument one. The
//! first shape the transformer offers is used; if it offers none of them the
//! failure names the transformer, the attempted shapes and the requested type.

use crate::error::{ApiConfigError, Result};
use crate::types::{TypeRef, TypeUniverse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[cfg(test)]
mod tests;

/// Constructor shapes a transformer class may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorShape {
    /// `new(type: TypeRef)`
    TypeArgument,
    /// `new(class: &str)`
    RawClass,
    /// `new()`
    NoArg,
}

impl ConstructorShape {
    /// Order in which constructor shapes are attempted.
    pub const RESOLUTION_ORDER: [ConstructorShape; 3] = [
        ConstructorShape::TypeArgument,
        ConstructorShape::RawClass,
        ConstructorShape::NoArg,
    ];
}

impl fmt::Display for ConstructorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorShape::TypeArgument => write!(f, "(Type)"),
            ConstructorShape::RawClass => write!(f, "(Class)"),
            ConstructorShape::NoArg => write!(f, "()"),
        }
    }
}

/// Property of a schema exposed by a resource transformer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePropertyDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// Schema exposed by a resource transformer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSchemaDef {
    pub name: Option<String>,
    pub properties: Vec<ResourcePropertyDef>,
}

/// A transformer class as registered in the type universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerDef {
    pub name: String,
    /// Declared source type (the type being transformed).
    pub source: TypeRef,
    /// Serialized type.
    pub target: TypeRef,
    #[serde(default = "default_constructors")]
    pub constructors: Vec<ConstructorShape>,
    /// Present for resource transformers.
    #[serde(default)]
    pub resource: Option<ResourceSchemaDef>,
}

fn default_constructors() -> Vec<ConstructorShape> {
    vec![ConstructorShape::NoArg]
}

impl TransformerDef {
    pub fn new(name: impl Into<String>, source: TypeRef, target: TypeRef) -> Self {
        TransformerDef {
            name: name.into(),
            source,
            target,
            constructors: default_constructors(),
            resource: None,
        }
    }

    pub fn with_constructors(mut self, constructors: &[ConstructorShape]) -> Self {
        self.constructors = constructors.to_vec();
        self
    }

    pub fn with_resource(mut self, resource: ResourceSchemaDef) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn is_resource_transformer(&self) -> bool {
        self.resource.is_some()
    }
}

/// A transformer instantiated for one concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformer {
    pub name: String,
    pub bound_type: TypeRef,
    pub constructor: ConstructorShape,
    /// Serialized type, with the source type's variables bound from `bound_type`.
    pub serialized_type: TypeRef,
    pub resource: Option<ResourceSchemaDef>,
}

impl Transformer {
    pub fn is_resource_transformer(&self) -> bool {
        self.resource.is_some()
    }
}

/// One API-level (source type -> transformer) registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SerializerConfig {
    /// Raw name of the registered source type.
    pub source: String,
    pub transformer: String,
}

/// Per-API serialization rules. Value-equal snapshots of this type key the
/// schema repository and document caches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ApiSerializationConfig {
    serializers: Vec<SerializerConfig>,
}

impl ApiSerializationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `transformer` for its declared source type. A later
    /// registration for the same source type replaces the earlier one.
    pub fn add_serializer(&mut self, universe: &TypeUniverse, transformer: &str) -> Result<()> {
        let def = universe.require_transformer(transformer, "serialization config")?;
        let source = def
            .source
            .raw_name()
            .ok_or_else(|| {
                ApiConfigError::unsupported_type(
                    format!("transformer {transformer}"),
                    &def.source,
                    "transformer source must be a class",
                )
            })?
            .to_string();
        self.serializers.retain(|s| s.source != source);
        self.serializers.push(SerializerConfig {
            source,
            transformer: def.name.clone(),
        });
        Ok(())
    }

    pub fn serializer_config(&self, ty: &TypeRef) -> Option<&SerializerConfig> {
        let raw = ty.raw_name()?;
        self.serializers.iter().find(|s| s.source == raw)
    }

    pub fn serializers(&self) -> &[SerializerConfig] {
        &self.serializers
    }

    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }
}

/// Transformer names that apply to `ty`, most specific first.
pub fn serializer_classes(
    universe: &TypeUniverse,
    ty: &TypeRef,
    config: Option<&ApiSerializationConfig>,
) -> Vec<String> {
    if !matches!(ty, TypeRef::Class { .. }) {
        return Vec::new();
    }
    let mut transformers = Vec::new();
    let mut serialized_types: Vec<TypeRef> = Vec::new();
    for ancestor in universe.supertypes(ty) {
        if serialized_types
            .iter()
            .any(|matched| universe.is_supertype_of(&ancestor, matched))
        {
            continue;
        }
        let annotated = ancestor
            .raw_name()
            .and_then(|raw| universe.class(raw))
            .and_then(|def| def.transformer.clone());
        let registered = || {
            config
                .and_then(|c| c.serializer_config(&ancestor))
                .map(|s| s.transformer.clone())
        };
        if let Some(name) = annotated.or_else(registered) {
            transformers.push(name);
            serialized_types.push(ancestor);
        }
    }
    transformers
}

/// Instantiate transformer `name` for `ty`.
pub fn instantiate(universe: &TypeUniverse, name: &str, ty: &TypeRef) -> Result<Transformer> {
    let def = universe.require_transformer(name, &ty.to_string())?;

    let Some(source_raw) = def.source.raw_name() else {
        return Err(ApiConfigError::TransformerSourceMismatch {
            transformer: def.name.clone(),
            source_type: def.source.to_string(),
            ty: ty.to_string(),
        });
    };
    let Some(source_view) = universe.as_supertype(ty, source_raw) else {
        return Err(ApiConfigError::TransformerSourceMismatch {
            transformer: def.name.clone(),
            source_type: def.source.to_string(),
            ty: ty.to_string(),
        });
    };

    let constructor = ConstructorShape::RESOLUTION_ORDER
        .into_iter()
        .find(|shape| def.constructors.contains(shape))
        .ok_or_else(|| ApiConfigError::TransformerInstantiation {
            transformer: def.name.clone(),
            ty: ty.to_string(),
            attempted: ConstructorShape::RESOLUTION_ORDER
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })?;

    let mut env = HashMap::new();
    for (declared, actual) in def.source.type_args().iter().zip(source_view.type_args()) {
        if let TypeRef::Variable(var) = declared {
            env.insert(var.clone(), actual.clone());
        }
    }

    Ok(Transformer {
        name: def.name.clone(),
        bound_type: ty.clone(),
        constructor,
        serialized_type: def.target.substitute(&env),
        resource: def.resource.clone(),
    })
}

/// The first applicable transformer for `ty`, instantiated.
pub fn primary_transformer(
    universe: &TypeUniverse,
    ty: &TypeRef,
    config: Option<&ApiSerializationConfig>,
) -> Result<Option<Transformer>> {
    match serializer_classes(universe, ty, config).first() {
        Some(name) => instantiate(universe, name, ty).map(Some),
        None => Ok(None),
    }
}

/// The type a schema is built for: the serialized type of the first plain
/// transformer, or `ty` itself when there is none or it is a resource transformer.
pub fn schema_type(
    universe: &TypeUniverse,
    ty: &TypeRef,
    config: Option<&ApiSerializationConfig>,
) -> Result<TypeRef> {
    match primary_transformer(universe, ty, config)? {
        Some(t) if !t.is_resource_transformer() => Ok(t.serialized_type),
        _ => Ok(ty.clone()),
    }
}

/// Resource schema supplied by the first transformer, when it is a resource transformer.
pub fn resource_schema(
    universe: &TypeUniverse,
    ty: &TypeRef,
    config: Option<&ApiSerializationConfig>,
) -> Result<Option<ResourceSchemaDef>> {
    Ok(primary_transformer(universe, ty, config)?.and_then(|t| t.resource))
}

/// Transformer names that apply to the items of repeated `ty`; empty when
/// `ty` is not repeated.
pub fn repeated_item_serializers(
    universe: &TypeUniverse,
    ty: &TypeRef,
    config: Option<&ApiSerializationConfig>,
) -> Vec<String> {
    match universe.array_item_type(ty) {
        Some(item) => serializer_classes(universe, &item, config),
        None => Vec::new(),
    }
}
