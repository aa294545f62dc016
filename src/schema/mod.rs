//! # Schema Module
//!
//! Compiles resolved types into a canonical, de-duplicated graph of
//! [`Schema`] nodes.
//!
//! ## Construction
//!
//! [`SchemaRepository::get_or_add`] resolves the type through the API's
//! transformers, then builds by classification:
//!
//! 1. scalars and primitives are rejected (they cannot stand as resources)
//! 2. repeated types become an `<Item>Collection` object with one `items` field
//! 3. `Object` maps to the shared "any" schema
//! 4. map-like types map to the shared `JsonMap` schema
//! 5. enums become string schemas listing their constants
//! 6. beans are built field by field from their properties
//!
//! ## Cycles
//!
//! A placeholder slot is installed before recursing into items or
//! properties. Fields hold [`SchemaReference`]s, so a bean that refers to
//! itself terminates and its reference later resolves to the finished schema.
//! A placeholder reaching a public caller is a
//! [`RepositoryIntegrity`](crate::error::ApiConfigError::RepositoryIntegrity) error.

mod model;
mod repository;


pub use model::{
    Field, FieldType, Schema, SchemaReference, SchemaType, ANY_SCHEMA_NAME, MAP_SCHEMA_NAME,
};
pub use repository::SchemaRepository;
