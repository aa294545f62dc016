//! # Types Module
//!
//! The reflective metadata model the configuration compiler works from.
//!
//! - [`TypeRef`] describes a (possibly generic) type: primitive, raw or
//!   parameterized class, array, type variable or wildcard.
//! - [`TypeUniverse`] is the class path: class definitions, their properties,
//!   supertypes, annotations and methods, plus registered transformers.
//! - The classifier (`classify`) decides whether a type is repeated, an enum,
//!   map-like, the universal `Object`, injected, or a scalar parameter type.
//!
//! ## Type Expression Syntax
//!
//! Model files spell types as text: `int`, `String`, `List<Foo>`,
//! `Map<String, Foo>`, `byte[]`, `T`, `?`, `? extends Foo`. A single
//! upper-case letter optionally followed by digits is a type variable.

mod classify;
mod type_ref;
mod universe;

pub use type_ref::{Primitive, TypeRef};
pub use universe::*;
