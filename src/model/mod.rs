//! # Model Module
//!
//! Annotation structs and service-model loading.
//!
//! A service model is the serializable stand-in for annotated classes on a
//! class path. It is read from YAML or JSON and registered into a
//! [`TypeUniverse`](crate::types::TypeUniverse):
//!
//! ```yaml
//! services: [GreetingEndpoint]
//! classes:
//!   - name: Greeting
//!     properties:
//!       - { name: message, type: String }
//!   - name: GreetingEndpoint
//!     api: { name: greetings, version: v1 }
//!     methods:
//!       - name: getGreeting
//!         return_type: Greeting
//!         params:
//!           - { type: int, name: id }
//! ```

mod annotations;
mod load;

pub use annotations::*;
pub use load::{load_model, parse_model, ServiceModel};
