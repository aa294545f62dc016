//! # endpoints-config
//!
//! **endpoints-config** compiles annotated service classes into API
//! configuration and renders that configuration as API description documents.
//!
//! ## Overview
//!
//! A service is described by a model file (YAML or JSON) listing its classes,
//! their annotations and the transformers it uses. The crate loads a layered
//! configuration (API, class, method) from those annotations plus any extra
//! config sources, compiles every type a method touches into a canonical
//! schema, validates each API, and hands the result to document writers.
//!
//! ## Architecture
//!
//! - **[`types`]** - Type references, the type universe and the type classifier
//! - **[`transformer`]** - Transformer registry and per-API serialization config
//! - **[`model`]** - Annotation structs and service model loading
//! - **[`config`]** - The layered API/class/method/parameter config model
//! - **[`loader`]** - Config sources, load and reload
//! - **[`schema`]** - Schema model and the cycle-safe schema repository
//! - **[`validator`]** - Pre-emission validation of one API's configs
//! - **[`writer`]** - Legacy, Discovery and OpenAPI writers plus the document cache
//! - **[`generation`]** - Per-API state machine driving validation and emission
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Model as model::load_model
//!     participant Loader as loader::ApiConfigLoader
//!     participant Run as generation::GenerationRun
//!     participant Validator as validator::ApiConfigValidator
//!     participant Writer as writer::ApiConfigWriter
//!     participant Repo as schema::SchemaRepository
//!
//!     Model->>Loader: TypeUniverse + service classes
//!     Loader->>Loader: annotations, then extra sources
//!     Loader-->>Run: Vec<ApiConfig>
//!     Run->>Validator: validate(configs of one API)
//!     Validator-->>Run: VALIDATED or FAILED
//!     Run->>Writer: emit(configs, repo)
//!     Writer->>Repo: get_or_add(type, config)
//!     Repo-->>Writer: Arc<Schema>
//!     Writer-->>Run: document
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use endpoints_config::{
//!     ApiConfigLoader, DiscoveryWriter, GenerationRun, SchemaRepository, ServiceContext,
//! };
//! use std::sync::Arc;
//!
//! let (universe, services) = endpoints_config::load_model("service.yaml")?.into_universe()?;
//! let loader = ApiConfigLoader::new(Arc::new(universe));
//! let context = ServiceContext::from_env();
//! let configs = services
//!     .iter()
//!     .map(|class| loader.load_configuration(&context, class))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! let mut run = GenerationRun::new(configs);
//! let mut repo = SchemaRepository::new();
//! for doc in run.run(&[&DiscoveryWriter::new()], &mut repo, None) {
//!     println!("{}: {} bytes", doc.file_name, doc.content.len());
//! }
//! ```
//!
//! ## Configuration
//!
//! | Variable | Default | Used by |
//! |----------|---------|---------|
//! | `ENDPOINTS_HOSTNAME` | `localhost` | [`ServiceContext::from_env`] |
//! | `ENDPOINTS_PROTOCOL` | `https` | [`ServiceContext::from_env`] |
//! | `ENDPOINTS_DEFAULT_API_NAME` | `myapi` | [`ServiceContext::from_env`] |
//! | `ENDPOINTS_DOC_CACHE_SIZE` | `64` | [`RuntimeConfig::from_env`] |
//! | `ENDPOINTS_LOG_LEVEL` | `info` | [`logging::LogConfig::from_env`] |
//! | `ENDPOINTS_LOG_FORMAT` | `pretty` | [`logging::LogConfig::from_env`] |

pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod loader;
pub mod logging;
pub mod model;
pub mod naming;
pub mod runtime_config;
pub mod schema;
pub mod transformer;
pub mod types;
pub mod validator;
pub mod writer;

pub use config::{ApiConfig, ApiKey, ApiMethodConfig, ApiParameterConfig, Classification};
pub use context::ServiceContext;
pub use error::{ApiConfigError, Result};
pub use generation::{ApiState, GeneratedDocument, GenerationRun};
pub use loader::{ApiConfigLoader, ApiConfigSource};
pub use model::{load_model, parse_model, ServiceModel};
pub use runtime_config::RuntimeConfig;
pub use schema::{Schema, SchemaRepository};
pub use types::{TypeRef, TypeUniverse};
pub use validator::ApiConfigValidator;
pub use writer::{ApiConfigWriter, DiscoveryWriter, DocumentCache, LegacyJsonWriter, OpenApiWriter};
