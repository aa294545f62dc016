//! # Writer Module
//!
//! Document writers turn the validated configs of one API into a wire
//! document. Each writer is a pure function of its input plus a fixed
//! file extension and content type.
//!
//! ## Writers
//!
//! - [`LegacyJsonWriter`]: the `.api` configuration consumed by the gateway
//! - [`DiscoveryWriter`]: a Discovery REST description
//! - [`OpenApiWriter`]: an OpenAPI 3.1 document
//!
//! ## Validation
//!
//! [`ApiConfigWriter::write_config`] validates before emitting and surfaces
//! the validator's typed errors unchanged. Callers that already validated
//! (such as [`GenerationRun`](crate::generation::GenerationRun)) call
//! [`ApiConfigWriter::emit`] directly.
//!
//! ## Caching
//!
//! [`DocumentCache`] keeps rendered documents keyed by a fingerprint of the
//! configs they were rendered from, so a changed config never hits a stale
//! entry.

mod cache;
mod discovery;
mod json_schema;
mod legacy;
mod openapi;


pub use cache::{DocumentCache, DocumentCacheStats};
pub use discovery::DiscoveryWriter;
pub use legacy::LegacyJsonWriter;
pub use openapi::OpenApiWriter;

use crate::config::{path_parameters, ApiConfig, ApiParameterConfig, Classification, MethodScope};
use crate::error::{ApiConfigError, Result};
use crate::schema::{FieldType, Schema, SchemaRepository};
use crate::validator::ApiConfigValidator;
use std::sync::Arc;

/// Renders the configs of one API key as a document.
pub trait ApiConfigWriter {
    /// Short format name used in logs and errors.
    fn format_name(&self) -> &'static str;

    /// File extension of emitted documents, without the leading dot.
    fn file_extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    /// Render already validated configs sharing one API key.
    fn emit(&self, configs: &[ApiConfig], repo: &mut SchemaRepository) -> Result<String>;

    /// Validate, then render.
    fn write_config(&self, configs: &[ApiConfig], repo: &mut SchemaRepository) -> Result<String> {
        ApiConfigValidator::new().validate(configs)?;
        self.emit(configs, repo)
    }
}

/// Where an API parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParameterLocation {
    Path,
    Query,
}

impl ParameterLocation {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
        }
    }
}

/// An API parameter as every writer renders it.
#[derive(Debug, Clone)]
pub(crate) struct MethodParameter {
    pub(crate) name: String,
    pub(crate) location: ParameterLocation,
    pub(crate) required: bool,
    pub(crate) repeated: bool,
    /// Field type of the value (of each item, when repeated).
    pub(crate) field_type: FieldType,
    pub(crate) enum_values: Vec<String>,
    pub(crate) default_value: Option<String>,
    pub(crate) description: Option<String>,
}

/// The request body of a method.
pub(crate) struct RequestBody {
    pub(crate) parameter_name: String,
    pub(crate) schema: Arc<Schema>,
}

/// Methods of every config in the group that are not ignored, in order.
pub(crate) fn active_methods(configs: &[ApiConfig]) -> Vec<MethodScope<'_>> {
    configs
        .iter()
        .flat_map(|config| config.class_scope().methods())
        .filter(|m| !m.config().ignored)
        .collect()
}

/// API parameters of `method`, path parameters first in path order, then
/// query parameters in declaration order.
pub(crate) fn method_parameters(method: &MethodScope<'_>) -> Result<Vec<MethodParameter>> {
    let api = method.api();
    let universe = api.universe();
    let serialization = &api.serialization_config;
    let config = method.config();
    let in_path = path_parameters(&config.path);

    let mut path = Vec::new();
    let mut query = Vec::new();
    for param in &config.parameters {
        if param.classification(universe, serialization)? != Classification::ApiParameter {
            continue;
        }
        let Some(name) = &param.name else {
            continue;
        };
        let repeated_item = param.schema_repeated_item_type(universe, serialization)?;
        let scalar = match &repeated_item {
            Some(item) => item.clone(),
            None => param.schema_base_type(universe, serialization)?,
        };
        let field_type = universe.field_type(&scalar).ok_or_else(|| {
            ApiConfigError::unsupported_type(
                config.endpoint_method.qualified_name(),
                &scalar,
                "parameter type is unresolved",
            )
        })?;
        let enum_values = if field_type == FieldType::Enum {
            scalar
                .raw_name()
                .and_then(|raw| universe.class(raw))
                .map(|def| def.enum_constants.clone())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        let location = if in_path.contains(name) {
            ParameterLocation::Path
        } else {
            ParameterLocation::Query
        };
        let rendered = MethodParameter {
            name: name.clone(),
            location,
            required: location == ParameterLocation::Path || param.is_required(),
            repeated: repeated_item.is_some(),
            field_type,
            enum_values,
            default_value: param.default_value.clone(),
            description: param.description.clone(),
        };
        match location {
            ParameterLocation::Path => path.push(rendered),
            ParameterLocation::Query => query.push(rendered),
        }
    }
    path.sort_by_key(|p| in_path.iter().position(|n| *n == p.name));
    path.extend(query);
    Ok(path)
}

/// The resource parameter's schema, if the method takes one.
pub(crate) fn request_body(
    method: &MethodScope<'_>,
    repo: &mut SchemaRepository,
) -> Result<Option<RequestBody>> {
    let api = method.api();
    let universe = api.universe();
    let serialization = &api.serialization_config;
    let resource = method.config().parameters.iter().find_map(|p| {
        match p.classification(universe, serialization) {
            Ok(Classification::Resource) => Some(Ok(p)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }
    });
    let Some(param) = resource.transpose()? else {
        return Ok(None);
    };
    let ty = param.schema_base_type(universe, serialization)?;
    Ok(Some(RequestBody {
        parameter_name: resource_parameter_name(param),
        schema: repo.get_or_add(&ty, api)?,
    }))
}

fn resource_parameter_name(param: &ApiParameterConfig) -> String {
    param.name.clone().unwrap_or_else(|| "resource".to_string())
}

/// The return type's schema, if the method returns a value.
pub(crate) fn response_schema(
    method: &MethodScope<'_>,
    repo: &mut SchemaRepository,
) -> Result<Option<Arc<Schema>>> {
    match method.config().return_type() {
        Some(ty) => repo.get_or_add(ty, method.api()).map(Some),
        None => Ok(None),
    }
}

/// Every schema used by the API, sorted by name. The shared "any" schema is
/// never listed.
pub(crate) fn api_schemas(config: &ApiConfig, repo: &SchemaRepository) -> Vec<Arc<Schema>> {
    let mut schemas = repo.get_all_schemas(&config.api_key());
    schemas.retain(|s| !s.is_any());
    schemas.sort_by(|a, b| a.name.cmp(&b.name));
    schemas
}

/// `Foo`, `fooBar` -> `FooBar`; used to build operation ids.
pub(crate) fn camel_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(crate::naming::capitalize)
        .collect::<Vec<_>>()
        .concat()
}

pub(crate) fn render_error(format: &str, config: &ApiConfig, message: impl Into<String>) -> ApiConfigError {
    ApiConfigError::Render {
        format: format.to_string(),
        api: config.api_key().to_string(),
        message: message.into(),
    }
}

/// The group's representative config, or a render error for an empty group.
pub(crate) fn first_config<'a>(format: &str, configs: &'a [ApiConfig]) -> Result<&'a ApiConfig> {
    configs.first().ok_or_else(|| ApiConfigError::Render {
        format: format.to_string(),
        api: "<none>".to_string(),
        message: "no configs to render".to_string(),
    })
}
