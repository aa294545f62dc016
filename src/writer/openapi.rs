//! OpenAPI 3.1 writer.

use super::json_schema::{schema_json, Flavor};
use super::{
    active_methods, api_schemas, camel_join, first_config, method_parameters, render_error,
    request_body, response_schema, ApiConfigWriter, MethodParameter,
};
use crate::config::{ApiConfig, MethodScope};
use crate::error::Result;
use crate::schema::SchemaRepository;
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

const FORMAT: &str = "openapi";
const OPENAPI_VERSION: &str = "3.1.0";
const API_KEY_SCHEME: &str = "api_key";

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiWriter;

impl OpenApiWriter {
    pub fn new() -> Self {
        OpenApiWriter
    }
}

impl ApiConfigWriter for OpenApiWriter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn file_extension(&self) -> &'static str {
        "openapi.json"
    }

    fn emit(&self, configs: &[ApiConfig], repo: &mut SchemaRepository) -> Result<String> {
        let api = first_config(FORMAT, configs)?;

        let mut paths: Map<String, Value> = Map::new();
        let mut needs_api_key = false;
        for method in active_methods(configs) {
            needs_api_key |= method.api_key_required();
            let path = format!("/{}", method.config().path);
            let verb = method.config().http_method.as_str().to_ascii_lowercase();
            let operation = operation_json(&method, repo)?;
            if let Value::Object(item) = paths.entry(path).or_insert_with(|| json!({})) {
                item.insert(verb, operation);
            }
        }

        let mut schemas = Map::new();
        for schema in api_schemas(api, repo) {
            schemas.insert(schema.name.clone(), schema_json(&schema, repo, Flavor::OpenApi)?);
        }
        let mut components = Map::new();
        components.insert("schemas".to_string(), Value::Object(schemas));
        if needs_api_key {
            components.insert(
                "securitySchemes".to_string(),
                json!({ API_KEY_SCHEME: { "type": "apiKey", "name": "key", "in": "query" } }),
            );
        }

        let mut info = Map::new();
        info.insert(
            "title".to_string(),
            json!(api.title.as_deref().unwrap_or(&api.name)),
        );
        info.insert("version".to_string(), json!(api.version));
        if let Some(v) = &api.description {
            info.insert("description".to_string(), json!(v));
        }

        let doc = json!({
            "openapi": OPENAPI_VERSION,
            "info": info,
            "servers": [{ "url": server_url(api)? }],
            "paths": paths,
            "components": components,
        });
        debug!(api = %api.api_key(), paths = doc["paths"].as_object().map_or(0, Map::len), "Rendered OpenAPI document");
        serde_json::to_string_pretty(&doc).map_err(|e| render_error(FORMAT, api, e.to_string()))
    }
}

/// `{root}/{name}/{version}`, checked to be an absolute URL.
fn server_url(api: &ApiConfig) -> Result<String> {
    let root = Url::parse(&format!("{}/", api.root.trim_end_matches('/')))
        .map_err(|e| render_error(FORMAT, api, format!("invalid root '{}': {e}", api.root)))?;
    let server = root
        .join(&format!("{}/{}", api.name, api.version))
        .map_err(|e| render_error(FORMAT, api, e.to_string()))?;
    Ok(server.to_string())
}

fn operation_json(method: &MethodScope<'_>, repo: &mut SchemaRepository) -> Result<Value> {
    let config = method.config();
    let api = method.api();
    let mut op = Map::new();
    op.insert(
        "operationId".to_string(),
        json!(camel_join([
            api.name.as_str(),
            api.version.as_str(),
            config.endpoint_method.name.as_str(),
        ])),
    );
    if let Some(v) = &config.description {
        op.insert("description".to_string(), json!(v));
    }

    let params = method_parameters(method)?;
    if !params.is_empty() {
        let rendered: Vec<Value> = params.iter().map(parameter_json).collect();
        op.insert("parameters".to_string(), json!(rendered));
    }

    if let Some(body) = request_body(method, repo)? {
        op.insert(
            "requestBody".to_string(),
            json!({
                "content": {
                    "application/json": { "schema": Flavor::OpenApi.schema_reference(&body.schema) }
                }
            }),
        );
    }

    let responses = match response_schema(method, repo)? {
        Some(schema) => json!({
            config.effective_response_status().to_string(): {
                "description": "A successful response",
                "content": {
                    "application/json": { "schema": Flavor::OpenApi.schema_reference(&schema) }
                }
            }
        }),
        None => json!({
            config.effective_response_status().to_string(): {
                "description": "A successful response"
            }
        }),
    };
    op.insert("responses".to_string(), responses);

    if method.api_key_required() {
        op.insert("security".to_string(), json!([{ API_KEY_SCHEME: [] }]));
    }
    Ok(Value::Object(op))
}

fn parameter_json(param: &MethodParameter) -> Value {
    let mut schema = Flavor::OpenApi.scalar(param.field_type);
    if !param.enum_values.is_empty() {
        schema.insert("enum".to_string(), json!(param.enum_values));
    }
    if let Some(v) = &param.default_value {
        schema.insert("default".to_string(), json!(v));
    }
    let schema = if param.repeated {
        json!({ "type": "array", "items": schema })
    } else {
        Value::Object(schema)
    };

    let mut out = Map::new();
    out.insert("name".to_string(), json!(param.name));
    out.insert("in".to_string(), json!(param.location.as_str()));
    if let Some(v) = &param.description {
        out.insert("description".to_string(), json!(v));
    }
    out.insert("required".to_string(), json!(param.required));
    out.insert("schema".to_string(), schema);
    Value::Object(out)
}
