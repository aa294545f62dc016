//! Discovery REST description writer.
//!
//! Methods are nested into resources by the dotted segments of their names:
//! `greetings.list` lands in `resources.greetings.methods.list`, an undotted
//! name stays in the top-level `methods`. The etag is the SHA-256 of the
//! document body rendered without it.

use super::json_schema::{schema_json, Flavor};
use super::{
    active_methods, api_schemas, first_config, method_parameters, render_error, request_body,
    response_schema, ApiConfigWriter, MethodParameter, ParameterLocation,
};
use crate::config::{ApiConfig, MethodScope};
use crate::error::Result;
use crate::schema::SchemaRepository;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use url::Url;

const FORMAT: &str = "discovery";

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryWriter;

impl DiscoveryWriter {
    pub fn new() -> Self {
        DiscoveryWriter
    }
}

impl ApiConfigWriter for DiscoveryWriter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn file_extension(&self) -> &'static str {
        "discovery"
    }

    fn emit(&self, configs: &[ApiConfig], repo: &mut SchemaRepository) -> Result<String> {
        let api = first_config(FORMAT, configs)?;
        let mut body = header(api)?;

        let mut tree = ResourceNode::default();
        let mut scopes = BTreeSet::new();
        for method in active_methods(configs) {
            scopes.extend(method.scope_expression().all_scopes());
            let name = method.config().name.clone();
            let mut segments: Vec<&str> = name.split('.').collect();
            let leaf = segments.pop().unwrap_or_default().to_string();
            tree.insert(&segments, leaf, method_json(&method, repo)?);
        }

        if !scopes.is_empty() {
            let scopes: Map<String, Value> = scopes
                .into_iter()
                .map(|s| {
                    let entry = json!({ "description": s });
                    (s, entry)
                })
                .collect();
            body.insert("auth".to_string(), json!({ "oauth2": { "scopes": scopes } }));
        }

        let mut schemas = Map::new();
        for schema in api_schemas(api, repo) {
            schemas.insert(schema.name.clone(), schema_json(&schema, repo, Flavor::Discovery)?);
        }
        body.insert("schemas".to_string(), Value::Object(schemas));
        tree.write_into(&mut body);

        let etag = etag(&body).map_err(|e| render_error(FORMAT, api, e.to_string()))?;
        let mut doc = Map::new();
        doc.insert("kind".to_string(), json!("discovery#restDescription"));
        doc.insert("etag".to_string(), json!(etag));
        doc.extend(body);

        debug!(api = %api.api_key(), etag = %etag, "Rendered discovery document");
        serde_json::to_string_pretty(&Value::Object(doc))
            .map_err(|e| render_error(FORMAT, api, e.to_string()))
    }
}

/// Quoted hex SHA-256 of the compact body.
fn etag(body: &Map<String, Value>) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(body)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let result = hasher.finalize();
    Ok(format!("\"{:x}\"", result))
}

fn header(api: &ApiConfig) -> Result<Map<String, Value>> {
    let root = Url::parse(&format!("{}/", api.root.trim_end_matches('/')))
        .map_err(|e| render_error(FORMAT, api, format!("invalid root '{}': {e}", api.root)))?;
    let service_path = format!("{}/{}/", api.name, api.version);
    let base = root
        .join(&service_path)
        .map_err(|e| render_error(FORMAT, api, e.to_string()))?;

    let mut doc = Map::new();
    doc.insert("discoveryVersion".to_string(), json!("v1"));
    doc.insert("id".to_string(), json!(format!("{}:{}", api.name, api.version)));
    doc.insert("name".to_string(), json!(api.name));
    doc.insert("version".to_string(), json!(api.version));
    if let Some(v) = &api.title {
        doc.insert("title".to_string(), json!(v));
    }
    doc.insert(
        "description".to_string(),
        json!(api.description.as_deref().unwrap_or("This is an API")),
    );
    if !api.namespace_config.is_empty() {
        doc.insert("ownerDomain".to_string(), json!(api.namespace_config.owner_domain));
        doc.insert("ownerName".to_string(), json!(api.namespace_config.owner_name));
        if !api.namespace_config.package_path.is_empty() {
            doc.insert("packagePath".to_string(), json!(api.namespace_config.package_path));
        }
    }
    if let Some(v) = &api.documentation_link {
        doc.insert("documentationLink".to_string(), json!(v));
    }
    doc.insert("protocol".to_string(), json!("rest"));
    doc.insert("baseUrl".to_string(), json!(base.as_str()));
    doc.insert("basePath".to_string(), json!(base.path()));
    doc.insert("rootUrl".to_string(), json!(root.as_str()));
    doc.insert("servicePath".to_string(), json!(service_path));
    doc.insert("batchPath".to_string(), json!("batch"));
    doc.insert("parameters".to_string(), standard_parameters());
    Ok(doc)
}

fn standard_parameters() -> Value {
    let query_string = |description: &str| {
        json!({ "type": "string", "description": description, "location": "query" })
    };
    json!({
        "alt": {
            "type": "string",
            "description": "Data format for the response.",
            "default": "json",
            "enum": ["json"],
            "enumDescriptions": ["Responses with Content-Type of application/json"],
            "location": "query",
        },
        "fields": query_string("Selector specifying which fields to include in a partial response."),
        "key": query_string("API key. Required unless you provide an OAuth 2.0 token."),
        "oauth_token": query_string("OAuth 2.0 token for the current user."),
        "prettyPrint": {
            "type": "boolean",
            "description": "Returns response with indentations and line breaks.",
            "default": "true",
            "location": "query",
        },
        "quotaUser": query_string("An opaque string that represents a user for quota purposes."),
        "userIp": query_string("Deprecated. Please use quotaUser instead."),
    })
}

fn method_json(method: &MethodScope<'_>, repo: &mut SchemaRepository) -> Result<Value> {
    let config = method.config();
    let mut out = Map::new();
    out.insert("id".to_string(), json!(method.full_name()));
    out.insert("path".to_string(), json!(config.path));
    out.insert("httpMethod".to_string(), json!(config.http_method.as_str()));
    if let Some(v) = &config.description {
        out.insert("description".to_string(), json!(v));
    }

    let params = method_parameters(method)?;
    if !params.is_empty() {
        let order: Vec<&str> = params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        let rendered: Map<String, Value> = params
            .iter()
            .map(|p| (p.name.clone(), parameter_json(p)))
            .collect();
        out.insert("parameters".to_string(), Value::Object(rendered));
        if !order.is_empty() {
            out.insert("parameterOrder".to_string(), json!(order));
        }
    }

    if let Some(body) = request_body(method, repo)? {
        let mut request = match Flavor::Discovery.schema_reference(&body.schema) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        request.insert("parameterName".to_string(), json!(body.parameter_name));
        out.insert("request".to_string(), Value::Object(request));
    }
    if let Some(schema) = response_schema(method, repo)? {
        out.insert("response".to_string(), Flavor::Discovery.schema_reference(&schema));
    }

    let scopes = method.scope_expression().all_scopes();
    if !scopes.is_empty() {
        out.insert("scopes".to_string(), json!(scopes));
    }
    Ok(Value::Object(out))
}

fn parameter_json(param: &MethodParameter) -> Value {
    let mut out = Flavor::Discovery.scalar(param.field_type);
    if let Some(v) = &param.description {
        out.insert("description".to_string(), json!(v));
    }
    if let Some(v) = &param.default_value {
        out.insert("default".to_string(), json!(v));
    }
    if !param.enum_values.is_empty() {
        out.insert("enum".to_string(), json!(param.enum_values));
        out.insert(
            "enumDescriptions".to_string(),
            json!(vec![""; param.enum_values.len()]),
        );
    }
    out.insert("location".to_string(), json!(param.location.as_str()));
    if param.required || param.location == ParameterLocation::Path {
        out.insert("required".to_string(), json!(true));
    }
    if param.repeated {
        out.insert("repeated".to_string(), json!(true));
    }
    Value::Object(out)
}

/// Methods grouped by resource, built before rendering.
#[derive(Default)]
struct ResourceNode {
    methods: Map<String, Value>,
    resources: BTreeMap<String, ResourceNode>,
}

impl ResourceNode {
    fn insert(&mut self, path: &[&str], leaf: String, method: Value) {
        match path.split_first() {
            None => {
                self.methods.insert(leaf, method);
            }
            Some((first, rest)) => self
                .resources
                .entry(first.to_string())
                .or_default()
                .insert(rest, leaf, method),
        }
    }

    fn write_into(self, out: &mut Map<String, Value>) {
        if !self.methods.is_empty() {
            out.insert("methods".to_string(), Value::Object(self.methods));
        }
        if !self.resources.is_empty() {
            let mut resources = Map::new();
            for (name, node) in self.resources {
                let mut rendered = Map::new();
                node.write_into(&mut rendered);
                resources.insert(name, Value::Object(rendered));
            }
            out.insert("resources".to_string(), Value::Object(resources));
        }
    }
}
