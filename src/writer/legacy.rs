//! The legacy `.api` configuration document read by the gateway.

use super::json_schema::{schema_json, Flavor};
use super::{
    active_methods, api_schemas, first_config, method_parameters, request_body, response_schema,
    ApiConfigWriter, MethodParameter,
};
use crate::config::{ApiConfig, MethodScope};
use crate::error::Result;
use crate::schema::{FieldType, SchemaRepository};
use crate::types::TypeRef;
use serde_json::{json, Map, Value};
use tracing::debug;

const FORMAT: &str = "legacy";
/// Backend deadline, in seconds, advertised to the gateway.
const BACKEND_DEADLINE_SECS: f64 = 65.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyJsonWriter;

impl LegacyJsonWriter {
    pub fn new() -> Self {
        LegacyJsonWriter
    }
}

impl ApiConfigWriter for LegacyJsonWriter {
    fn format_name(&self) -> &'static str {
        FORMAT
    }

    fn file_extension(&self) -> &'static str {
        "api"
    }

    fn emit(&self, configs: &[ApiConfig], repo: &mut SchemaRepository) -> Result<String> {
        let api = first_config(FORMAT, configs)?;
        let mut doc = api_header(api);

        let mut methods = Map::new();
        let mut descriptor_methods = Map::new();
        for method in active_methods(configs) {
            let (entry, descriptor) = method_json(&method, repo)?;
            let backend = rosy_method(&method);
            methods.insert(method.full_name(), entry);
            if !descriptor.is_empty() {
                descriptor_methods.insert(backend, Value::Object(descriptor));
            }
        }

        let mut schemas = Map::new();
        for schema in api_schemas(api, repo) {
            schemas.insert(schema.name.clone(), schema_json(&schema, repo, Flavor::Discovery)?);
        }

        doc.insert("methods".to_string(), Value::Object(methods));
        doc.insert(
            "descriptor".to_string(),
            json!({ "schemas": schemas, "methods": descriptor_methods }),
        );
        debug!(api = %api.api_key(), "Rendered legacy config");
        serde_json::to_string_pretty(&Value::Object(doc))
            .map_err(|e| super::render_error(FORMAT, api, e.to_string()))
    }
}

fn api_header(api: &ApiConfig) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("extends".to_string(), json!("thirdParty.api"));
    doc.insert("abstract".to_string(), json!(api.is_abstract));
    doc.insert("root".to_string(), json!(api.root));
    doc.insert("name".to_string(), json!(api.name));
    if let Some(v) = &api.canonical_name {
        doc.insert("canonicalName".to_string(), json!(v));
    }
    doc.insert("version".to_string(), json!(api.version));
    if let Some(v) = &api.title {
        doc.insert("title".to_string(), json!(v));
    }
    if let Some(v) = &api.description {
        doc.insert("description".to_string(), json!(v));
    }
    if let Some(v) = &api.documentation_link {
        doc.insert("documentation".to_string(), json!(v));
    }
    doc.insert("defaultVersion".to_string(), json!(api.is_default_version));
    doc.insert("discovery".to_string(), json!(api.discoverable));
    doc.insert(
        "adapter".to_string(),
        json!({
            "bns": api.backend_root,
            "deadline": BACKEND_DEADLINE_SECS,
            "type": "lily",
        }),
    );
    doc.insert(
        "auth".to_string(),
        json!({
            "allowCookieAuth": api.auth_config.allow_cookie_auth,
            "blockedRegions": api.auth_config.blocked_regions,
        }),
    );
    let limits = &api.frontend_limits_config;
    doc.insert(
        "frontendLimits".to_string(),
        json!({
            "unregisteredUserQps": limits.unregistered_user_qps,
            "unregisteredQps": limits.unregistered_qps,
            "unregisteredDaily": limits.unregistered_daily,
            "rules": limits.rules.iter().map(|r| json!({
                "match": r.match_expr,
                "qps": r.qps,
                "userQps": r.user_qps,
                "daily": r.daily,
                "analyticsId": r.analytics_id,
            })).collect::<Vec<_>>(),
        }),
    );
    doc.insert(
        "cacheControl".to_string(),
        json!({
            "type": api.cache_control_config.kind,
            "maxAge": api.cache_control_config.max_age,
        }),
    );
    if !api.namespace_config.is_empty() {
        doc.insert("ownerDomain".to_string(), json!(api.namespace_config.owner_domain));
        doc.insert("ownerName".to_string(), json!(api.namespace_config.owner_name));
        if !api.namespace_config.package_path.is_empty() {
            doc.insert("packagePath".to_string(), json!(api.namespace_config.package_path));
        }
    }
    if !api.issuers.is_empty() {
        let issuers: Map<String, Value> = api
            .issuers
            .iter()
            .map(|i| (i.name.clone(), json!({ "issuer": i.issuer, "jwksUri": i.jwks_uri })))
            .collect();
        doc.insert("issuers".to_string(), Value::Object(issuers));
    }
    if !api.limit_metrics.is_empty() {
        let metrics: Vec<Value> = api
            .limit_metrics
            .iter()
            .map(|m| json!({ "name": m.name, "displayName": m.display_name, "limit": m.limit }))
            .collect();
        doc.insert("limitDefinitions".to_string(), json!(metrics));
    }
    doc
}

/// `TestEndpoint.getFoo`: the backend method the gateway forwards to.
fn rosy_method(method: &MethodScope<'_>) -> String {
    let em = &method.config().endpoint_method;
    format!(
        "{}.{}",
        TypeRef::simple_class_name(&em.service_class),
        em.name
    )
}

fn method_json(
    method: &MethodScope<'_>,
    repo: &mut SchemaRepository,
) -> Result<(Value, Map<String, Value>)> {
    let config = method.config();
    let mut entry = Map::new();
    entry.insert("path".to_string(), json!(config.path));
    entry.insert("httpMethod".to_string(), json!(config.http_method.as_str()));
    entry.insert("authLevel".to_string(), json!(method.auth_level()));
    entry.insert(
        "scopes".to_string(),
        json!(method.scope_expression().to_scope_strings()),
    );
    entry.insert("audiences".to_string(), json!(method.audiences()));
    if !method.issuer_audiences().is_empty() {
        entry.insert("issuerAudiences".to_string(), json!(method.issuer_audiences()));
    }
    entry.insert("clientIds".to_string(), json!(method.client_ids()));
    if let Some(v) = method.authenticators() {
        entry.insert("authenticators".to_string(), json!(v));
    }
    if let Some(v) = method.peer_authenticators() {
        entry.insert("peerAuthenticators".to_string(), json!(v));
    }
    if method.api_key_required() {
        entry.insert("apiKeyRequired".to_string(), json!(true));
    }
    entry.insert("rosyMethod".to_string(), json!(rosy_method(method)));
    if let Some(v) = &config.description {
        entry.insert("description".to_string(), json!(v));
    }
    if !config.metric_costs.is_empty() {
        let costs: Map<String, Value> = config
            .metric_costs
            .iter()
            .map(|c| (c.name.clone(), json!(c.cost)))
            .collect();
        entry.insert("metricCosts".to_string(), Value::Object(costs));
    }

    let mut parameters = Map::new();
    for param in method_parameters(method)? {
        parameters.insert(param.name.clone(), parameter_json(&param));
    }

    let mut descriptor = Map::new();
    let mut request = Map::new();
    match request_body(method, repo)? {
        Some(body) => {
            request.insert("body".to_string(), json!("autoTemplate(backendRequest)"));
            request.insert("bodyName".to_string(), json!("resource"));
            descriptor.insert("request".to_string(), Flavor::Discovery.schema_reference(&body.schema));
        }
        None => {
            request.insert("body".to_string(), json!("empty"));
        }
    }
    if !parameters.is_empty() {
        request.insert("parameters".to_string(), Value::Object(parameters));
    }
    entry.insert("request".to_string(), Value::Object(request));

    let response = match response_schema(method, repo)? {
        Some(schema) => {
            descriptor.insert("response".to_string(), Flavor::Discovery.schema_reference(&schema));
            json!({ "body": "autoTemplate(backendResponse)", "bodyName": "resource" })
        }
        None => json!({ "body": "empty" }),
    };
    entry.insert("response".to_string(), response);

    Ok((Value::Object(entry), descriptor))
}

fn legacy_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String | FieldType::Enum => "string",
        FieldType::Int8 | FieldType::Int16 | FieldType::Int32 => "int32",
        FieldType::Int64 => "int64",
        FieldType::Float => "float",
        FieldType::Double => "double",
        FieldType::Boolean => "boolean",
        FieldType::ByteString => "bytes",
        FieldType::Date => "date",
        FieldType::DateTime => "datetime",
        FieldType::Object | FieldType::Array => "object",
    }
}

fn parameter_json(param: &MethodParameter) -> Value {
    let mut out = Map::new();
    out.insert("type".to_string(), json!(legacy_type(param.field_type)));
    out.insert("required".to_string(), json!(param.required));
    if param.repeated {
        out.insert("repeated".to_string(), json!(true));
    }
    if let Some(v) = &param.default_value {
        out.insert("default".to_string(), json!(v));
    }
    if let Some(v) = &param.description {
        out.insert("description".to_string(), json!(v));
    }
    if !param.enum_values.is_empty() {
        let values: Map<String, Value> = param
            .enum_values
            .iter()
            .map(|v| (v.clone(), json!({ "backendValue": v })))
            .collect();
        out.insert("enum".to_string(), Value::Object(values));
    }
    Value::Object(out)
}
