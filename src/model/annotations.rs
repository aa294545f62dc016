//! Default-value structs standing in for the configuration annotations.
//!
//! Every element is optional: `None` means the element was left at its
//! default and the corresponding config field keeps whatever value it already
//! had. `Default::default()` is the fully populated default annotation.

use crate::config::{AuthLevel, CacheControlType};
use serde::{Deserialize, Serialize};

/// API-wide settings, declared on a service class (or a superclass, or a
/// referenced class).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiAnnotation {
    pub name: Option<String>,
    pub canonical_name: Option<String>,
    pub version: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub documentation_link: Option<String>,
    pub root: Option<String>,
    pub backend_root: Option<String>,
    pub is_abstract: Option<bool>,
    pub default_version: Option<bool>,
    pub discoverable: Option<bool>,
    pub use_datastore_for_additional_config: Option<bool>,
    pub resource: Option<String>,
    pub auth_level: Option<AuthLevel>,
    pub scopes: Option<Vec<String>>,
    pub audiences: Option<Vec<String>>,
    pub issuers: Option<Vec<ApiIssuerAnnotation>>,
    pub issuer_audiences: Option<Vec<ApiIssuerAudienceAnnotation>>,
    pub client_ids: Option<Vec<String>>,
    pub authenticators: Option<Vec<String>>,
    pub peer_authenticators: Option<Vec<String>>,
    pub api_key_required: Option<bool>,
    /// Transformer names registered for this API.
    pub transformers: Option<Vec<String>>,
    pub namespace: Option<ApiNamespaceAnnotation>,
    pub auth: Option<ApiAuthAnnotation>,
    pub cache_control: Option<ApiCacheControlAnnotation>,
    pub frontend_limits: Option<ApiFrontendLimitsAnnotation>,
    pub limit_definitions: Option<Vec<ApiLimitMetricAnnotation>>,
}

/// Class-level overrides of API-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiClassAnnotation {
    pub resource: Option<String>,
    pub auth_level: Option<AuthLevel>,
    pub scopes: Option<Vec<String>>,
    pub audiences: Option<Vec<String>>,
    pub issuer_audiences: Option<Vec<ApiIssuerAudienceAnnotation>>,
    pub client_ids: Option<Vec<String>>,
    pub authenticators: Option<Vec<String>>,
    pub peer_authenticators: Option<Vec<String>>,
    pub use_datastore_for_additional_config: Option<bool>,
    pub api_key_required: Option<bool>,
}

/// Method-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiMethodAnnotation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub path: Option<String>,
    pub http_method: Option<String>,
    pub auth_level: Option<AuthLevel>,
    pub scopes: Option<Vec<String>>,
    pub audiences: Option<Vec<String>>,
    pub issuer_audiences: Option<Vec<ApiIssuerAudienceAnnotation>>,
    pub client_ids: Option<Vec<String>>,
    pub authenticators: Option<Vec<String>>,
    pub peer_authenticators: Option<Vec<String>>,
    pub ignored: Option<bool>,
    pub api_key_required: Option<bool>,
    pub metric_costs: Option<Vec<ApiMetricCostAnnotation>>,
}

/// Parameter annotations (`@Named`, `@Nullable`, `@DefaultValue`, `@Description`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterAnnotation {
    pub name: Option<String>,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

/// Bean property annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResourceProperty {
    /// Serialized name, when it differs from the property name.
    pub name: Option<String>,
    pub description: Option<String>,
    pub ignored: Option<bool>,
    pub required: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiIssuerAnnotation {
    pub name: String,
    pub issuer: String,
    pub jwks_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiIssuerAudienceAnnotation {
    pub name: String,
    pub audiences: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiNamespaceAnnotation {
    pub owner_domain: Option<String>,
    pub owner_name: Option<String>,
    pub package_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiAuthAnnotation {
    pub allow_cookie_auth: Option<bool>,
    pub blocked_regions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCacheControlAnnotation {
    #[serde(rename = "type")]
    pub kind: Option<CacheControlType>,
    pub max_age: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiFrontendLimitsAnnotation {
    pub unregistered_user_qps: Option<i32>,
    pub unregistered_qps: Option<i32>,
    pub unregistered_daily: Option<i32>,
    pub rules: Option<Vec<ApiFrontendLimitRuleAnnotation>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiFrontendLimitRuleAnnotation {
    #[serde(rename = "match")]
    pub match_expr: String,
    pub qps: i32,
    pub user_qps: i32,
    pub daily: i32,
    pub analytics_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiLimitMetricAnnotation {
    pub name: String,
    pub display_name: String,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiMetricCostAnnotation {
    pub name: String,
    pub cost: i32,
}
