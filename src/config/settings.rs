//! API-wide sub-configurations. Each is a plain value holder cloned along
//! with its owning [`ApiConfig`](super::ApiConfig).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiAuthConfig {
    pub allow_cookie_auth: bool,
    pub blocked_regions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheControlType {
    Public,
    Private,
    #[default]
    NoCache,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiCacheControlConfig {
    #[serde(rename = "type")]
    pub kind: CacheControlType,
    pub max_age: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontendLimitsRule {
    #[serde(rename = "match")]
    pub match_expr: String,
    pub qps: i32,
    pub user_qps: i32,
    pub daily: i32,
    pub analytics_id: String,
}

/// Frontend quota limits. `-1` means "no limit configured".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiFrontendLimitsConfig {
    pub unregistered_user_qps: i32,
    pub unregistered_qps: i32,
    pub unregistered_daily: i32,
    pub rules: Vec<FrontendLimitsRule>,
}

impl Default for ApiFrontendLimitsConfig {
    fn default() -> Self {
        ApiFrontendLimitsConfig {
            unregistered_user_qps: -1,
            unregistered_qps: -1,
            unregistered_daily: -1,
            rules: Vec::new(),
        }
    }
}

/// Package naming hints for generated client libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiNamespaceConfig {
    pub owner_domain: String,
    pub owner_name: String,
    pub package_path: String,
}

impl ApiNamespaceConfig {
    pub fn is_empty(&self) -> bool {
        self.owner_domain.is_empty() && self.owner_name.is_empty() && self.package_path.is_empty()
    }
}

/// A quota metric defined by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiLimitMetricConfig {
    pub name: String,
    pub display_name: String,
    pub limit: i64,
}

/// Cost a method charges against a quota metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMetricCostConfig {
    pub name: String,
    pub cost: i32,
}
