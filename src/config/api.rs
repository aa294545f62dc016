use super::auth::{
    ApiIssuerAudienceConfig, ApiIssuerConfigs, AuthLevel, AuthScopeExpression,
    API_EXPLORER_CLIENT_ID, DEFAULT_SCOPE,
};
use super::class::{ApiClassConfig, ClassScope, MethodConfigMap};
use super::inconsistency::{ApiConfigInconsistency, InconsistencyCollector};
use super::settings::{
    ApiAuthConfig, ApiCacheControlConfig, ApiFrontendLimitsConfig, ApiLimitMetricConfig,
    ApiNamespaceConfig,
};
use crate::context::ServiceContext;
use crate::transformer::ApiSerializationConfig;
use crate::types::TypeUniverse;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Reserved name of framework-internal pseudo-APIs.
pub const INTERNAL_API_NAME: &str = "_EndpointsInternal";

/// Identity of one logical API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ApiKey {
    pub name: String,
    pub version: String,
    pub root: Option<String>,
}

impl ApiKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        ApiKey {
            name: name.into(),
            version: version.into(),
            root: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// The same key with the serving root dropped, so keys that differ only
    /// by root compare equal.
    pub fn without_root(&self) -> ApiKey {
        ApiKey {
            root: None,
            ..self.clone()
        }
    }

    /// `name-version`, used in file names.
    pub fn api_string(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{}:{}@{}", self.name, self.version, root),
            None => write!(f, "{}:{}", self.name, self.version),
        }
    }
}

/// The type universe shared by every config of one load. Compared by
/// identity; cloning a config shares it.
#[derive(Clone)]
pub struct SharedUniverse(Arc<TypeUniverse>);

impl SharedUniverse {
    pub fn new(universe: Arc<TypeUniverse>) -> Self {
        SharedUniverse(universe)
    }

    pub fn arc(&self) -> Arc<TypeUniverse> {
        Arc::clone(&self.0)
    }
}

impl Deref for SharedUniverse {
    type Target = TypeUniverse;

    fn deref(&self) -> &TypeUniverse {
        &self.0
    }
}

impl PartialEq for SharedUniverse {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeUniverse(..)")
    }
}

/// Root configuration of one API as seen through one service class.
///
/// `Clone` is a full structural copy (only the type universe is shared),
/// which is what reload relies on to leave the previous config untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiConfig {
    #[serde(skip)]
    pub universe: SharedUniverse,
    pub root: String,
    pub name: String,
    pub canonical_name: Option<String>,
    pub version: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub documentation_link: Option<String>,
    pub backend_root: String,
    pub is_abstract: bool,
    pub is_default_version: bool,
    pub discoverable: bool,
    pub use_datastore: bool,
    pub resource: Option<String>,
    pub auth_level: AuthLevel,
    pub scope_expression: AuthScopeExpression,
    pub audiences: Vec<String>,
    pub issuers: ApiIssuerConfigs,
    pub issuer_audiences: ApiIssuerAudienceConfig,
    pub client_ids: Vec<String>,
    pub authenticators: Option<Vec<String>>,
    pub peer_authenticators: Option<Vec<String>>,
    pub api_key_required: bool,
    pub auth_config: ApiAuthConfig,
    pub cache_control_config: ApiCacheControlConfig,
    pub frontend_limits_config: ApiFrontendLimitsConfig,
    pub namespace_config: ApiNamespaceConfig,
    pub serialization_config: ApiSerializationConfig,
    pub limit_metrics: Vec<ApiLimitMetricConfig>,
    pub class_config: ApiClassConfig,
}

impl ApiConfig {
    /// A config holding system defaults for `service_class`, seeded from the
    /// deployment context.
    pub fn new(universe: Arc<TypeUniverse>, context: &ServiceContext, service_class: &str) -> Self {
        ApiConfig {
            universe: SharedUniverse::new(universe),
            root: format!("{}://{}/_ah/api", context.protocol, context.hostname),
            name: context.default_api_name.clone(),
            canonical_name: None,
            version: "v1".to_string(),
            title: None,
            description: None,
            documentation_link: None,
            backend_root: format!("{}://{}/_ah/spi", context.protocol, context.hostname),
            is_abstract: false,
            is_default_version: false,
            discoverable: true,
            use_datastore: false,
            resource: None,
            auth_level: AuthLevel::None,
            scope_expression: AuthScopeExpression::from_scopes(&[DEFAULT_SCOPE]),
            audiences: Vec::new(),
            issuers: ApiIssuerConfigs::default(),
            issuer_audiences: ApiIssuerAudienceConfig::default(),
            client_ids: vec![API_EXPLORER_CLIENT_ID.to_string()],
            authenticators: None,
            peer_authenticators: None,
            api_key_required: false,
            auth_config: ApiAuthConfig::default(),
            cache_control_config: ApiCacheControlConfig::default(),
            frontend_limits_config: ApiFrontendLimitsConfig::default(),
            namespace_config: ApiNamespaceConfig::default(),
            serialization_config: ApiSerializationConfig::default(),
            limit_metrics: Vec::new(),
            class_config: ApiClassConfig::new(service_class),
        }
    }

    pub fn universe(&self) -> &TypeUniverse {
        &self.universe
    }

    pub fn api_key(&self) -> ApiKey {
        ApiKey::new(self.name.clone(), self.version.clone()).with_root(self.root.clone())
    }

    pub fn class_scope(&self) -> ClassScope<'_> {
        ClassScope::new(self)
    }

    /// Mutable method configs together with what is needed to classify
    /// parameters added to them.
    pub fn method_config_map(&mut self) -> MethodConfigMap<'_> {
        MethodConfigMap::new(
            &mut self.class_config.methods,
            &self.universe.0,
            &self.serialization_config,
        )
    }

    /// Field-by-field differences in API-wide settings. Configs of one
    /// ApiKey group must report none.
    pub fn get_inconsistencies(&self, other: &ApiConfig) -> Vec<ApiConfigInconsistency> {
        let mut c = InconsistencyCollector::default();
        c.check("root", &self.root, &other.root);
        c.check("name", &self.name, &other.name);
        c.check("canonicalName", &self.canonical_name, &other.canonical_name);
        c.check("version", &self.version, &other.version);
        c.check("title", &self.title, &other.title);
        c.check("description", &self.description, &other.description);
        c.check("documentationLink", &self.documentation_link, &other.documentation_link);
        c.check("backendRoot", &self.backend_root, &other.backend_root);
        c.check("isAbstract", &self.is_abstract, &other.is_abstract);
        c.check("defaultVersion", &self.is_default_version, &other.is_default_version);
        c.check("discoverable", &self.discoverable, &other.discoverable);
        c.check("useDatastore", &self.use_datastore, &other.use_datastore);
        c.check("resource", &self.resource, &other.resource);
        c.check("authLevel", &self.auth_level, &other.auth_level);
        c.check("scopeExpression", &self.scope_expression, &other.scope_expression);
        c.check("audiences", &self.audiences, &other.audiences);
        c.check("issuers", &self.issuers, &other.issuers);
        c.check("issuerAudiences", &self.issuer_audiences, &other.issuer_audiences);
        c.check("clientIds", &self.client_ids, &other.client_ids);
        c.check("authenticators", &self.authenticators, &other.authenticators);
        c.check("peerAuthenticators", &self.peer_authenticators, &other.peer_authenticators);
        c.check("apiKeyRequired", &self.api_key_required, &other.api_key_required);
        c.check("authConfig", &self.auth_config, &other.auth_config);
        c.check("cacheControlConfig", &self.cache_control_config, &other.cache_control_config);
        c.check(
            "frontendLimitsConfig",
            &self.frontend_limits_config,
            &other.frontend_limits_config,
        );
        c.check("namespaceConfig", &self.namespace_config, &other.namespace_config);
        c.check(
            "serializationConfig",
            &self.serialization_config,
            &other.serialization_config,
        );
        c.check("limitMetrics", &self.limit_metrics, &other.limit_metrics);
        c.finish()
    }
}
