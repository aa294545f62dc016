use super::auth::{AuthLevel, AuthScopeExpression, ApiIssuerAudienceConfig};
use super::method::{ApiMethodConfig, EndpointMethod, MethodKey, MethodScope};
use super::parameter::ApiParameterConfig;
use super::ApiConfig;
use crate::error::Result;
use crate::transformer::ApiSerializationConfig;
use crate::types::TypeUniverse;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

fn serialize_method_values<S: Serializer>(
    methods: &IndexMap<MethodKey, ApiMethodConfig>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(methods.values())
}

/// Configuration of one service class. Fields left `None` fall back to the
/// owning [`ApiConfig`] (see [`ClassScope`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiClassConfig {
    pub service_class: String,
    pub resource: Option<String>,
    pub auth_level: Option<AuthLevel>,
    pub scope_expression: Option<AuthScopeExpression>,
    pub audiences: Option<Vec<String>>,
    pub issuer_audiences: Option<ApiIssuerAudienceConfig>,
    pub client_ids: Option<Vec<String>>,
    pub authenticators: Option<Vec<String>>,
    pub peer_authenticators: Option<Vec<String>>,
    pub use_datastore: Option<bool>,
    pub api_key_required: Option<bool>,
    /// Method configs in declaration order.
    #[serde(serialize_with = "serialize_method_values")]
    pub methods: IndexMap<MethodKey, ApiMethodConfig>,
}

impl ApiClassConfig {
    pub fn new(service_class: impl Into<String>) -> Self {
        ApiClassConfig {
            service_class: service_class.into(),
            resource: None,
            auth_level: None,
            scope_expression: None,
            audiences: None,
            issuer_audiences: None,
            client_ids: None,
            authenticators: None,
            peer_authenticators: None,
            use_datastore: None,
            api_key_required: None,
            methods: IndexMap::new(),
        }
    }
}

/// A class config read through its API, with live fallback: every accessor
/// re-reads the API value, so API changes made after the class config was
/// created are visible.
#[derive(Debug, Clone, Copy)]
pub struct ClassScope<'a> {
    api: &'a ApiConfig,
}

impl<'a> ClassScope<'a> {
    pub(crate) fn new(api: &'a ApiConfig) -> Self {
        ClassScope { api }
    }

    pub fn api(&self) -> &'a ApiConfig {
        self.api
    }

    pub fn config(&self) -> &'a ApiClassConfig {
        &self.api.class_config
    }

    pub fn resource(&self) -> Option<&'a str> {
        self.config()
            .resource
            .as_deref()
            .or(self.api.resource.as_deref())
    }

    pub fn auth_level(&self) -> AuthLevel {
        match self.config().auth_level {
            Some(level) if level != AuthLevel::Unspecified => level,
            _ => self.api.auth_level,
        }
    }

    pub fn scope_expression(&self) -> &'a AuthScopeExpression {
        self.config()
            .scope_expression
            .as_ref()
            .unwrap_or(&self.api.scope_expression)
    }

    pub fn audiences(&self) -> &'a [String] {
        self.config()
            .audiences
            .as_deref()
            .unwrap_or(&self.api.audiences)
    }

    pub fn issuer_audiences(&self) -> &'a ApiIssuerAudienceConfig {
        self.config()
            .issuer_audiences
            .as_ref()
            .unwrap_or(&self.api.issuer_audiences)
    }

    pub fn client_ids(&self) -> &'a [String] {
        self.config()
            .client_ids
            .as_deref()
            .unwrap_or(&self.api.client_ids)
    }

    pub fn authenticators(&self) -> Option<&'a [String]> {
        self.config()
            .authenticators
            .as_deref()
            .or(self.api.authenticators.as_deref())
    }

    pub fn peer_authenticators(&self) -> Option<&'a [String]> {
        self.config()
            .peer_authenticators
            .as_deref()
            .or(self.api.peer_authenticators.as_deref())
    }

    pub fn use_datastore(&self) -> bool {
        self.config().use_datastore.unwrap_or(self.api.use_datastore)
    }

    pub fn api_key_required(&self) -> bool {
        self.config()
            .api_key_required
            .unwrap_or(self.api.api_key_required)
    }

    pub fn method(&self, key: &MethodKey) -> Option<MethodScope<'a>> {
        self.config()
            .methods
            .get(key)
            .map(|m| MethodScope::new(*self, m))
    }

    /// Every method, ignored ones included, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = MethodScope<'a>> + 'a {
        let scope = *self;
        self.config()
            .methods
            .values()
            .map(move |m| MethodScope::new(scope, m))
    }
}

/// Mutable view of a class's method configs handed to config sources.
///
/// Borrows the API's type universe and serialization rules alongside the
/// method map so parameters can be classified while they are added.
pub struct MethodConfigMap<'a> {
    methods: &'a mut IndexMap<MethodKey, ApiMethodConfig>,
    universe: &'a TypeUniverse,
    serialization: &'a ApiSerializationConfig,
}

impl<'a> MethodConfigMap<'a> {
    pub(crate) fn new(
        methods: &'a mut IndexMap<MethodKey, ApiMethodConfig>,
        universe: &'a TypeUniverse,
        serialization: &'a ApiSerializationConfig,
    ) -> Self {
        MethodConfigMap {
            methods,
            universe,
            serialization,
        }
    }

    pub fn universe(&self) -> &'a TypeUniverse {
        self.universe
    }

    pub fn serialization_config(&self) -> &'a ApiSerializationConfig {
        self.serialization
    }

    /// The config for `method`, created with name-derived defaults on first use.
    pub fn get_or_create(&mut self, method: &EndpointMethod) -> &mut ApiMethodConfig {
        self.methods
            .entry(method.key())
            .or_insert_with(|| ApiMethodConfig::new(method))
    }

    pub fn get(&self, key: &MethodKey) -> Option<&ApiMethodConfig> {
        self.methods.get(key)
    }

    pub fn get_mut(&mut self, key: &MethodKey) -> Option<&mut ApiMethodConfig> {
        self.methods.get_mut(key)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&MethodKey, &mut ApiMethodConfig)> {
        self.methods.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Add a parameter to the config of `method`, creating the config if needed.
    pub fn add_parameter(&mut self, method: &EndpointMethod, param: ApiParameterConfig) -> Result<()> {
        let config = self
            .methods
            .entry(method.key())
            .or_insert_with(|| ApiMethodConfig::new(method));
        config.add_parameter(param, self.universe, self.serialization)
    }
}
