use super::auth::{AuthLevel, AuthScopeExpression, ApiIssuerAudienceConfig};
use super::class::ClassScope;
use super::parameter::{ApiParameterConfig, Classification};
use super::settings::ApiMetricCostConfig;
use super::ApiConfig;
use crate::error::{ApiConfigError, Result};
use crate::naming::decapitalize;
use crate::transformer::ApiSerializationConfig;
use crate::types::{TypeRef, TypeUniverse};
use http::Method;
use serde::{Serialize, Serializer};
use std::fmt;

/// A method exposed by a service class, with parameter and return types
/// already resolved against the service class's view of its superclasses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EndpointMethod {
    /// The service class the method is exposed through.
    pub service_class: String,
    /// The (most derived) class that declares the method.
    pub declaring_class: String,
    pub name: String,
    pub parameter_types: Vec<TypeRef>,
    /// `None` for `void`.
    pub return_type: Option<TypeRef>,
}

impl EndpointMethod {
    pub fn key(&self) -> MethodKey {
        MethodKey {
            declaring_class: self.declaring_class.clone(),
            name: self.name.clone(),
            parameter_types: self.parameter_types.iter().map(TypeRef::erased).collect(),
        }
    }

    /// `DeclaringClass.method`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_class, self.name)
    }
}

/// Identity of a method config: declaring class plus erased signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    pub declaring_class: String,
    pub name: String,
    pub parameter_types: Vec<TypeRef>,
}

impl MethodKey {
    /// Erased signature without the declaring class, used to collapse overrides.
    pub fn signature(&self) -> (String, Vec<TypeRef>) {
        (self.name.clone(), self.parameter_types.clone())
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring_class, self.name)?;
        for (i, ty) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ty}")?;
        }
        write!(f, ")")
    }
}

/// REST verb inferred from a method name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    List,
    Insert,
    Update,
    Delete,
    Remove,
    /// Catch-all; its empty prefix matches every name.
    Default,
}

impl RestMethod {
    /// Match order. The first entry whose prefix matches wins, so `Default`
    /// must stay last.
    pub const MATCH_ORDER: [RestMethod; 6] = [
        RestMethod::List,
        RestMethod::Insert,
        RestMethod::Update,
        RestMethod::Delete,
        RestMethod::Remove,
        RestMethod::Default,
    ];

    pub fn for_method_name(name: &str) -> RestMethod {
        Self::MATCH_ORDER
            .into_iter()
            .find(|verb| name.starts_with(verb.prefix()))
            .unwrap_or(RestMethod::Default)
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            RestMethod::List => "list",
            RestMethod::Insert => "insert",
            RestMethod::Update => "update",
            RestMethod::Delete => "delete",
            RestMethod::Remove => "remove",
            RestMethod::Default => "",
        }
    }

    pub fn http_method(&self) -> Method {
        match self {
            RestMethod::List => Method::GET,
            RestMethod::Insert | RestMethod::Default => Method::POST,
            RestMethod::Update => Method::PUT,
            RestMethod::Delete | RestMethod::Remove => Method::DELETE,
        }
    }

    /// Resource named by the rest of the method name (`insertGreeting` ->
    /// `greeting`). The catch-all names no resource.
    pub fn guess_resource_name(&self, method_name: &str) -> Option<String> {
        if *self == RestMethod::Default {
            return None;
        }
        let rest = method_name.strip_prefix(self.prefix())?;
        if rest.is_empty() {
            None
        } else {
            Some(decapitalize(rest))
        }
    }
}

pub(crate) fn serialize_http_method<S: Serializer>(
    method: &Method,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

/// Configuration of one exposed method. Auth-related fields left `None` fall
/// back to the owning class (see [`MethodScope`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiMethodConfig {
    pub endpoint_method: EndpointMethod,
    /// Method name without the API prefix (`className.method`).
    pub name: String,
    pub description: Option<String>,
    pub path: String,
    #[serde(serialize_with = "serialize_http_method")]
    pub http_method: Method,
    /// Resource derived from the REST verb prefix, fixed at construction.
    pub implied_resource: Option<String>,
    pub auth_level: Option<AuthLevel>,
    pub scope_expression: Option<AuthScopeExpression>,
    pub audiences: Option<Vec<String>>,
    pub issuer_audiences: Option<ApiIssuerAudienceConfig>,
    pub client_ids: Option<Vec<String>>,
    pub authenticators: Option<Vec<String>>,
    pub peer_authenticators: Option<Vec<String>>,
    pub api_key_required: Option<bool>,
    pub ignored: bool,
    pub metric_costs: Vec<ApiMetricCostConfig>,
    pub parameters: Vec<ApiParameterConfig>,
}

impl ApiMethodConfig {
    pub fn new(method: &EndpointMethod) -> Self {
        let verb = RestMethod::for_method_name(&method.name);
        let implied_resource = verb.guess_resource_name(&method.name);
        let class_name = TypeRef::simple_class_name(&method.service_class);
        ApiMethodConfig {
            endpoint_method: method.clone(),
            name: format!("{}.{}", decapitalize(class_name), method.name),
            description: None,
            path: implied_resource
                .clone()
                .unwrap_or_else(|| method.name.clone()),
            http_method: verb.http_method(),
            implied_resource,
            auth_level: None,
            scope_expression: None,
            audiences: None,
            issuer_audiences: None,
            client_ids: None,
            authenticators: None,
            peer_authenticators: None,
            api_key_required: None,
            ignored: false,
            metric_costs: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn set_http_method(&mut self, value: &str) -> Result<()> {
        self.http_method = Method::from_bytes(value.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ApiConfigError::InvalidHttpMethod {
                method: self.endpoint_method.qualified_name(),
                value: value.to_string(),
            })?;
        Ok(())
    }

    pub fn return_type(&self) -> Option<&TypeRef> {
        self.endpoint_method
            .return_type
            .as_ref()
            .filter(|ty| !ty.is_void())
    }

    /// 200 when the method returns a value, 204 otherwise.
    pub fn effective_response_status(&self) -> u16 {
        if self.return_type().is_some() {
            200
        } else {
            204
        }
    }

    /// Append a parameter. A required API parameter that the path does not
    /// mention yet is appended to the path as `{name}`.
    pub fn add_parameter(
        &mut self,
        param: ApiParameterConfig,
        universe: &TypeUniverse,
        serialization: &ApiSerializationConfig,
    ) -> Result<()> {
        let method = self.endpoint_method.qualified_name();
        param.validate_default_value(universe, serialization, &method)?;

        if param.is_required()
            && param.classification(universe, serialization)? == Classification::ApiParameter
            && !param.is_repeated(universe, serialization)?
        {
            if let Some(name) = &param.name {
                let placeholder = format!("{{{name}}}");
                if !self.path.contains(&placeholder) {
                    self.path = if self.path.is_empty() {
                        placeholder
                    } else {
                        format!("{}/{placeholder}", self.path)
                    };
                }
            }
        }
        self.parameters.push(param);
        Ok(())
    }

    /// `{name}` placeholders in the path, in order.
    pub fn path_parameters(&self) -> Vec<String> {
        path_parameters(&self.path)
    }
}

pub(crate) fn path_parameters(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push(after[..end].to_string());
        rest = &after[end + 1..];
    }
    out
}

/// A method config read through its class and API, with live fallback.
#[derive(Debug, Clone, Copy)]
pub struct MethodScope<'a> {
    class: ClassScope<'a>,
    method: &'a ApiMethodConfig,
}

impl<'a> MethodScope<'a> {
    pub(crate) fn new(class: ClassScope<'a>, method: &'a ApiMethodConfig) -> Self {
        MethodScope { class, method }
    }

    pub fn config(&self) -> &'a ApiMethodConfig {
        self.method
    }

    pub fn class(&self) -> ClassScope<'a> {
        self.class
    }

    pub fn api(&self) -> &'a ApiConfig {
        self.class.api()
    }

    /// `apiName.className.method`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.api().name, self.method.name)
    }

    pub fn auth_level(&self) -> AuthLevel {
        match self.method.auth_level {
            Some(level) if level != AuthLevel::Unspecified => level,
            _ => self.class.auth_level(),
        }
    }

    pub fn scope_expression(&self) -> &'a AuthScopeExpression {
        self.method
            .scope_expression
            .as_ref()
            .unwrap_or_else(|| self.class.scope_expression())
    }

    pub fn audiences(&self) -> &'a [String] {
        self.method
            .audiences
            .as_deref()
            .unwrap_or_else(|| self.class.audiences())
    }

    pub fn issuer_audiences(&self) -> &'a ApiIssuerAudienceConfig {
        self.method
            .issuer_audiences
            .as_ref()
            .unwrap_or_else(|| self.class.issuer_audiences())
    }

    pub fn client_ids(&self) -> &'a [String] {
        self.method
            .client_ids
            .as_deref()
            .unwrap_or_else(|| self.class.client_ids())
    }

    pub fn authenticators(&self) -> Option<&'a [String]> {
        self.method
            .authenticators
            .as_deref()
            .or_else(|| self.class.authenticators())
    }

    pub fn peer_authenticators(&self) -> Option<&'a [String]> {
        self.method
            .peer_authenticators
            .as_deref()
            .or_else(|| self.class.peer_authenticators())
    }

    pub fn api_key_required(&self) -> bool {
        self.method
            .api_key_required
            .unwrap_or_else(|| self.class.api_key_required())
    }

    /// The REST resource: the class resource when set, else the one implied
    /// by the method name.
    pub fn resource(&self) -> Option<&'a str> {
        self.class
            .resource()
            .or(self.method.implied_resource.as_deref())
    }
}
