//! # Config Module
//!
//! The layered configuration model: [`ApiConfig`] owns one [`ApiClassConfig`],
//! which owns an insertion-ordered map of [`ApiMethodConfig`]s, each owning its
//! [`ApiParameterConfig`]s in declaration order.
//!
//! ## Fallback
//!
//! Class and method tiers store overrides as `Option`s. Effective values are
//! read through [`ClassScope`] and [`MethodScope`], which borrow the whole
//! chain and resolve every access against the current parent value, so a
//! parent changed after a child was created is still observed.
//!
//! ## Copy and equality
//!
//! Every tier is `Clone` (deep copy; the type universe is shared) and
//! `PartialEq` over all of its fields. [`ApiConfig::get_inconsistencies`]
//! reports, field by field, where two configs disagree on API-wide settings.

mod api;
mod auth;
mod class;
mod inconsistency;
mod method;
mod parameter;
mod settings;

#[cfg(test)]
mod tests;

pub use api::{ApiConfig, ApiKey, SharedUniverse, INTERNAL_API_NAME};
pub use auth::{
    ApiIssuerAudienceConfig, ApiIssuerConfigs, AuthLevel, AuthScopeExpression, IssuerConfig,
    API_EXPLORER_CLIENT_ID, DEFAULT_SCOPE,
};
pub use class::{ApiClassConfig, ClassScope, MethodConfigMap};
pub use inconsistency::ApiConfigInconsistency;
pub use method::{ApiMethodConfig, EndpointMethod, MethodKey, MethodScope, RestMethod};
pub(crate) use method::path_parameters;
pub use parameter::{ApiParameterConfig, Classification, STANDARD_PARAMETERS};
pub use settings::{
    ApiAuthConfig, ApiCacheControlConfig, ApiFrontendLimitsConfig, ApiLimitMetricConfig,
    ApiMetricCostConfig, ApiNamespaceConfig, CacheControlType, FrontendLimitsRule,
};
