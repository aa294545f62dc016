//! The framework's own config source: reads API, class, method and parameter
//! annotations from the type universe.

use super::methods::endpoint_methods;
use super::ApiConfigSource;
use crate::config::{
    ApiConfig, ApiIssuerAudienceConfig, ApiLimitMetricConfig, ApiMethodConfig, ApiMetricCostConfig,
    ApiParameterConfig, AuthLevel, AuthScopeExpression, FrontendLimitsRule, IssuerConfig,
    MethodConfigMap,
};
use crate::context::ServiceContext;
use crate::error::Result;
use crate::model::{
    ApiAnnotation, ApiClassAnnotation, ApiIssuerAudienceAnnotation, ApiMethodAnnotation,
};
use crate::types::{ClassDef, TypeUniverse};
use tracing::debug;

/// Reads configuration from annotations. Always static: annotations cannot
/// change without a redeploy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiConfigAnnotationReader;

impl ApiConfigAnnotationReader {
    pub fn new() -> Self {
        ApiConfigAnnotationReader
    }
}

impl ApiConfigSource for ApiConfigAnnotationReader {
    fn name(&self) -> &str {
        "annotations"
    }

    fn load_endpoint_class(
        &self,
        _context: &ServiceContext,
        class: &ClassDef,
        config: &mut ApiConfig,
    ) -> Result<()> {
        let universe = config.universe.arc();
        for annotation in api_annotation_chain(&universe, class) {
            apply_api_annotation(&universe, annotation, config)?;
        }
        if let Some(annotation) = &class.api_class {
            apply_class_annotation(annotation, config);
        }
        Ok(())
    }

    fn load_endpoint_methods(
        &self,
        _context: &ServiceContext,
        class: &ClassDef,
        methods: &mut MethodConfigMap<'_>,
    ) -> Result<()> {
        let universe = methods.universe();
        for (endpoint_method, def) in endpoint_methods(universe, &class.name)? {
            methods.get_or_create(&endpoint_method);
            for (param_def, ty) in def.params.iter().zip(&endpoint_method.parameter_types) {
                let annotation = &param_def.annotation;
                let param = ApiParameterConfig {
                    name: annotation.name.clone(),
                    description: annotation.description.clone(),
                    nullable: annotation.nullable,
                    default_value: annotation.default_value.clone(),
                    ..ApiParameterConfig::new(ty.clone())
                };
                methods.add_parameter(&endpoint_method, param)?;
            }
            if let (Some(annotation), Some(config)) =
                (&def.api_method, methods.get_mut(&endpoint_method.key()))
            {
                apply_method_annotation(annotation, config)?;
            }
            debug!(method = %endpoint_method.qualified_name(), "Read method annotations");
        }
        Ok(())
    }

    fn is_static_config(&self, _config: &ApiConfig) -> bool {
        true
    }

    fn is_annotation_reader(&self) -> bool {
        true
    }
}

/// API annotations that apply to `class`, least specific first: those of its
/// superclasses (base first), then those reached through `api_reference`,
/// then its own.
pub fn api_annotation_chain<'u>(universe: &'u TypeUniverse, class: &'u ClassDef) -> Vec<&'u ApiAnnotation> {
    let mut chain = superclass_annotations(universe, class);
    if let Some(reference) = class
        .api_reference
        .as_deref()
        .and_then(|name| universe.class(name))
    {
        chain.extend(superclass_annotations(universe, reference));
        chain.extend(reference.api.as_ref());
    }
    chain.extend(class.api.as_ref());
    chain
}

fn superclass_annotations<'u>(universe: &'u TypeUniverse, class: &ClassDef) -> Vec<&'u ApiAnnotation> {
    let mut chain = Vec::new();
    let mut seen = vec![class.name.clone()];
    let mut next = class
        .superclass
        .as_ref()
        .and_then(|s| s.raw_name())
        .and_then(|n| universe.class(n));
    while let Some(def) = next {
        if seen.contains(&def.name) {
            break;
        }
        seen.push(def.name.clone());
        chain.extend(def.api.as_ref());
        next = def
            .superclass
            .as_ref()
            .and_then(|s| s.raw_name())
            .and_then(|n| universe.class(n));
    }
    chain.reverse();
    chain
}

fn issuer_audiences(annotations: &[ApiIssuerAudienceAnnotation]) -> ApiIssuerAudienceConfig {
    let mut config = ApiIssuerAudienceConfig::default();
    for annotation in annotations {
        config.add(annotation.name.clone(), &annotation.audiences);
    }
    config
}

fn specified(level: Option<AuthLevel>) -> Option<AuthLevel> {
    level.filter(|l| *l != AuthLevel::Unspecified)
}

fn apply_api_annotation(
    universe: &TypeUniverse,
    annotation: &ApiAnnotation,
    config: &mut ApiConfig,
) -> Result<()> {
    if let Some(v) = &annotation.name {
        config.name = v.clone();
    }
    if let Some(v) = &annotation.canonical_name {
        config.canonical_name = Some(v.clone());
    }
    if let Some(v) = &annotation.version {
        config.version = v.clone();
    }
    if let Some(v) = &annotation.title {
        config.title = Some(v.clone());
    }
    if let Some(v) = &annotation.description {
        config.description = Some(v.clone());
    }
    if let Some(v) = &annotation.documentation_link {
        config.documentation_link = Some(v.clone());
    }
    if let Some(v) = &annotation.root {
        config.root = v.clone();
    }
    if let Some(v) = &annotation.backend_root {
        config.backend_root = v.clone();
    }
    if let Some(v) = annotation.is_abstract {
        config.is_abstract = v;
    }
    if let Some(v) = annotation.default_version {
        config.is_default_version = v;
    }
    if let Some(v) = annotation.discoverable {
        config.discoverable = v;
    }
    if let Some(v) = annotation.use_datastore_for_additional_config {
        config.use_datastore = v;
    }
    if let Some(v) = &annotation.resource {
        config.resource = Some(v.clone());
    }
    if let Some(v) = specified(annotation.auth_level) {
        config.auth_level = v;
    }
    if let Some(v) = &annotation.scopes {
        config.scope_expression = AuthScopeExpression::from_scopes(v);
    }
    if let Some(v) = &annotation.audiences {
        config.audiences = v.clone();
    }
    if let Some(issuers) = &annotation.issuers {
        for issuer in issuers {
            config.issuers.add(IssuerConfig {
                name: issuer.name.clone(),
                issuer: issuer.issuer.clone(),
                jwks_uri: issuer.jwks_uri.clone(),
            });
        }
    }
    if let Some(v) = &annotation.issuer_audiences {
        config.issuer_audiences = issuer_audiences(v);
    }
    if let Some(v) = &annotation.client_ids {
        config.client_ids = v.clone();
    }
    if let Some(v) = &annotation.authenticators {
        config.authenticators = Some(v.clone());
    }
    if let Some(v) = &annotation.peer_authenticators {
        config.peer_authenticators = Some(v.clone());
    }
    if let Some(v) = annotation.api_key_required {
        config.api_key_required = v;
    }
    if let Some(transformers) = &annotation.transformers {
        for transformer in transformers {
            config.serialization_config.add_serializer(universe, transformer)?;
        }
    }
    if let Some(ns) = &annotation.namespace {
        if let Some(v) = &ns.owner_domain {
            config.namespace_config.owner_domain = v.clone();
        }
        if let Some(v) = &ns.owner_name {
            config.namespace_config.owner_name = v.clone();
        }
        if let Some(v) = &ns.package_path {
            config.namespace_config.package_path = v.clone();
        }
    }
    if let Some(auth) = &annotation.auth {
        if let Some(v) = auth.allow_cookie_auth {
            config.auth_config.allow_cookie_auth = v;
        }
        if let Some(v) = &auth.blocked_regions {
            config.auth_config.blocked_regions = v.clone();
        }
    }
    if let Some(cache) = &annotation.cache_control {
        if let Some(v) = cache.kind {
            config.cache_control_config.kind = v;
        }
        if let Some(v) = cache.max_age {
            config.cache_control_config.max_age = v;
        }
    }
    if let Some(limits) = &annotation.frontend_limits {
        let target = &mut config.frontend_limits_config;
        if let Some(v) = limits.unregistered_user_qps {
            target.unregistered_user_qps = v;
        }
        if let Some(v) = limits.unregistered_qps {
            target.unregistered_qps = v;
        }
        if let Some(v) = limits.unregistered_daily {
            target.unregistered_daily = v;
        }
        if let Some(rules) = &limits.rules {
            target.rules = rules
                .iter()
                .map(|r| FrontendLimitsRule {
                    match_expr: r.match_expr.clone(),
                    qps: r.qps,
                    user_qps: r.user_qps,
                    daily: r.daily,
                    analytics_id: r.analytics_id.clone(),
                })
                .collect();
        }
    }
    if let Some(limits) = &annotation.limit_definitions {
        config.limit_metrics = limits
            .iter()
            .map(|l| ApiLimitMetricConfig {
                name: l.name.clone(),
                display_name: l.display_name.clone(),
                limit: l.limit,
            })
            .collect();
    }
    Ok(())
}

fn apply_class_annotation(annotation: &ApiClassAnnotation, config: &mut ApiConfig) {
    let class = &mut config.class_config;
    if let Some(v) = &annotation.resource {
        class.resource = Some(v.clone());
    }
    if let Some(v) = specified(annotation.auth_level) {
        class.auth_level = Some(v);
    }
    if let Some(v) = &annotation.scopes {
        class.scope_expression = Some(AuthScopeExpression::from_scopes(v));
    }
    if let Some(v) = &annotation.audiences {
        class.audiences = Some(v.clone());
    }
    if let Some(v) = &annotation.issuer_audiences {
        class.issuer_audiences = Some(issuer_audiences(v));
    }
    if let Some(v) = &annotation.client_ids {
        class.client_ids = Some(v.clone());
    }
    if let Some(v) = &annotation.authenticators {
        class.authenticators = Some(v.clone());
    }
    if let Some(v) = &annotation.peer_authenticators {
        class.peer_authenticators = Some(v.clone());
    }
    if let Some(v) = annotation.use_datastore_for_additional_config {
        class.use_datastore = Some(v);
    }
    if let Some(v) = annotation.api_key_required {
        class.api_key_required = Some(v);
    }
}

fn apply_method_annotation(
    annotation: &ApiMethodAnnotation,
    config: &mut ApiMethodConfig,
) -> Result<()> {
    if let Some(v) = &annotation.name {
        config.name = v.clone();
    }
    if let Some(v) = &annotation.description {
        config.description = Some(v.clone());
    }
    if let Some(v) = &annotation.path {
        config.path = v.clone();
    }
    if let Some(v) = &annotation.http_method {
        config.set_http_method(v)?;
    }
    if let Some(v) = specified(annotation.auth_level) {
        config.auth_level = Some(v);
    }
    if let Some(v) = &annotation.scopes {
        config.scope_expression = Some(AuthScopeExpression::from_scopes(v));
    }
    if let Some(v) = &annotation.audiences {
        config.audiences = Some(v.clone());
    }
    if let Some(v) = &annotation.issuer_audiences {
        config.issuer_audiences = Some(issuer_audiences(v));
    }
    if let Some(v) = &annotation.client_ids {
        config.client_ids = Some(v.clone());
    }
    if let Some(v) = &annotation.authenticators {
        config.authenticators = Some(v.clone());
    }
    if let Some(v) = &annotation.peer_authenticators {
        config.peer_authenticators = Some(v.clone());
    }
    if let Some(v) = annotation.ignored {
        config.ignored = v;
    }
    if let Some(v) = annotation.api_key_required {
        config.api_key_required = Some(v);
    }
    if let Some(costs) = &annotation.metric_costs {
        config.metric_costs = costs
            .iter()
            .map(|c| ApiMetricCostConfig {
                name: c.name.clone(),
                cost: c.cost,
            })
            .collect();
    }
    Ok(())
}
