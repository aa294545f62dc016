//! # Validator Module
//!
//! Structural checks over the configs of one API, run once per
//! (name, version) group right before document emission.
//!
//! ## Checks
//!
//! - configs of the group agree on API-wide settings
//! - API and method names are well formed
//! - full method names and REST signatures (HTTP method + path) are unique
//! - return types can be serialized as a response body
//! - parameters are resolved, named when they are API parameters, not
//!   nested collections, and at most one of them is the resource
//! - resource properties do not collide with API parameter names (`id` excepted)
//! - every path placeholder names an API parameter
//!
//! Ignored methods are skipped. The first problem found is returned as a
//! typed [`ApiConfigError`].

use crate::config::{path_parameters, ApiConfig, Classification, MethodScope, INTERNAL_API_NAME};
use crate::error::{ApiConfigError, Result};
use crate::schema::FieldType;
use crate::transformer;
use crate::types::{TypeRef, TypeUniverse};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

#[cfg(test)]
mod tests;

const API_NAME_PATTERN: &str = r"^[a-z]+[A-Za-z0-9]*$";
const METHOD_NAME_PATTERN: &str = r"^\w+(\.\w+)*$";

static API_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(API_NAME_PATTERN).expect("API name regex should be valid"));
static METHOD_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(METHOD_NAME_PATTERN).expect("method name regex should be valid"));

/// Property names allowed to repeat an API parameter name.
const CONFLICT_EXEMPT_NAMES: [&str; 1] = ["id"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiConfigValidator;

impl ApiConfigValidator {
    pub fn new() -> Self {
        ApiConfigValidator
    }

    /// Validate configs that share one API key.
    pub fn validate(&self, configs: &[ApiConfig]) -> Result<()> {
        let Some(first) = configs.first() else {
            return Ok(());
        };
        for other in &configs[1..] {
            let inconsistencies = first.get_inconsistencies(other);
            if !inconsistencies.is_empty() {
                return Err(ApiConfigError::InconsistentApiConfiguration {
                    api: first.api_key().to_string(),
                    inconsistencies,
                });
            }
        }

        if first.name != INTERNAL_API_NAME && !API_NAME_REGEX.is_match(&first.name) {
            return Err(ApiConfigError::InvalidApiName {
                name: first.name.clone(),
                pattern: API_NAME_PATTERN.to_string(),
            });
        }

        let mut method_names: HashMap<String, String> = HashMap::new();
        let mut rest_signatures: HashMap<(String, String), String> = HashMap::new();

        for config in configs {
            for method in config.class_scope().methods() {
                let m = method.config();
                if m.ignored {
                    continue;
                }
                let location = m.endpoint_method.qualified_name();

                if !METHOD_NAME_REGEX.is_match(&m.name) {
                    return Err(ApiConfigError::InvalidMethodName {
                        method: location,
                        name: m.name.clone(),
                        pattern: METHOD_NAME_PATTERN.to_string(),
                    });
                }

                let full_name = method.full_name();
                if let Some(first) = method_names.insert(full_name.clone(), location.clone()) {
                    return Err(ApiConfigError::DuplicateMethodName {
                        name: full_name,
                        first,
                        second: location,
                    });
                }

                let signature = (m.http_method.to_string(), normalize_path(&m.path));
                if let Some(first) = rest_signatures.insert(signature, location.clone()) {
                    return Err(ApiConfigError::DuplicateRestPath {
                        http_method: m.http_method.to_string(),
                        path: m.path.clone(),
                        first,
                        second: location,
                    });
                }

                validate_method(&method)?;
                debug!(method = %location, "Validated method");
            }
        }
        Ok(())
    }
}

/// Path with placeholder names blanked, so `a/{x}` and `a/{y}` collide.
fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_placeholder = false;
    for c in path.chars() {
        match c {
            '{' => {
                in_placeholder = true;
                out.push_str("{}");
            }
            '}' => in_placeholder = false,
            _ if in_placeholder => {}
            _ => out.push(c),
        }
    }
    out
}

fn validate_method(method: &MethodScope<'_>) -> Result<()> {
    let api = method.api();
    let universe = api.universe();
    let serialization = &api.serialization_config;
    let m = method.config();
    let location = m.endpoint_method.qualified_name();

    if let Some(return_type) = m.return_type() {
        validate_return_type(method, return_type)?;
    }

    let mut api_parameter_names = Vec::new();
    let mut resources = Vec::new();

    for (index, param) in m.parameters.iter().enumerate() {
        match param.classification(universe, serialization)? {
            Classification::Injected => {}
            Classification::Unknown => {
                return Err(ApiConfigError::UnresolvedParameterType {
                    method: location,
                    parameter: param.display_name().to_string(),
                    ty: param.ty.to_string(),
                })
            }
            Classification::ApiParameter => {
                let Some(name) = &param.name else {
                    return Err(ApiConfigError::MissingParameterName {
                        method: location,
                        index,
                        ty: param.ty.to_string(),
                    });
                };
                api_parameter_names.push(name.clone());
            }
            Classification::Resource => {
                if let Some(item) = param.schema_repeated_item_type(universe, serialization)? {
                    if universe.is_array_type(&item) {
                        return Err(ApiConfigError::NestedCollection {
                            method: location,
                            parameter: param.display_name().to_string(),
                            ty: param.ty.to_string(),
                        });
                    }
                }
                resources.push(param);
            }
        }
    }

    if resources.len() > 1 {
        return Err(ApiConfigError::MultipleResourceParameters {
            method: location,
            count: resources.len(),
        });
    }

    if let Some(resource) = resources.first() {
        let base = resource.schema_base_type(universe, serialization)?;
        if universe.is_array_type(&base) {
            return Err(ApiConfigError::InvalidParameterType {
                method: location,
                parameter: resource.display_name().to_string(),
                ty: resource.ty.to_string(),
                reason: "collections cannot be used as the request resource".to_string(),
            });
        }
        if matches!(universe.field_type(&base), Some(ft) if ft.is_scalar()) {
            return Err(ApiConfigError::InvalidParameterType {
                method: location,
                parameter: resource.display_name().to_string(),
                ty: resource.ty.to_string(),
                reason: "scalar and enum types cannot be used as the request resource".to_string(),
            });
        }
        for property in resource_property_names(method, &base)? {
            if api_parameter_names.contains(&property)
                && !CONFLICT_EXEMPT_NAMES.contains(&property.as_str())
            {
                return Err(ApiConfigError::PropertyParameterNameConflict {
                    method: location,
                    name: property,
                });
            }
        }
    }

    for placeholder in path_parameters(&m.path) {
        if !api_parameter_names.contains(&placeholder) {
            return Err(ApiConfigError::PathParameterNotFound {
                method: location,
                path: m.path.clone(),
                name: placeholder,
            });
        }
    }
    Ok(())
}

fn resource_property_names(method: &MethodScope<'_>, ty: &TypeRef) -> Result<Vec<String>> {
    let api = method.api();
    let universe = api.universe();
    if TypeUniverse::is_any_object(ty) || universe.is_map_type(ty) {
        return Ok(Vec::new());
    }
    match transformer::resource_schema(universe, ty, Some(&api.serialization_config))? {
        Some(resource) => Ok(resource.properties.into_iter().map(|p| p.name).collect()),
        None => Ok(universe
            .properties(ty)?
            .into_iter()
            .map(|p| p.name)
            .collect()),
    }
}

fn validate_return_type(method: &MethodScope<'_>, return_type: &TypeRef) -> Result<()> {
    let api = method.api();
    let universe = api.universe();
    let location = method.config().endpoint_method.qualified_name();
    let invalid = |reason: &str| ApiConfigError::InvalidReturnType {
        method: location.clone(),
        ty: return_type.to_string(),
        reason: reason.to_string(),
    };

    let resolved =
        transformer::schema_type(universe, return_type, Some(&api.serialization_config))?;
    match universe.field_type(&resolved) {
        None => Err(invalid("type is unresolved")),
        Some(FieldType::Array) => {
            let item = universe
                .array_item_type(&resolved)
                .ok_or_else(|| invalid("not a repeated type"))?;
            if item.is_unresolved() {
                Err(invalid("item type is unresolved"))
            } else if universe.is_array_type(&item) {
                Err(invalid("collections of collections cannot be returned"))
            } else {
                Ok(())
            }
        }
        Some(FieldType::Object) => Ok(()),
        Some(_) => Err(invalid(
            "scalar and enum types cannot be returned; wrap them in an entity",
        )),
    }
}
