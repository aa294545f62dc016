#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::{ApiParameterConfig, EndpointMethod, MethodKey};
use crate::context::ServiceContext;
use crate::types::{ClassDef, PropertyDef};
use std::sync::Arc;

fn ty(s: &str) -> TypeRef {
    s.parse().unwrap()
}

fn universe() -> Arc<TypeUniverse> {
    let mut universe = TypeUniverse::new();
    universe
        .register_class(
            ClassDef::new("Foo")
                .property(PropertyDef::new("id", ty("long")))
                .property(PropertyDef::new("name", ty("String"))),
        )
        .unwrap();
    universe.register_class(ClassDef::new("Bar")).unwrap();
    Arc::new(universe)
}

fn config(universe: &Arc<TypeUniverse>, service_class: &str) -> ApiConfig {
    ApiConfig::new(Arc::clone(universe), &ServiceContext::default(), service_class)
}

fn add_method(
    config: &mut ApiConfig,
    name: &str,
    params: Vec<ApiParameterConfig>,
    returns: Option<&str>,
) -> MethodKey {
    let service_class = config.class_config.service_class.clone();
    let em = EndpointMethod {
        service_class: service_class.clone(),
        declaring_class: service_class,
        name: name.to_string(),
        parameter_types: params.iter().map(|p| p.ty.clone()).collect(),
        return_type: returns.map(ty),
    };
    let mut methods = config.method_config_map();
    methods.get_or_create(&em);
    for param in params {
        methods.add_parameter(&em, param).unwrap();
    }
    em.key()
}

fn validate(configs: &[ApiConfig]) -> Result<()> {
    ApiConfigValidator::new().validate(configs)
}

#[test]
fn test_valid_api_passes() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    add_method(
        &mut api,
        "getFoo",
        vec![ApiParameterConfig::named(ty("long"), "id")],
        Some("Foo"),
    );
    add_method(&mut api, "insertFoo", vec![ApiParameterConfig::new(ty("Foo"))], Some("Foo"));
    add_method(&mut api, "listFoos", vec![], Some("List<Foo>"));
    add_method(
        &mut api,
        "ping",
        vec![ApiParameterConfig::new(ty("HttpRequest"))],
        None,
    );

    validate(&[api]).unwrap();
    validate(&[]).unwrap();
}

#[test]
fn test_more_than_one_resource_is_rejected() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    add_method(
        &mut api,
        "insertFoo",
        vec![
            ApiParameterConfig::new(ty("Foo")),
            ApiParameterConfig::new(ty("Bar")),
        ],
        None,
    );

    let err = validate(&[api]).unwrap_err();
    assert!(matches!(err, ApiConfigError::MultipleResourceParameters { count: 2, .. }));
}

#[test]
fn test_collection_resource_is_rejected() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    add_method(&mut api, "insertFoos", vec![ApiParameterConfig::new(ty("List<Foo>"))], None);

    let err = validate(&[api]).unwrap_err();
    assert!(matches!(err, ApiConfigError::InvalidParameterType { .. }));
}

#[test]
fn test_nested_collection_parameter_is_rejected() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    add_method(
        &mut api,
        "search",
        vec![ApiParameterConfig::named(ty("List<List<String>>"), "terms")],
        None,
    );

    let err = validate(&[api]).unwrap_err();
    assert!(matches!(err, ApiConfigError::NestedCollection { .. }));
}

#[test]
fn test_parameter_problems() {
    let universe = universe();

    let mut unnamed = config(&universe, "FooEndpoint");
    add_method(&mut unnamed, "getFoo", vec![ApiParameterConfig::new(ty("int"))], None);
    let err = validate(&[unnamed]).unwrap_err();
    assert!(matches!(err, ApiConfigError::MissingParameterName { index: 0, .. }));

    let mut unresolved = config(&universe, "FooEndpoint");
    add_method(&mut unresolved, "insertFoo", vec![ApiParameterConfig::new(ty("T"))], None);
    let err = validate(&[unresolved]).unwrap_err();
    assert!(matches!(err, ApiConfigError::UnresolvedParameterType { .. }));
}

#[test]
fn test_property_parameter_conflict_except_id() {
    let universe = universe();

    let mut by_id = config(&universe, "FooEndpoint");
    add_method(
        &mut by_id,
        "updateFoo",
        vec![
            ApiParameterConfig::new(ty("Foo")),
            ApiParameterConfig::named(ty("long"), "id"),
        ],
        Some("Foo"),
    );
    validate(&[by_id]).unwrap();

    let mut by_name = config(&universe, "FooEndpoint");
    add_method(
        &mut by_name,
        "updateFoo",
        vec![
            ApiParameterConfig::new(ty("Foo")),
            ApiParameterConfig::named(ty("String"), "name"),
        ],
        Some("Foo"),
    );
    match validate(&[by_name]).unwrap_err() {
        ApiConfigError::PropertyParameterNameConflict { name, .. } => assert_eq!(name, "name"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_path_placeholder_must_name_a_parameter() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    let key = add_method(
        &mut api,
        "getFoo",
        vec![ApiParameterConfig::named(ty("long"), "id")],
        Some("Foo"),
    );
    api.class_config.methods.get_mut(&key).unwrap().path = "foos/{id}/{missing}".to_string();

    match validate(&[api]).unwrap_err() {
        ApiConfigError::PathParameterNotFound { name, .. } => assert_eq!(name, "missing"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_return_types() {
    let universe = universe();
    for (returns, ok) in [
        ("Foo", true),
        ("List<Foo>", true),
        ("Map<String, Foo>", true),
        ("String", false),
        ("int", false),
        ("List<List<Foo>>", false),
        ("T", false),
    ] {
        let mut api = config(&universe, "FooEndpoint");
        add_method(&mut api, "getFoo", vec![], Some(returns));
        let result = validate(&[api]);
        if ok {
            assert!(result.is_ok(), "{returns}: {result:?}");
        } else {
            assert!(
                matches!(result, Err(ApiConfigError::InvalidReturnType { .. })),
                "{returns}: {result:?}"
            );
        }
    }
}

#[test]
fn test_ignored_methods_are_skipped() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    let key = add_method(&mut api, "getCount", vec![], Some("int"));
    api.class_config.methods.get_mut(&key).unwrap().ignored = true;

    validate(&[api]).unwrap();
}

#[test]
fn test_duplicate_full_method_names_across_classes() {
    let universe = universe();
    let mut first = config(&universe, "FooEndpoint");
    let a = add_method(&mut first, "getA", vec![], Some("Foo"));
    first.class_config.methods.get_mut(&a).unwrap().name = "foo.get".to_string();
    let mut second = config(&universe, "BarEndpoint");
    let b = add_method(&mut second, "getB", vec![], Some("Foo"));
    second.class_config.methods.get_mut(&b).unwrap().name = "foo.get".to_string();

    match validate(&[first, second]).unwrap_err() {
        ApiConfigError::DuplicateMethodName { name, .. } => assert_eq!(name, "myapi.foo.get"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_rest_signature_ignores_placeholder_names() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    let a = add_method(
        &mut api,
        "getA",
        vec![ApiParameterConfig::named(ty("long"), "id")],
        Some("Foo"),
    );
    let b = add_method(
        &mut api,
        "getB",
        vec![ApiParameterConfig::named(ty("long"), "itemId")],
        Some("Foo"),
    );
    api.class_config.methods.get_mut(&a).unwrap().path = "items/{id}".to_string();
    api.class_config.methods.get_mut(&b).unwrap().path = "items/{itemId}".to_string();

    let err = validate(&[api.clone()]).unwrap_err();
    assert!(matches!(err, ApiConfigError::DuplicateRestPath { .. }));

    // A different verb on the same path is fine.
    api.class_config.methods.get_mut(&b).unwrap().http_method = http::Method::GET;
    validate(&[api]).unwrap();
}

#[test]
fn test_standard_parameter_name_is_not_a_path_parameter() {
    let universe = universe();
    let mut api = config(&universe, "FooEndpoint");
    let key = add_method(
        &mut api,
        "getByKey",
        vec![ApiParameterConfig::named(ty("String"), "key")],
        Some("Foo"),
    );
    let param = &api.class_config.methods[&key].parameters[0];
    assert_eq!(
        param
            .classification(api.universe(), &api.serialization_config)
            .unwrap(),
        Classification::Injected
    );

    api.class_config.methods.get_mut(&key).unwrap().path = "items/{key}".to_string();
    match validate(&[api]).unwrap_err() {
        ApiConfigError::PathParameterNotFound { name, .. } => assert_eq!(name, "key"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_inconsistent_configs_in_one_group() {
    let universe = universe();
    let first = config(&universe, "FooEndpoint");
    let mut second = config(&universe, "BarEndpoint");
    second.title = Some("Bar API".to_string());

    match validate(&[first, second]).unwrap_err() {
        ApiConfigError::InconsistentApiConfiguration {
            inconsistencies, ..
        } => {
            assert_eq!(inconsistencies.len(), 1);
            assert_eq!(inconsistencies[0].property_name, "title");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_api_and_method_name_patterns() {
    let universe = universe();

    let mut bad_api = config(&universe, "FooEndpoint");
    bad_api.name = "My-Api".to_string();
    assert!(matches!(
        validate(&[bad_api]).unwrap_err(),
        ApiConfigError::InvalidApiName { .. }
    ));

    let mut internal = config(&universe, "FooEndpoint");
    internal.name = INTERNAL_API_NAME.to_string();
    validate(&[internal]).unwrap();

    let mut bad_method = config(&universe, "FooEndpoint");
    let key = add_method(&mut bad_method, "getFoo", vec![], Some("Foo"));
    bad_method.class_config.methods.get_mut(&key).unwrap().name = "foo get".to_string();
    assert!(matches!(
        validate(&[bad_method]).unwrap_err(),
        ApiConfigError::InvalidMethodName { .. }
    ));
}

#[test]
fn test_path_normalization() {
    assert_eq!(normalize_path("items/{id}/sub/{x}"), "items/{}/sub/{}");
    assert_eq!(normalize_path("plain"), "plain");
}
