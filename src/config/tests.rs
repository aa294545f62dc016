#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::context::ServiceContext;
use crate::error::ApiConfigError;
use crate::transformer::ApiSerializationConfig;
use crate::types::{ClassDef, TypeRef, TypeUniverse};
use http::Method;
use std::sync::Arc;

fn ty(s: &str) -> TypeRef {
    s.parse().unwrap()
}

fn universe() -> Arc<TypeUniverse> {
    let mut universe = TypeUniverse::new();
    universe.register_class(ClassDef::new("Foo")).unwrap();
    universe
        .register_class(ClassDef::enumeration("Color", &["RED", "GREEN"]))
        .unwrap();
    universe
        .register_class(ClassDef::new("TestEndpoint"))
        .unwrap();
    Arc::new(universe)
}

fn endpoint_method(name: &str, params: &[&str], returns: Option<&str>) -> EndpointMethod {
    EndpointMethod {
        service_class: "TestEndpoint".to_string(),
        declaring_class: "TestEndpoint".to_string(),
        name: name.to_string(),
        parameter_types: params.iter().map(|p| ty(p)).collect(),
        return_type: returns.map(ty),
    }
}

fn api_config() -> ApiConfig {
    ApiConfig::new(universe(), &ServiceContext::default(), "TestEndpoint")
}

#[test]
fn test_api_defaults_from_context() {
    let context = ServiceContext::new("example.com", "guestbook").with_protocol("http");
    let config = ApiConfig::new(universe(), &context, "TestEndpoint");

    assert_eq!(config.root, "http://example.com/_ah/api");
    assert_eq!(config.backend_root, "http://example.com/_ah/spi");
    assert_eq!(config.name, "guestbook");
    assert_eq!(config.version, "v1");
    assert!(config.discoverable);
    assert_eq!(config.auth_level, AuthLevel::None);
    assert_eq!(config.client_ids, vec![API_EXPLORER_CLIENT_ID.to_string()]);
    assert_eq!(
        config.scope_expression.all_scopes().into_iter().collect::<Vec<_>>(),
        vec![DEFAULT_SCOPE.to_string()]
    );
    assert_eq!(config.frontend_limits_config.unregistered_qps, -1);
    assert_eq!(config.class_config.service_class, "TestEndpoint");
}

#[test]
fn test_method_defaults_for_unprefixed_name() {
    let method = ApiMethodConfig::new(&endpoint_method("getResultNoParams", &[], Some("Foo")));

    assert_eq!(method.name, "testEndpoint.getResultNoParams");
    assert_eq!(method.path, "getResultNoParams");
    assert_eq!(method.http_method, Method::POST);
    assert_eq!(method.implied_resource, None);
    assert_eq!(method.effective_response_status(), 200);

    let void = ApiMethodConfig::new(&endpoint_method("ping", &[], None));
    assert_eq!(void.effective_response_status(), 204);
}

#[test]
fn test_rest_method_prefix_table() {
    let cases = [
        ("listGreetings", RestMethod::List, Method::GET, Some("greetings")),
        ("insertGreeting", RestMethod::Insert, Method::POST, Some("greeting")),
        ("updateGreeting", RestMethod::Update, Method::PUT, Some("greeting")),
        ("deleteGreeting", RestMethod::Delete, Method::DELETE, Some("greeting")),
        ("removeGreeting", RestMethod::Remove, Method::DELETE, Some("greeting")),
        ("getGreeting", RestMethod::Default, Method::POST, None),
        ("list", RestMethod::List, Method::GET, None),
    ];
    for (name, verb, http_method, resource) in cases {
        let found = RestMethod::for_method_name(name);
        assert_eq!(found, verb, "{name}");
        assert_eq!(found.http_method(), http_method, "{name}");
        assert_eq!(found.guess_resource_name(name).as_deref(), resource, "{name}");
    }

    let insert = ApiMethodConfig::new(&endpoint_method("insertGreeting", &["Foo"], None));
    assert_eq!(insert.path, "greeting");
    let bare = ApiMethodConfig::new(&endpoint_method("list", &[], None));
    assert_eq!(bare.path, "list");
}

#[test]
fn test_http_method_override() {
    let mut method = ApiMethodConfig::new(&endpoint_method("getFoo", &[], None));
    method.set_http_method("get").unwrap();
    assert_eq!(method.http_method, Method::GET);

    let err = method.set_http_method("NOT A VERB").unwrap_err();
    assert!(matches!(err, ApiConfigError::InvalidHttpMethod { .. }));
    assert_eq!(method.http_method, Method::GET);
}

#[test]
fn test_required_api_parameters_are_appended_to_path() {
    let universe = universe();
    let serialization = ApiSerializationConfig::new();
    let em = endpoint_method("getFoo", &["long", "String", "List<String>", "Foo"], None);
    let mut method = ApiMethodConfig::new(&em);

    method
        .add_parameter(ApiParameterConfig::named(ty("long"), "id"), &universe, &serialization)
        .unwrap();
    let optional = ApiParameterConfig {
        nullable: true,
        ..ApiParameterConfig::named(ty("String"), "filter")
    };
    method.add_parameter(optional, &universe, &serialization).unwrap();
    method
        .add_parameter(
            ApiParameterConfig::named(ty("List<String>"), "tags"),
            &universe,
            &serialization,
        )
        .unwrap();
    method
        .add_parameter(ApiParameterConfig::new(ty("Foo")), &universe, &serialization)
        .unwrap();
    // Already in the path: not appended twice.
    method
        .add_parameter(ApiParameterConfig::named(ty("int"), "id"), &universe, &serialization)
        .unwrap();

    assert_eq!(method.path, "getFoo/{id}");
    assert_eq!(method.path_parameters(), vec!["id".to_string()]);
    assert_eq!(method.parameters.len(), 5);
}

#[test]
fn test_default_value_must_convert_to_parameter_type() {
    let universe = universe();
    let serialization = ApiSerializationConfig::new();
    let mut method = ApiMethodConfig::new(&endpoint_method("getFoo", &["int"], None));

    let bad = ApiParameterConfig {
        default_value: Some("abc".to_string()),
        ..ApiParameterConfig::named(ty("int"), "count")
    };
    match method.add_parameter(bad, &universe, &serialization).unwrap_err() {
        ApiConfigError::InvalidParameterDefault {
            parameter, value, ..
        } => {
            assert_eq!(parameter, "count");
            assert_eq!(value, "abc");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(method.parameters.is_empty());

    let cases = [
        ("int", "42", true),
        ("byte", "300", false),
        ("Long", "-9", true),
        ("double", "1.5", true),
        ("boolean", "TRUE", true),
        ("boolean", "yes", false),
        ("Color", "RED", true),
        ("Color", "BLUE", false),
        ("List<Integer>", "7", true),
        ("String", "anything", true),
    ];
    for (type_name, value, ok) in cases {
        let param = ApiParameterConfig {
            default_value: Some(value.to_string()),
            ..ApiParameterConfig::named(ty(type_name), "p")
        };
        assert_eq!(
            param
                .validate_default_value(&universe, &serialization, "TestEndpoint.getFoo")
                .is_ok(),
            ok,
            "{type_name} = {value}"
        );
    }
}

#[test]
fn test_parameter_classification() {
    let universe = universe();
    let serialization = ApiSerializationConfig::new();
    let classify = |param: ApiParameterConfig| param.classification(&universe, &serialization).unwrap();

    assert_eq!(classify(ApiParameterConfig::new(ty("HttpRequest"))), Classification::Injected);
    assert_eq!(classify(ApiParameterConfig::new(ty("User"))), Classification::Injected);
    assert_eq!(
        classify(ApiParameterConfig::named(ty("String"), "alt")),
        Classification::Injected
    );
    assert_eq!(classify(ApiParameterConfig::new(ty("T"))), Classification::Unknown);
    assert_eq!(classify(ApiParameterConfig::new(ty("List<?>"))), Classification::Unknown);
    assert_eq!(classify(ApiParameterConfig::new(ty("int"))), Classification::ApiParameter);
    assert_eq!(classify(ApiParameterConfig::new(ty("Color"))), Classification::ApiParameter);
    assert_eq!(
        classify(ApiParameterConfig::new(ty("List<String>"))),
        Classification::ApiParameter
    );
    assert_eq!(classify(ApiParameterConfig::new(ty("Foo"))), Classification::Resource);
    assert_eq!(classify(ApiParameterConfig::new(ty("List<Foo>"))), Classification::Resource);
}

#[test]
fn test_scopes_fall_back_to_current_parent_values() {
    let mut config = api_config();
    let em = endpoint_method("getFoo", &[], None);
    config.method_config_map().get_or_create(&em);
    let key = em.key();

    assert_eq!(config.class_scope().method(&key).unwrap().auth_level(), AuthLevel::None);

    // Parent changed after the method config exists.
    config.auth_level = AuthLevel::Required;
    config.api_key_required = true;
    config.audiences = vec!["aud".to_string()];
    let method = config.class_scope().method(&key).unwrap();
    assert_eq!(method.auth_level(), AuthLevel::Required);
    assert!(method.api_key_required());
    assert_eq!(method.audiences(), ["aud".to_string()]);

    config.class_config.auth_level = Some(AuthLevel::Optional);
    config.class_config.client_ids = Some(vec!["class-client".to_string()]);
    let method = config.class_scope().method(&key).unwrap();
    assert_eq!(method.auth_level(), AuthLevel::Optional);
    assert_eq!(method.client_ids(), ["class-client".to_string()]);

    // Unspecified at the method tier still inherits.
    config.class_config.methods.get_mut(&key).unwrap().auth_level = Some(AuthLevel::Unspecified);
    assert_eq!(
        config.class_scope().method(&key).unwrap().auth_level(),
        AuthLevel::Optional
    );

    config.class_config.methods.get_mut(&key).unwrap().api_key_required = Some(false);
    assert!(!config.class_scope().method(&key).unwrap().api_key_required());
}

#[test]
fn test_method_resource_prefers_class_resource() {
    let mut config = api_config();
    let em = endpoint_method("listGreetings", &[], None);
    config.method_config_map().get_or_create(&em);
    let key = em.key();

    assert_eq!(config.class_scope().method(&key).unwrap().resource(), Some("greetings"));
    config.resource = Some("messages".to_string());
    assert_eq!(config.class_scope().method(&key).unwrap().resource(), Some("messages"));
    config.class_config.resource = Some("posts".to_string());
    assert_eq!(config.class_scope().method(&key).unwrap().resource(), Some("posts"));
}

#[test]
fn test_full_method_name_uses_current_api_name() {
    let mut config = api_config();
    let em = endpoint_method("getResultNoParams", &[], None);
    config.method_config_map().get_or_create(&em);
    config.name = "test".to_string();

    let method = config.class_scope().method(&em.key()).unwrap();
    assert_eq!(method.full_name(), "test.testEndpoint.getResultNoParams");
}

#[test]
fn test_clone_is_independent_and_equal() {
    let mut config = api_config();
    let em = endpoint_method("getFoo", &["int"], None);
    config
        .method_config_map()
        .add_parameter(&em, ApiParameterConfig::named(ty("int"), "id"))
        .unwrap();

    let mut copy = config.clone();
    assert_eq!(copy, config);
    assert!(copy.universe == config.universe);

    copy.class_config.methods.get_mut(&em.key()).unwrap().path = "other".to_string();
    assert_ne!(copy, config);
    assert_eq!(config.class_config.methods[&em.key()].path, "getFoo/{id}");
}

#[test]
fn test_inconsistencies_list_differing_fields() {
    let a = api_config();
    let mut b = a.clone();
    assert!(a.get_inconsistencies(&b).is_empty());

    b.version = "v2".to_string();
    b.title = Some("Other".to_string());
    let found = a.get_inconsistencies(&b);
    let names: Vec<_> = found.iter().map(|i| i.property_name.as_str()).collect();
    assert_eq!(names, vec!["version", "title"]);
    assert_eq!(found[0].value1, serde_json::json!("v1"));
    assert_eq!(found[0].value2, serde_json::json!("v2"));
    assert_eq!(found[0].to_string(), "version (\"v1\" != \"v2\")");

    // Method-level differences are not API-wide.
    let mut c = a.clone();
    c.method_config_map().get_or_create(&endpoint_method("getFoo", &[], None));
    assert!(a.get_inconsistencies(&c).is_empty());
}

#[test]
fn test_api_key_identity() {
    let key = ApiKey::new("guestbook", "v1").with_root("https://example.com/_ah/api");
    assert_eq!(key.to_string(), "guestbook:v1@https://example.com/_ah/api");
    assert_eq!(key.api_string(), "guestbook-v1");
    assert_eq!(key.without_root(), ApiKey::new("guestbook", "v1"));
    assert_ne!(key, ApiKey::new("guestbook", "v1"));
}

#[test]
fn test_scope_expression_groups() {
    let expr = AuthScopeExpression::from_scopes(&["a b", "c", "  "]);
    assert_eq!(expr.alternatives().len(), 2);
    assert_eq!(expr.to_scope_strings(), vec!["a b".to_string(), "c".to_string()]);
    assert_eq!(expr.to_string(), "a b || c");
    assert_eq!(expr.all_scopes().len(), 3);
}
