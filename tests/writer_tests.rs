#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{test_config, test_universe};
use endpoints_config::{
    ApiConfigLoader, ApiConfigWriter, ApiKey, ApiState, DiscoveryWriter, DocumentCache,
    GenerationRun, LegacyJsonWriter, OpenApiWriter, RuntimeConfig, SchemaRepository,
    ServiceContext,
};
use oas3::OpenApiV3Spec;
use serde_json::Value;
use std::num::NonZeroUsize;

fn all_writers() -> [&'static dyn ApiConfigWriter; 3] {
    [&LegacyJsonWriter, &DiscoveryWriter, &OpenApiWriter]
}

#[test]
fn test_generation_run_emits_every_format() {
    let mut run = GenerationRun::new([test_config()]);
    let mut repo = SchemaRepository::new();
    let docs = run.run(&all_writers(), &mut repo, None);

    let key = ApiKey::new("test", "v2");
    assert_eq!(run.state(&key), Some(ApiState::Emitted));
    let names: Vec<&str> = docs.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["test-v2.api", "test-v2.discovery", "test-v2.openapi.json"]
    );
    assert!(docs.iter().all(|d| d.content_type == "application/json"));
}

#[test]
fn test_openapi_document_parses() {
    let mut repo = SchemaRepository::new();
    let doc = OpenApiWriter
        .write_config(&[test_config()], &mut repo)
        .unwrap();
    let spec: OpenApiV3Spec = serde_json::from_str(&doc).unwrap();

    assert_eq!(spec.openapi, "3.1.0");
    assert_eq!(spec.info.title, "Test API");
    assert_eq!(spec.info.version, "v2");
    assert_eq!(spec.servers[0].url, "https://localhost/_ah/api/test/v2");

    let paths = spec.paths.as_ref().unwrap();
    let result = paths["/getResultNoParams"].post.as_ref().unwrap();
    assert_eq!(
        result.operation_id.as_deref(),
        Some("TestV2GetResultNoParams")
    );
    let list = paths["/greetings"].get.as_ref().unwrap();
    assert_eq!(list.operation_id.as_deref(), Some("TestV2ListGreetings"));
    assert!(paths["/getGreeting/{id}"].post.is_some());
    assert!(paths["/doNothing"].post.is_some());
}

#[test]
fn test_discovery_document_from_model() {
    let mut repo = SchemaRepository::new();
    let doc = DiscoveryWriter
        .write_config(&[test_config()], &mut repo)
        .unwrap();
    let doc: Value = serde_json::from_str(&doc).unwrap();

    assert_eq!(doc["name"], "test");
    assert_eq!(doc["version"], "v2");
    assert_eq!(doc["description"], "Greetings for testing.");
    assert!(doc["etag"].as_str().unwrap().starts_with('"'));

    let methods = &doc["resources"]["testEndpoint"]["methods"];
    assert_eq!(methods["getResultNoParams"]["httpMethod"], "POST");
    assert_eq!(methods["getResultNoParams"]["path"], "getResultNoParams");
    assert_eq!(
        methods["getResultNoParams"]["id"],
        "test.testEndpoint.getResultNoParams"
    );
    assert!(methods["doNothing"].get("response").is_none());

    let greeting = &doc["schemas"]["Greeting"];
    assert_eq!(greeting["properties"]["replies"]["type"], "array");
    assert_eq!(greeting["properties"]["replies"]["items"]["$ref"], "Greeting");
}

#[test]
fn test_method_name_override_moves_discovery_resource() {
    let mut config = test_config();
    for (_, method) in config.class_config.methods.iter_mut() {
        if method.endpoint_method.name == "getResultNoParams" {
            method.name = "results.latest.get".to_string();
        }
    }
    let mut repo = SchemaRepository::new();
    let doc = DiscoveryWriter.write_config(&[config], &mut repo).unwrap();
    let doc: Value = serde_json::from_str(&doc).unwrap();

    let get = &doc["resources"]["results"]["resources"]["latest"]["methods"]["get"];
    assert_eq!(get["id"], "test.results.latest.get");
}

#[test]
fn test_document_cache_across_reload() {
    let loader = ApiConfigLoader::new(test_universe());
    let context = ServiceContext::default();
    let config = loader.load_configuration(&context, "TestEndpoint").unwrap();
    let mut cache = DocumentCache::new(NonZeroUsize::new(8).unwrap());
    let mut repo = SchemaRepository::new();

    let first = cache
        .get_or_render(&LegacyJsonWriter, std::slice::from_ref(&config), &mut repo)
        .unwrap();

    // An annotation-only loader reloads to an equal config: cache hit.
    let reloaded = loader
        .reload_configuration(&context, "TestEndpoint", &config)
        .unwrap();
    let second = cache
        .get_or_render(&LegacyJsonWriter, &[reloaded.clone()], &mut repo)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.stats().hits, 1);

    let mut changed = reloaded;
    changed.class_config.methods.values_mut().for_each(|m| {
        m.description = Some("changed".to_string());
    });
    cache
        .get_or_render(&LegacyJsonWriter, &[changed], &mut repo)
        .unwrap();
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn test_run_through_cache_from_runtime_config() {
    let mut cache = DocumentCache::from_config(&RuntimeConfig::default());
    let mut repo = SchemaRepository::new();

    let mut first = GenerationRun::new([test_config()]);
    let a = first.run(&all_writers(), &mut repo, Some(&mut cache));
    let mut second = GenerationRun::new([test_config()]);
    let b = second.run(&all_writers(), &mut repo, Some(&mut cache));

    assert_eq!(a, b);
    assert_eq!(cache.stats().misses, 3);
    assert_eq!(cache.stats().hits, 3);
}
