#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::test_config;
use endpoints_config::schema::{FieldType, SchemaType, MAP_SCHEMA_NAME};
use endpoints_config::{ApiConfigError, ApiKey, SchemaRepository, TypeRef};
use std::sync::Arc;

fn ty(s: &str) -> TypeRef {
    s.parse().unwrap()
}

#[test]
fn test_bean_schema_from_loaded_config() {
    let config = test_config();
    let mut repo = SchemaRepository::new();

    assert!(repo.get(&ty("Greeting"), &config).unwrap().is_none());
    let greeting = repo.get_or_add(&ty("Greeting"), &config).unwrap();
    assert_eq!(greeting.name, "Greeting");
    assert_eq!(greeting.schema_type, SchemaType::Object);
    assert_eq!(greeting.description.as_deref(), Some("A greeting and its replies."));

    let names: Vec<&str> = greeting.fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["id", "message", "mood", "replies"]);
    assert_eq!(greeting.fields["id"].field_type, FieldType::Int64);
    assert_eq!(greeting.fields["mood"].field_type, FieldType::Enum);

    let again = repo.get_or_add(&ty("Greeting"), &config).unwrap();
    assert!(Arc::ptr_eq(&greeting, &again));
    let looked_up = repo.get(&ty("Greeting"), &config).unwrap().unwrap();
    assert!(Arc::ptr_eq(&greeting, &looked_up));
}

#[test]
fn test_self_reference_terminates_and_resolves() {
    let config = test_config();
    let mut repo = SchemaRepository::new();
    let greeting = repo.get_or_add(&ty("Greeting"), &config).unwrap();

    let replies = &greeting.fields["replies"];
    assert_eq!(replies.field_type, FieldType::Array);
    let item = replies.array_item.as_ref().unwrap();
    let resolved = repo
        .resolve(item.schema_reference.as_ref().unwrap())
        .unwrap();
    assert!(Arc::ptr_eq(&greeting, &resolved));
}

#[test]
fn test_collection_and_enum_schemas() {
    let config = test_config();
    let mut repo = SchemaRepository::new();

    let collection = repo.get_or_add(&ty("List<Greeting>"), &config).unwrap();
    assert_eq!(collection.name, "GreetingCollection");
    let items = &collection.fields["items"];
    assert_eq!(items.field_type, FieldType::Object);
    let item = repo
        .resolve(items.schema_reference.as_ref().unwrap())
        .unwrap();
    assert_eq!(item.name, "Greeting");

    let mood = repo.get_or_add(&ty("Mood"), &config).unwrap();
    assert!(mood.is_enum());
    assert_eq!(mood.enum_values, vec!["HAPPY", "SAD"]);
    assert_eq!(mood.enum_descriptions, vec!["", ""]);
}

#[test]
fn test_maps_and_any_share_singletons() {
    let config = test_config();
    let mut repo = SchemaRepository::new();

    let map = repo.get_or_add(&ty("Map<String, Greeting>"), &config).unwrap();
    assert_eq!(map.name, MAP_SCHEMA_NAME);
    assert!(Arc::ptr_eq(&map, &repo.map_schema()));

    let any = repo.get_or_add(&ty("Object"), &config).unwrap();
    assert!(any.is_any());
    assert!(Arc::ptr_eq(&any, &repo.any_schema()));
}

#[test]
fn test_scalars_and_unresolved_types_are_rejected() {
    let config = test_config();
    let mut repo = SchemaRepository::new();

    for bad in ["int", "String", "T", "List<?>"] {
        let err = repo.get_or_add(&ty(bad), &config).unwrap_err();
        assert!(
            matches!(err, ApiConfigError::UnsupportedType { .. }),
            "{bad}: {err}"
        );
    }
}

#[test]
fn test_schemas_are_indexed_per_api_ignoring_root() {
    let config = test_config();
    let mut repo = SchemaRepository::new();
    repo.get_or_add(&ty("List<Greeting>"), &config).unwrap();

    let mut names: Vec<String> = repo
        .get_all_schemas(&ApiKey::new("test", "v2"))
        .iter()
        .map(|s| s.name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Greeting", "GreetingCollection", "Mood"]);

    let with_root = repo.get_all_schemas(&config.api_key());
    assert_eq!(with_root.len(), 3);
    assert!(repo.get_all_schemas(&ApiKey::new("test", "v1")).is_empty());
}
