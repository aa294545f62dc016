#![allow(dead_code)]

use endpoints_config::{parse_model, ApiConfig, ApiConfigLoader, ServiceContext, TypeUniverse};
use std::sync::Arc;

/// A small service: the `test` v2 API with a bean, an enum and a few methods.
pub const TEST_MODEL: &str = r#"
classes:
  - name: Mood
    kind: enum
    enum_constants: [HAPPY, SAD]
  - name: Greeting
    description: A greeting and its replies.
    properties:
      - name: id
        type: long
      - name: message
        type: String
      - name: mood
        type: Mood
      - name: replies
        type: List<Greeting>
  - name: TestEndpoint
    api:
      name: test
      version: v2
      title: Test API
      description: Greetings for testing.
    methods:
      - name: getResultNoParams
        return_type: Greeting
      - name: doNothing
      - name: getGreeting
        params:
          - type: long
            name: id
        return_type: Greeting
      - name: listGreetings
        params:
          - type: Mood
            name: mood
            nullable: true
        return_type: List<Greeting>
      - name: insertGreeting
        params:
          - type: Greeting
        return_type: Greeting
      - name: helper
        is_public: false
services: [TestEndpoint]
"#;

pub fn test_universe() -> Arc<TypeUniverse> {
    let model = parse_model(TEST_MODEL, true).unwrap();
    let (universe, services) = model.into_universe().unwrap();
    assert_eq!(services, vec!["TestEndpoint".to_string()]);
    Arc::new(universe)
}

/// The loaded config of `TestEndpoint` under the default context.
pub fn test_config() -> ApiConfig {
    let loader = ApiConfigLoader::new(test_universe());
    loader
        .load_configuration(&ServiceContext::default(), "TestEndpoint")
        .unwrap()
}

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a temporary file ending in `.{ext}`. The file is
    /// removed when the returned handle is dropped.
    pub fn create_temp_model(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("endpoints_model_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> NamedTempFile {
        create_temp_model(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> NamedTempFile {
        create_temp_model(content, "json")
    }
}
