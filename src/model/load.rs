use crate::transformer::TransformerDef;
use crate::types::{ClassDef, TypeUniverse};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A service description as read from a model file: the classes the service
/// exposes and references, the transformers it uses, and which classes are
/// endpoint (service) classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceModel {
    pub classes: Vec<ClassDef>,
    pub transformers: Vec<TransformerDef>,
    /// Names of the endpoint classes, in load order.
    pub services: Vec<String>,
}

impl ServiceModel {
    /// Register the model's classes and transformers on top of the built-ins.
    pub fn into_universe(self) -> crate::error::Result<(TypeUniverse, Vec<String>)> {
        let mut universe = TypeUniverse::new();
        for class in self.classes {
            universe.register_class(class)?;
        }
        for transformer in self.transformers {
            universe.register_transformer(transformer);
        }
        for service in &self.services {
            universe.require_class(service, "services")?;
        }
        Ok((universe, self.services))
    }
}

/// Parse a service model from YAML or JSON text.
pub fn parse_model(content: &str, yaml: bool) -> anyhow::Result<ServiceModel> {
    let model = if yaml {
        serde_yaml::from_str(content).context("invalid YAML service model")?
    } else {
        serde_json::from_str(content).context("invalid JSON service model")?
    };
    Ok(model)
}

/// Load a service model file. `.yaml`/`.yml` files are read as YAML,
/// everything else as JSON.
pub fn load_model(path: impl AsRef<Path>) -> anyhow::Result<ServiceModel> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read service model {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let model = parse_model(&content, yaml)
        .with_context(|| format!("failed to parse service model {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        classes = model.classes.len(),
        transformers = model.transformers.len(),
        services = model.services.len(),
        "Loaded service model"
    );
    Ok(model)
}
