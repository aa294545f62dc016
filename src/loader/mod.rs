//! # Loader Module
//!
//! Populates [`ApiConfig`]s from config sources.
//!
//! ## Sources
//!
//! The annotation reader ([`ApiConfigAnnotationReader`]) is mandatory, static
//! and always applied first. Additional [`ApiConfigSource`]s (for example a
//! datastore-backed override source) may follow; they run in registration
//! order, so later sources override earlier ones. Registering a second
//! annotation reader is an error.
//!
//! ## Load Order
//!
//! 1. fresh [`ApiConfig`] with defaults from the [`ServiceContext`]
//! 2. annotation class pass, then every additional source's class pass
//! 3. annotation method pass, then every additional source's method pass
//!
//! ## Reload
//!
//! [`ApiConfigLoader::reload_configuration`] clones the previous config and
//! re-runs only the sources that report the config as dynamic. The previous
//! config is never touched, so a failing source leaves it intact.

mod annotation;
mod methods;

pub use annotation::{api_annotation_chain, ApiConfigAnnotationReader};
pub use methods::endpoint_methods;

use crate::config::{ApiConfig, MethodConfigMap, INTERNAL_API_NAME};
use crate::context::ServiceContext;
use crate::error::{ApiConfigError, Result};
use crate::types::{ClassDef, TypeUniverse};
use std::sync::Arc;
use tracing::{debug, info};

/// A pluggable provider of configuration.
pub trait ApiConfigSource {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Apply API- and class-level settings for `class`.
    fn load_endpoint_class(
        &self,
        context: &ServiceContext,
        class: &ClassDef,
        config: &mut ApiConfig,
    ) -> Result<()>;

    /// Apply method-level settings for the methods of `class`.
    fn load_endpoint_methods(
        &self,
        context: &ServiceContext,
        class: &ClassDef,
        methods: &mut MethodConfigMap<'_>,
    ) -> Result<()>;

    /// Whether this source's contribution to `config` can change without a
    /// redeploy. Static sources are skipped on reload.
    fn is_static_config(&self, config: &ApiConfig) -> bool;

    /// True only for the framework's annotation reader.
    fn is_annotation_reader(&self) -> bool {
        false
    }
}

pub struct ApiConfigLoader {
    universe: Arc<TypeUniverse>,
    annotation_source: ApiConfigAnnotationReader,
    sources: Vec<Box<dyn ApiConfigSource>>,
}

impl ApiConfigLoader {
    /// A loader reading annotations only.
    pub fn new(universe: Arc<TypeUniverse>) -> Self {
        ApiConfigLoader {
            universe,
            annotation_source: ApiConfigAnnotationReader::new(),
            sources: Vec::new(),
        }
    }

    /// A loader reading annotations, then `sources` in order.
    pub fn with_sources(
        universe: Arc<TypeUniverse>,
        sources: Vec<Box<dyn ApiConfigSource>>,
    ) -> Result<Self> {
        if let Some(duplicate) = sources.iter().find(|s| s.is_annotation_reader()) {
            return Err(ApiConfigError::DuplicateAnnotationSource {
                source_name: duplicate.name().to_string(),
            });
        }
        Ok(ApiConfigLoader {
            universe,
            annotation_source: ApiConfigAnnotationReader::new(),
            sources,
        })
    }

    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    /// Build the config of `service_class` from every source.
    pub fn load_configuration(
        &self,
        context: &ServiceContext,
        service_class: &str,
    ) -> Result<ApiConfig> {
        let class = self.universe.require_class(service_class, "load configuration")?;
        let mut config = ApiConfig::new(Arc::clone(&self.universe), context, service_class);

        self.annotation_source
            .load_endpoint_class(context, class, &mut config)?;
        for source in &self.sources {
            debug!(source = source.name(), class = service_class, "Applying class config source");
            source.load_endpoint_class(context, class, &mut config)?;
        }

        self.annotation_source
            .load_endpoint_methods(context, class, &mut config.method_config_map())?;
        for source in &self.sources {
            debug!(source = source.name(), class = service_class, "Applying method config source");
            source.load_endpoint_methods(context, class, &mut config.method_config_map())?;
        }

        info!(
            api = %config.api_key(),
            class = service_class,
            methods = config.class_config.methods.len(),
            "Loaded API configuration"
        );
        Ok(config)
    }

    /// Rebuild `old_config` by re-running only the dynamic sources on a copy.
    pub fn reload_configuration(
        &self,
        context: &ServiceContext,
        service_class: &str,
        old_config: &ApiConfig,
    ) -> Result<ApiConfig> {
        let class = self.universe.require_class(service_class, "reload configuration")?;
        let mut config = old_config.clone();

        let dynamic: Vec<&dyn ApiConfigSource> = self
            .sources
            .iter()
            .map(|s| &**s)
            .filter(|s| !s.is_static_config(old_config))
            .collect();

        for source in &dynamic {
            source.load_endpoint_class(context, class, &mut config)?;
        }
        for source in &dynamic {
            source.load_endpoint_methods(context, class, &mut config.method_config_map())?;
        }

        info!(
            api = %config.api_key(),
            class = service_class,
            sources = dynamic.len(),
            "Reloaded API configuration"
        );
        Ok(config)
    }

    /// Config for a framework-internal pseudo-API: the reserved internal name,
    /// system defaults, and method annotations only.
    pub fn load_internal_configuration(
        &self,
        context: &ServiceContext,
        service_class: &str,
    ) -> Result<ApiConfig> {
        let class = self.universe.require_class(service_class, "load internal configuration")?;
        let mut config = ApiConfig::new(Arc::clone(&self.universe), context, service_class);
        config.name = INTERNAL_API_NAME.to_string();
        self.annotation_source
            .load_endpoint_methods(context, class, &mut config.method_config_map())?;
        Ok(config)
    }

    /// True when no source can change `config` on reload.
    pub fn is_static_config(&self, config: &ApiConfig) -> bool {
        self.sources.iter().all(|s| s.is_static_config(config))
    }
}
