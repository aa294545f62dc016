//! # Generation Runs
//!
//! A [`GenerationRun`] takes the configs of a batch of service classes,
//! groups them by API (name and version, ignoring the serving root) and moves
//! each group through
//!
//! ```text
//! Unvalidated -> Validated -> Emitted
//!      \             \
//!       +-> Failed    +-> Failed
//! ```
//!
//! States are tracked per group. A group that fails validation or rendering
//! is marked [`ApiState::Failed`] with its error; the other groups of the
//! batch carry on. `Emitted` and `Failed` are terminal.

use crate::config::{ApiConfig, ApiKey};
use crate::error::{ApiConfigError, Result};
use crate::schema::SchemaRepository;
use crate::validator::ApiConfigValidator;
use crate::writer::{ApiConfigWriter, DocumentCache};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiState {
    Unvalidated,
    Validated,
    Emitted,
    Failed,
}

impl ApiState {
    fn can_move_to(self, to: ApiState) -> bool {
        matches!(
            (self, to),
            (ApiState::Unvalidated, ApiState::Validated)
                | (ApiState::Unvalidated, ApiState::Failed)
                | (ApiState::Validated, ApiState::Emitted)
                | (ApiState::Validated, ApiState::Failed)
        )
    }
}

impl fmt::Display for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiState::Unvalidated => "UNVALIDATED",
            ApiState::Validated => "VALIDATED",
            ApiState::Emitted => "EMITTED",
            ApiState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// One rendered document of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub key: ApiKey,
    /// `name-version.extension`
    pub file_name: String,
    pub content_type: &'static str,
    pub content: Arc<str>,
}

struct ApiGroup {
    configs: Vec<ApiConfig>,
    state: ApiState,
    error: Option<ApiConfigError>,
}

pub struct GenerationRun {
    groups: IndexMap<ApiKey, ApiGroup>,
}

impl GenerationRun {
    /// Group `configs` by API, in first-seen order.
    pub fn new(configs: impl IntoIterator<Item = ApiConfig>) -> Self {
        let mut groups: IndexMap<ApiKey, ApiGroup> = IndexMap::new();
        for config in configs {
            groups
                .entry(config.api_key().without_root())
                .or_insert_with(|| ApiGroup {
                    configs: Vec::new(),
                    state: ApiState::Unvalidated,
                    error: None,
                })
                .configs
                .push(config);
        }
        GenerationRun { groups }
    }

    pub fn keys(&self) -> impl Iterator<Item = &ApiKey> {
        self.groups.keys()
    }

    pub fn state(&self, key: &ApiKey) -> Option<ApiState> {
        self.groups.get(key).map(|g| g.state)
    }

    pub fn configs(&self, key: &ApiKey) -> Option<&[ApiConfig]> {
        self.groups.get(key).map(|g| g.configs.as_slice())
    }

    pub fn error(&self, key: &ApiKey) -> Option<&ApiConfigError> {
        self.groups.get(key).and_then(|g| g.error.as_ref())
    }

    /// Groups that ended in [`ApiState::Failed`], with their errors.
    pub fn failures(&self) -> Vec<(&ApiKey, &ApiConfigError)> {
        self.groups
            .iter()
            .filter_map(|(key, g)| g.error.as_ref().map(|e| (key, e)))
            .collect()
    }

    /// Move `key` to `to`. Skipping a state, repeating one, or leaving a
    /// terminal state is an error and leaves the state unchanged.
    pub fn transition(&mut self, key: &ApiKey, to: ApiState) -> Result<()> {
        let group = self.groups.get_mut(key).ok_or_else(|| ApiConfigError::InvalidStateTransition {
            api: key.to_string(),
            from: "<unknown api>".to_string(),
            to: to.to_string(),
        })?;
        if !group.state.can_move_to(to) {
            return Err(ApiConfigError::InvalidStateTransition {
                api: key.to_string(),
                from: group.state.to_string(),
                to: to.to_string(),
            });
        }
        debug!(api = %key, from = %group.state, to = %to, "API state transition");
        group.state = to;
        Ok(())
    }

    /// Validate every unvalidated group.
    pub fn validate(&mut self) {
        let validator = ApiConfigValidator::new();
        for (key, group) in self.groups.iter_mut() {
            if group.state != ApiState::Unvalidated {
                continue;
            }
            match validator.validate(&group.configs) {
                Ok(()) => group.state = ApiState::Validated,
                Err(e) => {
                    warn!(api = %key, error = %e, "API failed validation");
                    group.state = ApiState::Failed;
                    group.error = Some(e);
                }
            }
        }
    }

    /// Render every validated group with each of `writers`. A group is only
    /// emitted when all writers succeed; otherwise none of its documents are
    /// returned and it is marked failed.
    pub fn emit(
        &mut self,
        writers: &[&dyn ApiConfigWriter],
        repo: &mut SchemaRepository,
        mut cache: Option<&mut DocumentCache>,
    ) -> Vec<GeneratedDocument> {
        let mut out = Vec::new();
        for (key, group) in self.groups.iter_mut() {
            if group.state != ApiState::Validated {
                continue;
            }
            let mut docs = Vec::with_capacity(writers.len());
            let mut failure = None;
            for writer in writers {
                let rendered = match cache.as_deref_mut() {
                    Some(cache) => cache.get_or_render(*writer, &group.configs, repo),
                    None => writer.emit(&group.configs, repo).map(Arc::from),
                };
                match rendered {
                    Ok(content) => docs.push(GeneratedDocument {
                        key: key.clone(),
                        file_name: format!("{}.{}", key.api_string(), writer.file_extension()),
                        content_type: writer.content_type(),
                        content,
                    }),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            match failure {
                None => {
                    info!(api = %key, documents = docs.len(), "Emitted API documents");
                    group.state = ApiState::Emitted;
                    out.extend(docs);
                }
                Some(e) => {
                    warn!(api = %key, error = %e, "API failed to render");
                    group.state = ApiState::Failed;
                    group.error = Some(e);
                }
            }
        }
        out
    }

    /// Validate, then emit.
    pub fn run(
        &mut self,
        writers: &[&dyn ApiConfigWriter],
        repo: &mut SchemaRepository,
        cache: Option<&mut DocumentCache>,
    ) -> Vec<GeneratedDocument> {
        self.validate();
        self.emit(writers, repo, cache)
    }
}
