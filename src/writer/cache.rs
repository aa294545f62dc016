use super::ApiConfigWriter;
use crate::config::{ApiConfig, ApiKey};
use crate::error::{ApiConfigError, Result};
use crate::runtime_config::RuntimeConfig;
use crate::schema::SchemaRepository;
use crate::types::TypeUniverse;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Cache key: writer extension, API key and a fingerprint of the configs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DocumentKey {
    extension: &'static str,
    api: ApiKey,
    fingerprint: String,
}

/// Hit/miss counters of a [`DocumentCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

/// LRU cache of rendered documents.
///
/// Entries are keyed by a SHA-256 fingerprint of the serialized configs and
/// of the type universes they were loaded against, so a change to a config or
/// to any class, property or transformer definition renders afresh.
pub struct DocumentCache {
    entries: LruCache<DocumentKey, Arc<str>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl DocumentCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        DocumentCache {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.doc_cache_size)
    }

    /// The cached document for `configs`, rendering it with `writer` on a miss.
    ///
    /// Configs are rendered as given; validate them first (or use
    /// [`ApiConfigWriter::write_config`]) when they come from an untrusted
    /// load.
    pub fn get_or_render(
        &mut self,
        writer: &dyn ApiConfigWriter,
        configs: &[ApiConfig],
        repo: &mut SchemaRepository,
    ) -> Result<Arc<str>> {
        let key = document_key(writer, configs)?;
        if let Some(doc) = self.entries.get(&key) {
            self.hits += 1;
            trace!(api = %key.api, format = writer.format_name(), "Document cache hit");
            return Ok(Arc::clone(doc));
        }

        self.misses += 1;
        let doc: Arc<str> = Arc::from(writer.emit(configs, repo)?);
        let will_evict =
            self.entries.peek(&key).is_none() && self.entries.len() >= self.entries.cap().get();
        debug!(api = %key.api, format = writer.format_name(), "Document cache miss, rendered");
        self.entries.put(key, Arc::clone(&doc));
        if will_evict {
            self.evictions += 1;
        }
        Ok(doc)
    }

    pub fn stats(&self) -> DocumentCacheStats {
        DocumentCacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            size: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}

fn document_key(writer: &dyn ApiConfigWriter, configs: &[ApiConfig]) -> Result<DocumentKey> {
    let api = configs
        .first()
        .map(|c| c.api_key())
        .ok_or_else(|| ApiConfigError::Render {
            format: writer.format_name().to_string(),
            api: "<none>".to_string(),
            message: "no configs to render".to_string(),
        })?;
    let fingerprint_error = |e: serde_json::Error| ApiConfigError::Render {
        format: writer.format_name().to_string(),
        api: api.to_string(),
        message: format!("cannot fingerprint configs: {e}"),
    };
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(configs).map_err(fingerprint_error)?);

    let mut universes: Vec<Arc<TypeUniverse>> = Vec::new();
    for config in configs {
        let universe = config.universe.arc();
        if !universes.iter().any(|u| Arc::ptr_eq(u, &universe)) {
            hasher.update(universe.canonical_bytes().map_err(fingerprint_error)?);
            universes.push(universe);
        }
    }
    let result = hasher.finalize();
    Ok(DocumentKey {
        extension: writer.file_extension(),
        api,
        fingerprint: format!("{:x}", result),
    })
}
