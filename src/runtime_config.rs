//! # Runtime Configuration Module
//!
//! Environment variable based tuning for the document pipeline.
//!
//! ## Environment Variables
//!
//! ### `ENDPOINTS_DOC_CACHE_SIZE`
//!
//! Capacity of the [`DocumentCache`](crate::writer::DocumentCache) in
//! documents. Accepts decimal (`64`) or hexadecimal (`0x40`). Zero or an
//! unparsable value falls back to the default of 64.

use std::env;
use std::num::NonZeroUsize;

const DEFAULT_DOC_CACHE_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of emitted documents kept in the cache
    pub doc_cache_size: NonZeroUsize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            doc_cache_size: default_cache_size(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let doc_cache_size = env::var("ENDPOINTS_DOC_CACHE_SIZE")
            .ok()
            .and_then(|val| parse_size(&val))
            .and_then(NonZeroUsize::new)
            .unwrap_or_else(default_cache_size);
        RuntimeConfig { doc_cache_size }
    }
}

fn default_cache_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_DOC_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN)
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_decimal_and_hex() {
        assert_eq!(parse_size("64"), Some(64));
        assert_eq!(parse_size("0x40"), Some(64));
        assert_eq!(parse_size(" 8 "), Some(8));
        assert_eq!(parse_size("lots"), None);
    }

    #[test]
    fn test_default_cache_size() {
        assert_eq!(RuntimeConfig::default().doc_cache_size.get(), 64);
    }
}
