//! Deployment context that seeds API defaults.
//!
//! ## Environment Variables
//!
//! - `ENDPOINTS_HOSTNAME` (default: `localhost`)
//! - `ENDPOINTS_PROTOCOL` (default: `https`)
//! - `ENDPOINTS_DEFAULT_API_NAME` (default: `myapi`)
//! - `ENDPOINTS_APP_NAME` (optional)

use std::env;

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_API_NAME: &str = "myapi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContext {
    pub hostname: String,
    pub protocol: String,
    pub default_api_name: String,
    pub app_name: Option<String>,
}

impl Default for ServiceContext {
    fn default() -> Self {
        ServiceContext {
            hostname: DEFAULT_HOSTNAME.to_string(),
            protocol: DEFAULT_PROTOCOL.to_string(),
            default_api_name: DEFAULT_API_NAME.to_string(),
            app_name: None,
        }
    }
}

impl ServiceContext {
    pub fn new(hostname: impl Into<String>, default_api_name: impl Into<String>) -> Self {
        ServiceContext {
            hostname: hostname.into(),
            default_api_name: default_api_name.into(),
            ..ServiceContext::default()
        }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = ServiceContext::default();
        ServiceContext {
            hostname: non_empty_var("ENDPOINTS_HOSTNAME").unwrap_or(defaults.hostname),
            protocol: non_empty_var("ENDPOINTS_PROTOCOL").unwrap_or(defaults.protocol),
            default_api_name: non_empty_var("ENDPOINTS_DEFAULT_API_NAME")
                .unwrap_or(defaults.default_api_name),
            app_name: non_empty_var("ENDPOINTS_APP_NAME"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_defaults() {
        let ctx = ServiceContext::new("example.appspot.com", "greetings").with_protocol("http");
        assert_eq!(ctx.hostname, "example.appspot.com");
        assert_eq!(ctx.default_api_name, "greetings");
        assert_eq!(ctx.protocol, "http");
        assert_eq!(ctx.app_name, None);
    }
}
