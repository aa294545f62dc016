use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Default OAuth scope required by an API.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Client id of the API explorer, allowed by default.
pub const API_EXPLORER_CLIENT_ID: &str = "292824132082.apps.googleusercontent.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthLevel {
    Required,
    Optional,
    OptionalContinue,
    None,
    /// Inherit from the enclosing tier.
    Unspecified,
}

impl fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthLevel::Required => "REQUIRED",
            AuthLevel::Optional => "OPTIONAL",
            AuthLevel::OptionalContinue => "OPTIONAL_CONTINUE",
            AuthLevel::None => "NONE",
            AuthLevel::Unspecified => "UNSPECIFIED",
        };
        f.write_str(s)
    }
}

/// Scope requirement: satisfied when every scope of any one group is granted.
///
/// Built from scope strings where each string is one group and whitespace
/// separates the scopes that must all be present (`"a b"` means a AND b).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthScopeExpression {
    alternatives: Vec<Vec<String>>,
}

impl AuthScopeExpression {
    pub fn from_scopes<S: AsRef<str>>(scopes: &[S]) -> Self {
        let alternatives = scopes
            .iter()
            .map(|s| {
                s.as_ref()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect();
        AuthScopeExpression { alternatives }
    }

    /// Every scope mentioned anywhere in the expression.
    pub fn all_scopes(&self) -> BTreeSet<String> {
        self.alternatives.iter().flatten().cloned().collect()
    }

    pub fn alternatives(&self) -> &[Vec<String>] {
        &self.alternatives
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Scope strings in the form they were declared (`"a b"` per group).
    pub fn to_scope_strings(&self) -> Vec<String> {
        self.alternatives.iter().map(|g| g.join(" ")).collect()
    }
}

impl fmt::Display for AuthScopeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_scope_strings().join(" || "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerConfig {
    pub name: String,
    pub issuer: String,
    pub jwks_uri: String,
}

/// Token issuers accepted by an API, keyed by issuer name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApiIssuerConfigs {
    issuers: IndexMap<String, IssuerConfig>,
}

impl ApiIssuerConfigs {
    pub fn add(&mut self, issuer: IssuerConfig) {
        self.issuers.insert(issuer.name.clone(), issuer);
    }

    pub fn get(&self, name: &str) -> Option<&IssuerConfig> {
        self.issuers.get(name)
    }

    pub fn has_issuer(&self, name: &str) -> bool {
        self.issuers.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IssuerConfig> {
        self.issuers.values()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

/// Audiences accepted per issuer name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApiIssuerAudienceConfig {
    audiences: IndexMap<String, Vec<String>>,
}

impl ApiIssuerAudienceConfig {
    pub fn add(&mut self, issuer: impl Into<String>, audiences: &[String]) {
        let entry = self.audiences.entry(issuer.into()).or_default();
        for audience in audiences {
            if !entry.contains(audience) {
                entry.push(audience.clone());
            }
        }
    }

    pub fn audiences(&self, issuer: &str) -> Option<&[String]> {
        self.audiences.get(issuer).map(Vec::as_slice)
    }

    pub fn issuer_names(&self) -> impl Iterator<Item = &str> {
        self.audiences.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.audiences.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.audiences.is_empty()
    }
}
