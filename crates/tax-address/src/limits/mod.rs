//! Per-scope maximum field lengths accepted by the tax provider.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Maximum lengths, in characters, for each address field sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLimits {
    pub street: usize,
    pub city: usize,
    pub main_division: usize,
    pub postal_code: usize,
    pub country: usize,
}

/// Level of the configuration tree a scope code refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Default,
    Website,
    #[default]
    Store,
}

impl ScopeType {
    pub fn label(&self) -> &'static str {
        match self {
            ScopeType::Default => "default",
            ScopeType::Website => "website",
            ScopeType::Store => "store",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "website" | "websites" => Some(Self::Website),
            "store" | "stores" => Some(Self::Store),
            _ => None,
        }
    }
}

/// Selects which configuration snapshot applies to a build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub scope_type: ScopeType,
}

impl Scope {
    pub fn new(code: Option<String>, scope_type: ScopeType) -> Self {
        Self { code, scope_type }
    }

    pub fn store(code: impl Into<String>) -> Self {
        Self::new(Some(code.into()), ScopeType::Store)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}:{}", self.scope_type.label(), code),
            None => write!(f, "{}", self.scope_type.label()),
        }
    }
}

/// Raised when no field limits are configured for the requested scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no address field limits configured for scope {scope}")]
    MissingScope { scope: Scope },
}

/// Source of field limits, keyed by scope.
pub trait FieldLimitsProvider: Send + Sync {
    fn limits_for(&self, scope: &Scope) -> Result<FieldLimits, ConfigurationError>;
}

/// Failure while loading a limits table from disk.
#[derive(Debug, thiserror::Error)]
pub enum LimitsLoadError {
    #[error("failed to read field limits: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid field limits document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scope {0} is configured more than once")]
    DuplicateScope(Scope),
}

#[derive(Debug, Deserialize)]
struct LimitsEntry {
    #[serde(default)]
    scope_code: Option<String>,
    #[serde(default)]
    scope_type: ScopeType,
    limits: FieldLimits,
}

/// In-memory provider matching scopes exactly. Callers own any fallback policy.
#[derive(Debug, Clone, Default)]
pub struct ScopedLimitsTable {
    entries: HashMap<Scope, FieldLimits>,
}

impl ScopedLimitsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: Scope, limits: FieldLimits) -> Self {
        self.insert(scope, limits);
        self
    }

    pub fn insert(&mut self, scope: Scope, limits: FieldLimits) -> Option<FieldLimits> {
        self.entries.insert(scope, limits)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LimitsLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LimitsLoadError> {
        let entries: Vec<LimitsEntry> = serde_json::from_reader(reader)?;
        let mut table = Self::new();

        for entry in entries {
            let scope = Scope::new(
                entry.scope_code.filter(|code| !code.trim().is_empty()),
                entry.scope_type,
            );
            if table.entries.contains_key(&scope) {
                return Err(LimitsLoadError::DuplicateScope(scope));
            }
            table.insert(scope, entry.limits);
        }

        Ok(table)
    }
}

impl FieldLimitsProvider for ScopedLimitsTable {
    fn limits_for(&self, scope: &Scope) -> Result<FieldLimits, ConfigurationError> {
        self.entries
            .get(scope)
            .copied()
            .ok_or_else(|| ConfigurationError::MissingScope {
                scope: scope.clone(),
            })
    }
}
