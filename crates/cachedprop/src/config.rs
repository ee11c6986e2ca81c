//! Cache construction parameters

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of retained entries
pub const DEFAULT_MAX_ENTRIES: usize = 1;

/// How many entries a cache may retain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// At most this many entries; oldest-inserted evicted first
    Bounded(NonZeroUsize),
    /// Never evict
    Unbounded,
}

impl Capacity {
    /// Validate a requested entry limit (`None` = unbounded)
    pub fn new(max_entries: Option<usize>) -> Result<Self> {
        match max_entries {
            None => Ok(Capacity::Unbounded),
            Some(n) => NonZeroUsize::new(n)
                .map(Capacity::Bounded)
                .ok_or(Error::UnsupportedCapacityPolicy { requested: Some(n) }),
        }
    }

    /// Entry limit, or `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::Bounded(n) => Some(n.get()),
            Capacity::Unbounded => None,
        }
    }

    pub(crate) fn exceeded_by(&self, len: usize) -> bool {
        match self {
            Capacity::Bounded(n) => len > n.get(),
            Capacity::Unbounded => false,
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Bounded(NonZeroUsize::MIN)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(n) => write!(f, "{}", n),
            Capacity::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Configuration for one cached property
///
/// Can be embedded in application config files:
///
/// ```
/// use cachedprop::CacheConfig;
///
/// let config: CacheConfig = serde_json::from_str(r#"{"invalidation_field": "counter"}"#).unwrap();
/// assert_eq!(config.max_entries, Some(1));
/// assert!(!config.verbose);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Host field read as the invalidation key
    pub invalidation_field: String,

    /// Retained entries; `None` (JSON `null`) means unbounded
    #[serde(default = "default_max_entries")]
    pub max_entries: Option<usize>,

    /// Log every hit/miss decision at DEBUG
    #[serde(default)]
    pub verbose: bool,

    /// Property name used in log lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

fn default_max_entries() -> Option<usize> {
    Some(DEFAULT_MAX_ENTRIES)
}

impl CacheConfig {
    /// Create a config keyed on `invalidation_field` with default capacity
    pub fn new(invalidation_field: impl Into<String>) -> Self {
        Self {
            invalidation_field: invalidation_field.into(),
            max_entries: default_max_entries(),
            verbose: false,
            property: None,
        }
    }

    /// Retain up to `max_entries` keys
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Retain every key ever seen
    pub fn unbounded(mut self) -> Self {
        self.max_entries = None;
        self
    }

    /// Toggle hit/miss logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the property label used in logs
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Validated capacity policy
    pub fn capacity(&self) -> Result<Capacity> {
        Capacity::new(self.max_entries)
    }

    /// Label for log lines: the property name, else the invalidation field
    pub fn label(&self) -> &str {
        self.property.as_deref().unwrap_or(&self.invalidation_field)
    }
}
