//! Access controller configuration
//!
//! Environment variables read by [`AccessConfig::from_env`]:
//! - `ACCESS_DEFAULT_ATTRIBUTES` - comma-separated attribute rules applied
//!   when a grant is authored without metadata (default: `*`)
//! - `ACCESS_LOCK_ON_CONNECT` - lock the grant store after the initial
//!   provider load, `true`/`1` (default: false)

use crate::types::{GrantAttribute, PolicyMetadata};
use tracing::warn;

pub const DEFAULT_ATTRIBUTES_VAR: &str = "ACCESS_DEFAULT_ATTRIBUTES";
pub const LOCK_ON_CONNECT_VAR: &str = "ACCESS_LOCK_ON_CONNECT";

/// Access controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    /// Metadata used when authoring a grant without explicit metadata
    pub default_metadata: PolicyMetadata,

    /// Lock the grant store once the initial provider load succeeds
    pub lock_on_connect: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            default_metadata: PolicyMetadata::default(),
            lock_on_connect: false,
        }
    }
}

impl AccessConfig {
    /// Configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary key lookup; unset or invalid values
    /// fall back to the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(DEFAULT_ATTRIBUTES_VAR) {
            let attributes: Vec<GrantAttribute> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(GrantAttribute::from)
                .collect();

            if attributes.is_empty() {
                warn!("{} is empty, keeping default attributes", DEFAULT_ATTRIBUTES_VAR);
            } else {
                config.default_metadata = PolicyMetadata { attributes };
            }
        }

        if let Some(raw) = lookup(LOCK_ON_CONNECT_VAR) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => config.lock_on_connect = true,
                "false" | "0" | "no" => config.lock_on_connect = false,
                other => warn!("Invalid {} value '{}', using default", LOCK_ON_CONNECT_VAR, other),
            }
        }

        config
    }

    /// Builder-style override of the default metadata
    pub fn with_default_metadata(mut self, metadata: PolicyMetadata) -> Self {
        self.default_metadata = metadata;
        self
    }

    /// Builder-style override of `lock_on_connect`
    pub fn with_lock_on_connect(mut self, lock: bool) -> Self {
        self.lock_on_connect = lock;
        self
    }
}
