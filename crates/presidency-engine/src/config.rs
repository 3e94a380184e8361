//! Per-session configuration.
//!
//! Every field has a default, so a JSON config only needs the keys it wants
//! to change:
//!
//! ```
//! use presidency_engine::config::SessionConfig;
//!
//! let config = SessionConfig::from_json_str(r#"{ "president": "Ada", "seed": 7 }"#).unwrap();
//! assert_eq!(config.chaos_threshold, 100);
//! assert_eq!(config.seed, 7);
//! ```

use std::path::Path;

use presidency_core::prelude::StatVector;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Default chaos ceiling; reaching it ends the session.
pub const DEFAULT_CHAOS_THRESHOLD: i32 = 100;

/// Settings fixed at session creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Display name, carried into archives.
    pub president: String,
    /// Chaos level at which the session ends. Must be positive.
    pub chaos_threshold: i32,
    /// Seed for the cosmic wildcard deck.
    pub seed: u64,
    /// Starting vector.
    pub initial: StatVector,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            president: "The President".to_owned(),
            chaos_threshold: DEFAULT_CHAOS_THRESHOLD,
            seed: 0,
            initial: StatVector::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        let config: SessionConfig =
            serde_json::from_str(json).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, SessionError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SessionError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Config`] for an empty president name, a
    /// non-positive chaos threshold, or an initial vector that breaks the
    /// stat invariants.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.president.trim().is_empty() {
            return Err(SessionError::Config("president name is empty".to_owned()));
        }
        if self.chaos_threshold <= 0 {
            return Err(SessionError::Config(format!(
                "chaos_threshold must be positive, got {}",
                self.chaos_threshold
            )));
        }
        self.initial
            .validate()
            .map_err(|e| SessionError::Config(format!("initial vector: {e}")))
    }
}
