//! Engine Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunables for one [`Engine`](super::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The loop keeps performing units only while more than this much time remains.
    pub yield_threshold_micros: u64,
    /// Attribute keys starting with this prefix and holding a handler are events.
    pub event_prefix: String,
    /// Fail the render when a function component changes its hook count.
    pub strict_hook_order: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            yield_threshold_micros: 1_000,
            event_prefix: "on".to_string(),
            strict_hook_order: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    /// Parse a config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Yield threshold as a duration.
    pub fn yield_threshold(&self) -> Duration {
        Duration::from_micros(self.yield_threshold_micros)
    }
}
