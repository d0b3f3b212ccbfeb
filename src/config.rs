//! Mapping configuration
//!
//! Chosen once when the [`MappingContext`](crate::mapping::MappingContext) is
//! built. There is no per-call override.

use serde::{Deserialize, Serialize};

use crate::incident::MappingBehavior;
use crate::listener::DispatchMode;

/// Global mapping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Whether incidents abort (strict) or are broadcast (lenient).
    pub behavior: MappingBehavior,
    /// Dispatch mode used by `SnapshotListener::listen`.
    pub default_dispatch: DispatchMode,
}

impl MappingConfig {
    /// Create config where any incident fails the operation.
    pub fn strict() -> Self {
        Self {
            behavior: MappingBehavior::Strict,
            ..Self::default()
        }
    }

    /// Create config where incidents are reported and decoding carries on.
    pub fn lenient() -> Self {
        Self {
            behavior: MappingBehavior::Lenient,
            ..Self::default()
        }
    }

    pub fn with_default_dispatch(mut self, mode: DispatchMode) -> Self {
        self.default_dispatch = mode;
        self
    }

    /// Parse config from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
