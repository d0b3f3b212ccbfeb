//! Mapping behavior

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tolerance applied to incidents, chosen once at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingBehavior {
    /// Fail the operation on the first reported incident
    #[default]
    Strict,
    /// Keep the decoded object, broadcast its incidents
    Lenient,
}

impl MappingBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingBehavior::Strict => "strict",
            MappingBehavior::Lenient => "lenient",
        }
    }

    pub fn is_strict(&self) -> bool {
        *self == MappingBehavior::Strict
    }
}

impl fmt::Display for MappingBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert!(MappingBehavior::default().is_strict());
    }

    #[test]
    fn test_serde_lowercase() {
        let parsed: MappingBehavior = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(parsed, MappingBehavior::Lenient);
        assert_eq!(serde_json::to_string(&MappingBehavior::Strict).unwrap(), "\"strict\"");
    }
}
