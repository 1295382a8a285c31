use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

const MAX_LEN: usize = 255;

/// Identifier of a lifecycle rule, assigned by OSS or chosen by the user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// Create a new RuleId with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyRuleId);
        }

        let len = value.chars().count();
        if len > MAX_LEN {
            return Err(ValidationError::RuleIdTooLong {
                actual: len,
                max: MAX_LEN,
            });
        }

        Ok(Self(value))
    }

    /// Get the rule ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RuleId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RuleId> for String {
    fn from(value: RuleId) -> Self {
        value.0
    }
}
