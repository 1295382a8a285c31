use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

/// A validated OSS bucket name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketName(String);

impl BucketName {
    /// Create a new BucketName with OSS naming rules
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.len() < MIN_LEN {
            return Err(ValidationError::BucketNameTooShort {
                actual: value.len(),
                min: MIN_LEN,
            });
        }

        if value.len() > MAX_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        if !value.chars().next().is_some_and(is_lower_alnum) {
            return Err(ValidationError::BucketNameInvalidStart);
        }

        if !value.chars().last().is_some_and(is_lower_alnum) {
            return Err(ValidationError::BucketNameInvalidEnd);
        }

        if let Some(c) = value.chars().find(|c| !is_lower_alnum(*c) && *c != '-') {
            return Err(ValidationError::BucketNameInvalidCharacter(c));
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_lower_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BucketName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BucketName> for String {
    fn from(value: BucketName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(BucketName::new("my-bucket".to_string()).is_ok());
        assert!(BucketName::new("bucket123".to_string()).is_ok());
        assert!(BucketName::new("123bucket".to_string()).is_ok());
        assert!(BucketName::new("tf-testacc-bucket-1234567".to_string()).is_ok());
        assert!(BucketName::new("my--bucket".to_string()).is_ok());
    }

    #[test]
    fn test_invalid_bucket_names() {
        assert_eq!(
            BucketName::new("ab".to_string()),
            Err(ValidationError::BucketNameTooShort { actual: 2, min: 3 })
        );
        assert!(BucketName::new("a".repeat(64)).is_err());

        assert_eq!(
            BucketName::new("-bucket".to_string()),
            Err(ValidationError::BucketNameInvalidStart)
        );
        assert_eq!(
            BucketName::new("bucket-".to_string()),
            Err(ValidationError::BucketNameInvalidEnd)
        );
        assert!(BucketName::new("Bucket".to_string()).is_err());

        assert_eq!(
            BucketName::new("my_bucket".to_string()),
            Err(ValidationError::BucketNameInvalidCharacter('_'))
        );
        assert!(BucketName::new("my.bucket".to_string()).is_err());
        assert!(BucketName::new("my bucket".to_string()).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let name: BucketName = serde_json::from_str("\"logs-bucket\"").unwrap();
        assert_eq!(name.as_str(), "logs-bucket");
        assert!(serde_json::from_str::<BucketName>("\"Logs\"").is_err());
    }
}
