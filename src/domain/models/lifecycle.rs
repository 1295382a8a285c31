use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::fingerprint::{FingerprintInput, FingerprintSet, Fingerprinted};
use crate::domain::value_objects::{CalendarDate, RuleId};

/// A single lifecycle rule as the user declares it.
///
/// `id` is `None` until the remote has assigned one. The expiration, abort and
/// transition blocks are sent exactly as populated; OSS decides whether a
/// combination of their fields is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct LifecycleRule {
    pub id: Option<RuleId>,
    #[builder(default, into)]
    pub prefix: String,
    #[builder(default)]
    pub enabled: bool,
    #[builder(default)]
    pub tags: FingerprintSet<Tag>,
    pub expiration: Option<Expiration>,
    pub abort_multipart_upload: Option<AbortMultipartUpload>,
    #[builder(default)]
    pub transitions: FingerprintSet<Transition>,
}

impl LifecycleRule {
    /// Same rule content, ignoring identity
    pub fn same_content(&self, other: &LifecycleRule) -> bool {
        self.prefix == other.prefix
            && self.enabled == other.enabled
            && self.tags == other.tags
            && self.expiration == other.expiration
            && self.abort_multipart_upload == other.abort_multipart_upload
            && self.transitions == other.transitions
    }

    pub fn with_id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Object tag filter; a rule matches objects carrying all of its tags
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Fingerprinted for Tag {
    fn fingerprint_input(&self) -> FingerprintInput {
        FingerprintInput::new()
            .text(Some(&self.key))
            .text(Some(&self.value))
    }
}

/// When matching objects are deleted
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expiration {
    pub date: Option<CalendarDate>,
    pub created_before_date: Option<CalendarDate>,
    pub days: Option<u32>,
}

impl Fingerprinted for Expiration {
    fn fingerprint_input(&self) -> FingerprintInput {
        FingerprintInput::new()
            .text(self.date.map(|d| d.to_string()))
            .text(self.created_before_date.map(|d| d.to_string()))
            .number(self.days)
    }
}

/// When incomplete multipart uploads are aborted
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbortMultipartUpload {
    pub created_before_date: Option<CalendarDate>,
    pub days: Option<u32>,
}

impl Fingerprinted for AbortMultipartUpload {
    fn fingerprint_input(&self) -> FingerprintInput {
        FingerprintInput::new()
            .text(self.created_before_date.map(|d| d.to_string()))
            .number(self.days)
    }
}

/// Move matching objects to another storage class
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub created_before_date: Option<CalendarDate>,
    pub days: Option<u32>,
    pub storage_class: StorageClass,
}

impl Fingerprinted for Transition {
    fn fingerprint_input(&self) -> FingerprintInput {
        FingerprintInput::new()
            .text(self.created_before_date.map(|d| d.to_string()))
            .number(self.days)
            .text(Some(self.storage_class.as_str()))
    }
}

/// OSS storage classes a transition can target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageClass {
    #[default]
    Standard,
    IA,
    Archive,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Standard => "Standard",
            StorageClass::IA => "IA",
            StorageClass::Archive => "Archive",
        }
    }
}

impl FromStr for StorageClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(StorageClass::Standard),
            "IA" => Ok(StorageClass::IA),
            "Archive" => Ok(StorageClass::Archive),
            other => Err(ValidationError::InvalidStorageClass(other.to_string())),
        }
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for StorageClass {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StorageClass> for String {
    fn from(value: StorageClass) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let rule = LifecycleRule::builder().prefix("logs/").build();

        assert_eq!(rule.id, None);
        assert_eq!(rule.prefix, "logs/");
        assert!(!rule.enabled);
        assert!(rule.tags.is_empty());
        assert!(rule.expiration.is_none());
        assert!(rule.transitions.is_empty());
    }

    #[test]
    fn test_same_content_ignores_id() {
        let rule = LifecycleRule::builder()
            .prefix("path1/")
            .enabled(true)
            .tags([Tag::new("key1", "value1")].into_iter().collect())
            .build();
        let identified = rule
            .clone()
            .with_id(RuleId::new("rule-1".to_string()).unwrap());

        assert!(rule.same_content(&identified));
        assert_ne!(rule, identified);
    }

    #[test]
    fn test_storage_class_parsing() {
        assert_eq!("IA".parse::<StorageClass>().unwrap(), StorageClass::IA);
        assert_eq!("Archive".parse::<StorageClass>().unwrap(), StorageClass::Archive);
        assert_eq!(StorageClass::default(), StorageClass::Standard);
        assert_eq!(
            "ColdArchive".parse::<StorageClass>(),
            Err(ValidationError::InvalidStorageClass("ColdArchive".to_string()))
        );
    }
}
