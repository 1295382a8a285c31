use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::{
    errors::ValidationError,
    fingerprint::{FingerprintSet, Fingerprinted},
    models::{AbortMultipartUpload, Expiration, LifecycleRule, StorageClass, Tag, Transition},
    value_objects::{BucketName, CalendarDate, RuleId},
};

/// Prefix of the bucket name generated when none is configured
pub const GENERATED_BUCKET_PREFIX: &str = "tf-oss-bucket-";

/// Declared configuration of one lifecycle rule resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleResourceConfig {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, alias = "lifecycle_id")]
    pub life_cycle_id: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub expiration: Vec<ExpirationBlock>,
    #[serde(default)]
    pub abort_multipart_upload: Vec<AbortMultipartUploadBlock>,
    #[serde(default)]
    pub transitions: Vec<TransitionBlock>,
}

/// Dates are `YYYY-MM-DD`; an empty string or `0` days means unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationBlock {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub created_before_date: String,
    #[serde(default)]
    pub days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortMultipartUploadBlock {
    #[serde(default)]
    pub created_before_date: String,
    #[serde(default)]
    pub days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionBlock {
    #[serde(default)]
    pub created_before_date: String,
    #[serde(default)]
    pub days: i64,
    /// Defaults to `Standard`
    #[serde(default)]
    pub storage_class: String,
}

impl LifecycleResourceConfig {
    /// Resolve the target bucket and the declared rule
    pub fn into_rule(self) -> Result<(BucketName, LifecycleRule), ValidationError> {
        let bucket = match self.bucket {
            Some(name) if !name.is_empty() => BucketName::new(name)?,
            _ => generated_bucket_name()?,
        };

        let id = self
            .life_cycle_id
            .filter(|id| !id.is_empty())
            .map(RuleId::new)
            .transpose()?;

        let expiration = single_block("expiration", self.expiration)?
            .map(Expiration::try_from)
            .transpose()?;
        let abort_multipart_upload =
            single_block("abort_multipart_upload", self.abort_multipart_upload)?
                .map(AbortMultipartUpload::try_from)
                .transpose()?;

        let transitions = self
            .transitions
            .into_iter()
            .map(Transition::try_from)
            .collect::<Result<FingerprintSet<_>, _>>()?;

        let rule = LifecycleRule {
            id,
            prefix: self.prefix,
            enabled: self.enabled,
            tags: self
                .tags
                .into_iter()
                .map(|(key, value)| Tag::new(key, value))
                .collect(),
            expiration,
            abort_multipart_upload,
            transitions,
        };

        Ok((bucket, rule))
    }
}

fn generated_bucket_name() -> Result<BucketName, ValidationError> {
    BucketName::new(format!(
        "{}{}",
        GENERATED_BUCKET_PREFIX,
        Uuid::new_v4().simple()
    ))
}

fn single_block<T>(block: &str, mut blocks: Vec<T>) -> Result<Option<T>, ValidationError> {
    if blocks.len() > 1 {
        return Err(ValidationError::TooManyBlocks {
            block: block.to_string(),
            count: blocks.len(),
            max: 1,
        });
    }
    Ok(blocks.pop())
}

fn optional_date(field: &str, value: &str) -> Result<Option<CalendarDate>, ValidationError> {
    if value.is_empty() {
        Ok(None)
    } else {
        CalendarDate::parse(field, value).map(Some)
    }
}

fn optional_days(field: &str, value: i64) -> Result<Option<u32>, ValidationError> {
    match value {
        0 => Ok(None),
        v if v < 0 => Err(ValidationError::NegativeDays {
            field: field.to_string(),
            value: v,
        }),
        v => u32::try_from(v)
            .map(Some)
            .map_err(|_| ValidationError::InvalidField {
                field: field.to_string(),
                value: v.to_string(),
                expected: format!("at most {}", u32::MAX),
            }),
    }
}

impl TryFrom<ExpirationBlock> for Expiration {
    type Error = ValidationError;

    fn try_from(block: ExpirationBlock) -> Result<Self, Self::Error> {
        Ok(Expiration {
            date: optional_date("expiration.date", &block.date)?,
            created_before_date: optional_date(
                "expiration.created_before_date",
                &block.created_before_date,
            )?,
            days: optional_days("expiration.days", block.days)?,
        })
    }
}

impl TryFrom<AbortMultipartUploadBlock> for AbortMultipartUpload {
    type Error = ValidationError;

    fn try_from(block: AbortMultipartUploadBlock) -> Result<Self, Self::Error> {
        Ok(AbortMultipartUpload {
            created_before_date: optional_date(
                "abort_multipart_upload.created_before_date",
                &block.created_before_date,
            )?,
            days: optional_days("abort_multipart_upload.days", block.days)?,
        })
    }
}

impl TryFrom<TransitionBlock> for Transition {
    type Error = ValidationError;

    fn try_from(block: TransitionBlock) -> Result<Self, Self::Error> {
        let storage_class = if block.storage_class.is_empty() {
            StorageClass::default()
        } else {
            block.storage_class.parse()?
        };

        Ok(Transition {
            created_before_date: optional_date(
                "transitions.created_before_date",
                &block.created_before_date,
            )?,
            days: optional_days("transitions.days", block.days)?,
            storage_class,
        })
    }
}

impl From<&Expiration> for ExpirationBlock {
    fn from(e: &Expiration) -> Self {
        ExpirationBlock {
            date: date_text(e.date),
            created_before_date: date_text(e.created_before_date),
            days: i64::from(e.days.unwrap_or(0)),
        }
    }
}

impl From<&AbortMultipartUpload> for AbortMultipartUploadBlock {
    fn from(a: &AbortMultipartUpload) -> Self {
        AbortMultipartUploadBlock {
            created_before_date: date_text(a.created_before_date),
            days: i64::from(a.days.unwrap_or(0)),
        }
    }
}

impl From<&Transition> for TransitionBlock {
    fn from(t: &Transition) -> Self {
        TransitionBlock {
            created_before_date: date_text(t.created_before_date),
            days: i64::from(t.days.unwrap_or(0)),
            storage_class: t.storage_class.as_str().to_string(),
        }
    }
}

fn date_text(date: Option<CalendarDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

/// Observed state of a lifecycle rule resource.
///
/// The resource ID is the bucket name, so importing a bucket needs nothing
/// but its name. Nested blocks are keyed by fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleResourceState {
    pub id: String,
    pub bucket: String,
    pub prefix: String,
    pub enabled: bool,
    pub life_cycle_id: Option<String>,
    pub tags: FingerprintSet<Tag>,
    pub expiration: BTreeMap<String, ExpirationBlock>,
    pub abort_multipart_upload: BTreeMap<String, AbortMultipartUploadBlock>,
    pub transitions: BTreeMap<String, TransitionBlock>,
}

impl LifecycleResourceState {
    pub fn from_rule(bucket: &BucketName, rule: &LifecycleRule) -> Self {
        LifecycleResourceState {
            id: bucket.as_str().to_string(),
            bucket: bucket.as_str().to_string(),
            prefix: rule.prefix.clone(),
            enabled: rule.enabled,
            life_cycle_id: rule.id.as_ref().map(|id| id.as_str().to_string()),
            tags: rule.tags.clone(),
            expiration: rule
                .expiration
                .iter()
                .map(|e| (e.fingerprint().to_string(), e.into()))
                .collect(),
            abort_multipart_upload: rule
                .abort_multipart_upload
                .iter()
                .map(|a| (a.fingerprint().to_string(), a.into()))
                .collect(),
            transitions: rule
                .transitions
                .iter()
                .map(|(fp, t)| (fp.to_string(), t.into()))
                .collect(),
        }
    }

    /// Configuration that reproduces this state, e.g. after an import
    pub fn to_config(&self) -> LifecycleResourceConfig {
        LifecycleResourceConfig {
            bucket: Some(self.bucket.clone()),
            prefix: self.prefix.clone(),
            enabled: self.enabled,
            life_cycle_id: self.life_cycle_id.clone(),
            tags: self
                .tags
                .values()
                .map(|t| (t.key.clone(), t.value.clone()))
                .collect(),
            expiration: self.expiration.values().cloned().collect(),
            abort_multipart_upload: self.abort_multipart_upload.values().cloned().collect(),
            transitions: self.transitions.values().cloned().collect(),
        }
    }

    /// Terraform flatmap rendering, e.g. `transitions.#` and
    /// `tags.<fingerprint>.key`
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut flat = BTreeMap::new();
        flat.insert("id".to_string(), self.id.clone());
        flat.insert("bucket".to_string(), self.bucket.clone());
        flat.insert("prefix".to_string(), self.prefix.clone());
        flat.insert("enabled".to_string(), self.enabled.to_string());
        flat.insert(
            "life_cycle_id".to_string(),
            self.life_cycle_id.clone().unwrap_or_default(),
        );

        flat.insert("tags.#".to_string(), self.tags.len().to_string());
        for (fp, tag) in &self.tags {
            flat.insert(format!("tags.{}.key", fp), tag.key.clone());
            flat.insert(format!("tags.{}.value", fp), tag.value.clone());
        }

        flat.insert("expiration.#".to_string(), self.expiration.len().to_string());
        for (fp, e) in &self.expiration {
            flat.insert(format!("expiration.{}.date", fp), e.date.clone());
            flat.insert(
                format!("expiration.{}.created_before_date", fp),
                e.created_before_date.clone(),
            );
            flat.insert(format!("expiration.{}.days", fp), e.days.to_string());
        }

        flat.insert(
            "abort_multipart_upload.#".to_string(),
            self.abort_multipart_upload.len().to_string(),
        );
        for (fp, a) in &self.abort_multipart_upload {
            flat.insert(
                format!("abort_multipart_upload.{}.created_before_date", fp),
                a.created_before_date.clone(),
            );
            flat.insert(
                format!("abort_multipart_upload.{}.days", fp),
                a.days.to_string(),
            );
        }

        flat.insert("transitions.#".to_string(), self.transitions.len().to_string());
        for (fp, t) in &self.transitions {
            flat.insert(
                format!("transitions.{}.created_before_date", fp),
                t.created_before_date.clone(),
            );
            flat.insert(format!("transitions.{}.days", fp), t.days.to_string());
            flat.insert(
                format!("transitions.{}.storage_class", fp),
                t.storage_class.clone(),
            );
        }

        flat
    }
}
