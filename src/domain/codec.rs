//! Conversion between declared lifecycle rules and the OSS wire representation.

use tracing::warn;

use crate::domain::errors::DecodeError;
use crate::domain::models::{
    AbortMultipartUpload, Expiration, LifecycleRule, RemoteAbortMultipartUpload,
    RemoteExpiration, RemoteRule, RemoteTag, RemoteTransition, StorageClass, Tag, Transition,
};
use crate::domain::value_objects::{CalendarDate, RuleId};

pub const STATUS_ENABLED: &str = "Enabled";
pub const STATUS_DISABLED: &str = "Disabled";

/// Convert a declared rule into its wire form.
///
/// Every populated field is emitted; mutually exclusive combinations are left
/// for OSS to reject.
pub fn encode(rule: &LifecycleRule) -> RemoteRule {
    RemoteRule {
        id: rule
            .id
            .as_ref()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default(),
        prefix: rule.prefix.clone(),
        status: if rule.enabled {
            STATUS_ENABLED
        } else {
            STATUS_DISABLED
        }
        .to_string(),
        tags: rule
            .tags
            .values()
            .map(|tag| RemoteTag {
                key: tag.key.clone(),
                value: tag.value.clone(),
            })
            .collect(),
        expiration: rule.expiration.as_ref().map(|e| RemoteExpiration {
            date: e.date.map(|d| d.to_remote_timestamp()),
            created_before_date: e.created_before_date.map(|d| d.to_remote_timestamp()),
            days: positive(e.days),
        }),
        abort_multipart_upload: rule.abort_multipart_upload.as_ref().map(|a| {
            RemoteAbortMultipartUpload {
                created_before_date: a.created_before_date.map(|d| d.to_remote_timestamp()),
                days: positive(a.days),
            }
        }),
        transitions: rule
            .transitions
            .values()
            .map(|t| RemoteTransition {
                created_before_date: t.created_before_date.map(|d| d.to_remote_timestamp()),
                days: positive(t.days),
                storage_class: t.storage_class.as_str().to_string(),
            })
            .collect(),
    }
}

/// Convert a wire rule back into the declared model
pub fn decode(remote: &RemoteRule) -> Result<LifecycleRule, DecodeError> {
    let id = if remote.id.is_empty() {
        None
    } else {
        Some(
            RuleId::new(remote.id.clone()).map_err(|source| DecodeError::RuleId {
                value: remote.id.clone(),
                source,
            })?,
        )
    };

    let enabled = match remote.status.as_str() {
        STATUS_ENABLED => true,
        STATUS_DISABLED => false,
        other => {
            warn!(
                rule_id = %remote.id,
                status = other,
                "Unknown lifecycle rule status, treating rule as disabled"
            );
            false
        }
    };

    let tags = remote
        .tags
        .iter()
        .map(|tag| Tag::new(tag.key.clone(), tag.value.clone()))
        .collect();

    let expiration = remote
        .expiration
        .as_ref()
        .map(|e| -> Result<Expiration, DecodeError> {
            Ok(Expiration {
                date: timestamp("Expiration.Date", e.date.as_deref())?,
                created_before_date: timestamp(
                    "Expiration.CreatedBeforeDate",
                    e.created_before_date.as_deref(),
                )?,
                days: positive(e.days),
            })
        })
        .transpose()?;

    let abort_multipart_upload = remote
        .abort_multipart_upload
        .as_ref()
        .map(|a| -> Result<AbortMultipartUpload, DecodeError> {
            Ok(AbortMultipartUpload {
                created_before_date: timestamp(
                    "AbortMultipartUpload.CreatedBeforeDate",
                    a.created_before_date.as_deref(),
                )?,
                days: positive(a.days),
            })
        })
        .transpose()?;

    let transitions = remote
        .transitions
        .iter()
        .map(|t| -> Result<Transition, DecodeError> {
            let storage_class = t.storage_class.parse::<StorageClass>().map_err(|_| {
                DecodeError::StorageClass {
                    field: "Transition.StorageClass".to_string(),
                    value: t.storage_class.clone(),
                }
            })?;
            Ok(Transition {
                created_before_date: timestamp(
                    "Transition.CreatedBeforeDate",
                    t.created_before_date.as_deref(),
                )?,
                days: positive(t.days),
                storage_class,
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(LifecycleRule {
        id,
        prefix: remote.prefix.clone(),
        enabled,
        tags,
        expiration,
        abort_multipart_upload,
        transitions,
    })
}

fn positive(days: Option<u32>) -> Option<u32> {
    days.filter(|d| *d > 0)
}

fn timestamp(field: &str, value: Option<&str>) -> Result<Option<CalendarDate>, DecodeError> {
    match value {
        Some(v) if !v.is_empty() => CalendarDate::from_remote_timestamp(field, v).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> Option<CalendarDate> {
        Some(CalendarDate::parse("date", value).unwrap())
    }

    #[test]
    fn test_encode_emits_every_populated_field() {
        let rule = LifecycleRule::builder()
            .prefix("path1/")
            .enabled(true)
            .expiration(Expiration {
                date: date("2020-11-11"),
                created_before_date: None,
                days: Some(365),
            })
            .abort_multipart_upload(AbortMultipartUpload {
                created_before_date: None,
                days: Some(0),
            })
            .build();

        let remote = encode(&rule);

        assert_eq!(remote.id, "");
        assert_eq!(remote.status, "Enabled");
        let expiration = remote.expiration.unwrap();
        assert_eq!(expiration.date.as_deref(), Some("2020-11-11T00:00:00.000Z"));
        assert_eq!(expiration.days, Some(365));
        assert_eq!(expiration.created_before_date, None);
        // a zero day count is never sent
        assert_eq!(remote.abort_multipart_upload.unwrap().days, None);
    }

    #[test]
    fn test_encode_orders_sets_by_fingerprint() {
        let rule = LifecycleRule::builder()
            .tags(
                [Tag::new("key1", "value1"), Tag::new("key2", "value2")]
                    .into_iter()
                    .collect(),
            )
            .transitions(
                [
                    Transition {
                        created_before_date: None,
                        days: Some(30),
                        storage_class: StorageClass::Archive,
                    },
                    Transition {
                        created_before_date: None,
                        days: Some(3),
                        storage_class: StorageClass::IA,
                    },
                ]
                .into_iter()
                .collect(),
            )
            .build();

        let remote = encode(&rule);

        assert_eq!(remote.status, "Disabled");
        assert_eq!(remote.tags[0].key, "key2");
        assert_eq!(remote.tags[1].key, "key1");
        assert_eq!(remote.transitions[0].storage_class, "IA");
        assert_eq!(remote.transitions[1].storage_class, "Archive");
    }

    #[test]
    fn test_decode_created_before_date() {
        let remote = RemoteRule {
            id: "rule-1".to_string(),
            prefix: "path1/".to_string(),
            status: "Enabled".to_string(),
            expiration: Some(RemoteExpiration {
                created_before_date: Some("2015-11-11T00:00:00.000Z".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let rule = decode(&remote).unwrap();

        assert_eq!(rule.id.unwrap().as_str(), "rule-1");
        assert!(rule.enabled);
        let expiration = rule.expiration.unwrap();
        assert_eq!(expiration.created_before_date, date("2015-11-11"));
        assert_eq!(expiration.date, None);
        assert_eq!(expiration.days, None);
    }

    #[test]
    fn test_decode_unknown_status_is_disabled() {
        let remote = RemoteRule {
            id: "rule-1".to_string(),
            status: "Suspended".to_string(),
            ..Default::default()
        };
        assert!(!decode(&remote).unwrap().enabled);
    }

    #[test]
    fn test_decode_zero_days_is_unset() {
        let remote = RemoteRule {
            id: "rule-1".to_string(),
            status: "Enabled".to_string(),
            abort_multipart_upload: Some(RemoteAbortMultipartUpload {
                created_before_date: None,
                days: Some(0),
            }),
            ..Default::default()
        };
        assert_eq!(
            decode(&remote).unwrap().abort_multipart_upload,
            Some(AbortMultipartUpload::default())
        );
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let remote = RemoteRule {
            id: "rule-1".to_string(),
            status: "Enabled".to_string(),
            transitions: vec![RemoteTransition {
                created_before_date: Some("2015-11-11".to_string()),
                days: None,
                storage_class: "IA".to_string(),
            }],
            ..Default::default()
        };

        match decode(&remote) {
            Err(DecodeError::Timestamp { field, value, .. }) => {
                assert_eq!(field, "Transition.CreatedBeforeDate");
                assert_eq!(value, "2015-11-11");
            }
            other => panic!("expected timestamp error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_storage_class() {
        let remote = RemoteRule {
            id: "rule-1".to_string(),
            status: "Enabled".to_string(),
            transitions: vec![RemoteTransition {
                created_before_date: None,
                days: Some(3),
                storage_class: "ColdArchive".to_string(),
            }],
            ..Default::default()
        };

        assert!(matches!(
            decode(&remote),
            Err(DecodeError::StorageClass { .. })
        ));
    }

    #[test]
    fn test_round_trip_keeps_bare_dates() {
        let rule = LifecycleRule::builder()
            .id(RuleId::new("rule-1".to_string()).unwrap())
            .prefix("path1/")
            .enabled(true)
            .tags([Tag::new("key1", "value1")].into_iter().collect())
            .expiration(Expiration {
                date: date("2020-11-11"),
                ..Default::default()
            })
            .abort_multipart_upload(AbortMultipartUpload {
                created_before_date: date("2015-11-11"),
                days: None,
            })
            .transitions(
                [Transition {
                    created_before_date: date("2020-11-11"),
                    days: None,
                    storage_class: StorageClass::IA,
                }]
                .into_iter()
                .collect(),
            )
            .build();

        assert_eq!(decode(&encode(&rule)).unwrap(), rule);
    }
}
