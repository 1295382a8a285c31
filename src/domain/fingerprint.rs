use std::collections::btree_map::{self, BTreeMap};
use std::fmt::Debug;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

/// Stable set-membership key of a nested lifecycle block.
///
/// The value is the IEEE CRC-32 of the block's canonical field string, so it
/// matches the hashes Terraform state files already carry for these blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u32);

impl Fingerprint {
    pub fn of(input: &str) -> Self {
        Self(crc32fast::hash(input.as_bytes()))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accumulates the canonical `value-value-...-` string of a block
#[derive(Debug, Default, Clone)]
pub struct FingerprintInput(String);

impl FingerprintInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string field; missing values contribute an empty segment
    pub fn text<S: AsRef<str>>(mut self, value: Option<S>) -> Self {
        if let Some(value) = value {
            self.0.push_str(value.as_ref());
        }
        self.0.push('-');
        self
    }

    /// Append an integer field; missing values contribute `0`
    pub fn number(mut self, value: Option<u32>) -> Self {
        self.0.push_str(&value.unwrap_or(0).to_string());
        self.0.push('-');
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn finish(&self) -> Fingerprint {
        Fingerprint::of(&self.0)
    }
}

/// A block that takes part in fingerprint-keyed set membership
pub trait Fingerprinted {
    fn fingerprint_input(&self) -> FingerprintInput;

    fn fingerprint(&self) -> Fingerprint {
        self.fingerprint_input().finish()
    }
}

/// Unordered set of blocks keyed by their fingerprint.
///
/// Iteration is in ascending fingerprint order regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSet<T> {
    items: BTreeMap<Fingerprint, T>,
}

impl<T> Default for FingerprintSet<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T: Fingerprinted + PartialEq + Debug> FingerprintSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block, returning the element it displaced.
    ///
    /// Two different blocks hashing to the same key keep only the later one.
    pub fn insert(&mut self, item: T) -> Option<T> {
        let key = item.fingerprint();
        if let Some(existing) = self.items.get(&key) {
            if *existing != item {
                warn!(
                    fingerprint = %key,
                    kept = ?item,
                    dropped = ?existing,
                    "Fingerprint collision between different blocks"
                );
            }
        }
        self.items.insert(key, item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.get(&item.fingerprint()) == Some(item)
    }
}

impl<T> FingerprintSet<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Fingerprint, T> {
        self.items.iter()
    }

    pub fn values(&self) -> btree_map::Values<'_, Fingerprint, T> {
        self.items.values()
    }
}

impl<T: Fingerprinted + PartialEq + Debug> FromIterator<T> for FingerprintSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<T: Fingerprinted + PartialEq + Debug> Extend<T> for FingerprintSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T> IntoIterator for FingerprintSet<T> {
    type Item = T;
    type IntoIter = btree_map::IntoValues<Fingerprint, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

impl<'a, T> IntoIterator for &'a FingerprintSet<T> {
    type Item = (&'a Fingerprint, &'a T);
    type IntoIter = btree_map::Iter<'a, Fingerprint, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Serialized as a map from the decimal fingerprint to the block
impl<T: Serialize> Serialize for FingerprintSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AbortMultipartUpload, Expiration, StorageClass, Tag, Transition};
    use crate::domain::value_objects::CalendarDate;

    fn date(value: &str) -> Option<CalendarDate> {
        Some(CalendarDate::parse("date", value).unwrap())
    }

    #[test]
    fn test_input_renders_missing_fields() {
        let input = FingerprintInput::new()
            .text(None::<&str>)
            .text(Some("2015-11-11"))
            .number(None);
        assert_eq!(input.as_str(), "-2015-11-11-0-");
    }

    #[test]
    fn test_tag_fingerprints() {
        let tag = Tag::new("value1", "value2");
        assert_eq!(tag.fingerprint_input().as_str(), "value1-value2-");
        assert_eq!(tag.fingerprint().value(), 1948894006);

        assert_eq!(Tag::new("value3", "value4").fingerprint().value(), 210062390);
        assert_eq!(Tag::new("key1", "value1").fingerprint().value(), 3546191959);
        assert_eq!(Tag::new("key2", "value2").fingerprint().value(), 3254712145);
    }

    #[test]
    fn test_expiration_fingerprints() {
        let by_date = Expiration {
            date: date("2020-11-11"),
            ..Default::default()
        };
        assert_eq!(by_date.fingerprint_input().as_str(), "2020-11-11--0-");
        assert_eq!(by_date.fingerprint().value(), 2211786192);

        let created_before = Expiration {
            created_before_date: date("2015-11-11"),
            ..Default::default()
        };
        assert_eq!(created_before.fingerprint().value(), 1311964506);

        let by_days = Expiration {
            days: Some(365),
            ..Default::default()
        };
        assert_eq!(by_days.fingerprint_input().as_str(), "--365-");
        assert_eq!(by_days.fingerprint().value(), 372706384);
    }

    #[test]
    fn test_field_order_matters() {
        let by_days = Expiration {
            days: Some(365),
            ..Default::default()
        };
        let by_date = Expiration {
            created_before_date: date("2020-11-11"),
            ..Default::default()
        };
        assert_ne!(by_days.fingerprint(), by_date.fingerprint());
    }

    #[test]
    fn test_abort_and_transition_fingerprints() {
        let abort_before = AbortMultipartUpload {
            created_before_date: date("2015-11-11"),
            days: None,
        };
        assert_eq!(abort_before.fingerprint().value(), 3932408476);

        let abort_days = AbortMultipartUpload {
            created_before_date: None,
            days: Some(3),
        };
        assert_eq!(abort_days.fingerprint().value(), 2120234468);

        let to_ia = Transition {
            created_before_date: None,
            days: Some(3),
            storage_class: StorageClass::IA,
        };
        assert_eq!(to_ia.fingerprint_input().as_str(), "-3-IA-");
        assert_eq!(to_ia.fingerprint().value(), 1843369600);

        let to_archive = Transition {
            created_before_date: None,
            days: Some(30),
            storage_class: StorageClass::Archive,
        };
        assert_eq!(to_archive.fingerprint().value(), 2775317341);

        let dated = Transition {
            created_before_date: date("2020-11-11"),
            days: None,
            storage_class: StorageClass::IA,
        };
        assert_eq!(dated.fingerprint().value(), 1549702652);

        assert_eq!(Transition::default().fingerprint().value(), 4016774052);
    }

    #[test]
    fn test_set_ignores_insertion_order() {
        let forward: FingerprintSet<Tag> =
            vec![Tag::new("key1", "value1"), Tag::new("key2", "value2")]
                .into_iter()
                .collect();
        let backward: FingerprintSet<Tag> =
            vec![Tag::new("key2", "value2"), Tag::new("key1", "value1")]
                .into_iter()
                .collect();

        assert_eq!(forward, backward);
        let keys: Vec<u32> = forward.iter().map(|(k, _)| k.value()).collect();
        assert_eq!(keys, vec![3254712145, 3546191959]);
    }

    #[test]
    fn test_set_deduplicates_identical_blocks() {
        let mut set = FingerprintSet::new();
        assert!(set.insert(Tag::new("key1", "value1")).is_none());
        assert!(set.insert(Tag::new("key1", "value1")).is_some());
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Tag::new("key1", "value1")));
        assert!(!set.contains(&Tag::new("key1", "other")));
    }

    #[test]
    fn test_set_serializes_as_fingerprint_map() {
        let set: FingerprintSet<Tag> = vec![Tag::new("value1", "value2")].into_iter().collect();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["1948894006"]["key"], "value1");
        assert_eq!(json["1948894006"]["value"], "value2");
    }
}
