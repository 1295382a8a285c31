use serde::{Deserialize, Serialize};

/// The complete rule list of one bucket, as OSS stores it.
///
/// Elements this crate does not model are dropped when the list is read, so
/// rewriting a bucket also discards them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "LifecycleConfiguration")]
pub struct RemoteRuleSet {
    #[serde(rename = "Rule", default)]
    pub rules: Vec<RemoteRule>,
}

impl RemoteRuleSet {
    pub fn new(rules: Vec<RemoteRule>) -> Self {
        Self { rules }
    }

    pub fn find(&self, id: &str) -> Option<&RemoteRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// One rule on the wire; field and element names follow the OSS XML body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteRule {
    #[serde(rename = "ID", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub prefix: String,
    pub status: String,
    #[serde(rename = "Tag", default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<RemoteTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<RemoteExpiration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_multipart_upload: Option<RemoteAbortMultipartUpload>,
    #[serde(rename = "Transition", default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<RemoteTransition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteTag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteExpiration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteAbortMultipartUpload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteTransition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    pub storage_class: String,
}
