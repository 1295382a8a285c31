//! Merging one desired rule into a bucket's full rule list.
//!
//! OSS only offers "replace the whole configuration", so every local change is
//! expressed as the complete list that should exist afterwards.

use std::collections::HashSet;

use crate::domain::codec;
use crate::domain::errors::{LifecycleError, LifecycleResult};
use crate::domain::models::{LifecycleRule, RemoteRule, RemoteRuleSet};
use crate::domain::value_objects::{BucketName, RuleId};

/// Full rule list to push so that `desired` is stored and every sibling is kept.
///
/// A rule without an id is appended; a rule with an id replaces its namesake.
pub fn reconcile(
    bucket: &BucketName,
    desired: RemoteRule,
    remote: &RemoteRuleSet,
) -> LifecycleResult<RemoteRuleSet> {
    if desired.id.is_empty() {
        append_rule(bucket, desired, remote)
    } else {
        replace_rule(bucket, desired, remote)
    }
}

/// Append a new rule. An explicit id must not collide with an existing rule.
pub fn append_rule(
    bucket: &BucketName,
    desired: RemoteRule,
    remote: &RemoteRuleSet,
) -> LifecycleResult<RemoteRuleSet> {
    if !desired.id.is_empty() && remote.find(&desired.id).is_some() {
        return Err(LifecycleError::RuleAlreadyExists {
            bucket: bucket.clone(),
            rule_id: RuleId::new(desired.id)?,
        });
    }

    let mut rules = remote.rules.clone();
    rules.push(desired);
    Ok(RemoteRuleSet::new(rules))
}

/// Replace the rule with the same id in place
pub fn replace_rule(
    bucket: &BucketName,
    desired: RemoteRule,
    remote: &RemoteRuleSet,
) -> LifecycleResult<RemoteRuleSet> {
    let rule_id = RuleId::new(desired.id.clone())?;
    let position = remote
        .rules
        .iter()
        .position(|rule| rule.id == desired.id)
        .ok_or_else(|| LifecycleError::RuleNotFound {
            bucket: bucket.clone(),
            rule_id,
        })?;

    let mut rules = remote.rules.clone();
    rules[position] = desired;
    Ok(RemoteRuleSet::new(rules))
}

/// Rule list without `rule_id`. An empty result means the whole
/// configuration has to be deleted instead.
pub fn remove_rule(
    bucket: &BucketName,
    rule_id: &RuleId,
    remote: &RemoteRuleSet,
) -> LifecycleResult<RemoteRuleSet> {
    if remote.find(rule_id.as_str()).is_none() {
        return Err(LifecycleError::RuleNotFound {
            bucket: bucket.clone(),
            rule_id: rule_id.clone(),
        });
    }

    Ok(RemoteRuleSet::new(
        remote
            .rules
            .iter()
            .filter(|rule| rule.id != rule_id.as_str())
            .cloned()
            .collect(),
    ))
}

/// Find the id OSS assigned to `desired` by diffing the rule ids seen before
/// and after the push.
///
/// When another writer added rules at the same time, the new rule whose
/// content equals `desired` wins; anything ambiguous is an error.
pub fn recover_assigned_id(
    bucket: &BucketName,
    before: &RemoteRuleSet,
    after: &RemoteRuleSet,
    desired: &LifecycleRule,
) -> LifecycleResult<RuleId> {
    let known: HashSet<&str> = before.ids().collect();
    let added: Vec<&RemoteRule> = after
        .rules
        .iter()
        .filter(|rule| !rule.id.is_empty() && !known.contains(rule.id.as_str()))
        .collect();

    let failure = |reason: String| LifecycleError::IdentityRecovery {
        bucket: bucket.clone(),
        reason,
    };

    let chosen = match added.as_slice() {
        [] => return Err(failure("no new rule ID appeared after the write".to_string())),
        [only] => *only,
        several => {
            let matching: Vec<&RemoteRule> = several
                .iter()
                .copied()
                .filter(|rule| {
                    codec::decode(rule)
                        .map(|decoded| decoded.same_content(desired))
                        .unwrap_or(false)
                })
                .collect();
            match matching.as_slice() {
                [only] => *only,
                _ => {
                    return Err(failure(format!(
                        "{} new rule IDs appeared and {} match the desired rule",
                        several.len(),
                        matching.len()
                    )))
                }
            }
        }
    };

    Ok(RuleId::new(chosen.id.clone())?)
}
