use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        codec,
        errors::{
            GatewayError, GatewayOperation, LifecycleError, LifecycleResult, ValidationError,
        },
        models::{LifecycleRule, RemoteRule, RemoteRuleSet},
        reconcile,
        value_objects::{BucketName, RuleId},
    },
    ports::{gateway::LifecycleGateway, services::LifecycleService},
    services::policy::ServicePolicy,
};

/// Implementation of the LifecycleService over a remote gateway
#[derive(Clone)]
pub struct LifecycleServiceImpl {
    gateway: Arc<dyn LifecycleGateway>,
    policy: ServicePolicy,
}

impl LifecycleServiceImpl {
    pub fn new(gateway: Arc<dyn LifecycleGateway>) -> Self {
        Self::with_policy(gateway, ServicePolicy::default())
    }

    pub fn with_policy(gateway: Arc<dyn LifecycleGateway>, policy: ServicePolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> &ServicePolicy {
        &self.policy
    }

    async fn require_bucket(&self, bucket: &BucketName) -> LifecycleResult<()> {
        if self.gateway.bucket_exists(bucket).await? {
            Ok(())
        } else {
            Err(LifecycleError::BucketNotFound {
                bucket: bucket.clone(),
            })
        }
    }

    /// Current rule list; a bucket without configuration has none
    async fn fetch_rules(&self, bucket: &BucketName) -> LifecycleResult<RemoteRuleSet> {
        debug!(bucket = %bucket, operation = %GatewayOperation::GetRules, "Fetching lifecycle rules");
        match self.gateway.get_rules(bucket).await {
            Ok(rules) => Ok(rules),
            Err(GatewayError::NotFound { .. }) => Ok(RemoteRuleSet::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn push_rules(&self, bucket: &BucketName, rules: &RemoteRuleSet) -> LifecycleResult<()> {
        debug!(
            bucket = %bucket,
            operation = %GatewayOperation::ReplaceRules,
            rules = rules.len(),
            "Replacing lifecycle rules"
        );
        self.gateway.replace_rules(bucket, rules).await?;
        Ok(())
    }

    /// Read `rule_id` back after a write; it must be there
    fn stored_rule(
        bucket: &BucketName,
        rule_id: &RuleId,
        rules: &RemoteRuleSet,
    ) -> LifecycleResult<LifecycleRule> {
        let remote = rules
            .find(rule_id.as_str())
            .ok_or_else(|| LifecycleError::RuleNotFound {
                bucket: bucket.clone(),
                rule_id: rule_id.clone(),
            })?;
        Self::decode(bucket, remote)
    }

    fn decode(bucket: &BucketName, remote: &RemoteRule) -> LifecycleResult<LifecycleRule> {
        codec::decode(remote).map_err(|source| LifecycleError::Decode {
            operation: GatewayOperation::GetRules,
            bucket: bucket.clone(),
            source,
        })
    }

    /// Delete-all, retrying transient failures with exponential backoff
    async fn delete_all_with_retry(&self, bucket: &BucketName) -> LifecycleResult<()> {
        let gateway = Arc::clone(&self.gateway);
        let operation = || {
            let gateway = Arc::clone(&gateway);
            async move {
                debug!(bucket = %bucket, operation = %GatewayOperation::DeleteAllRules, "Deleting lifecycle configuration");
                match gateway.delete_all_rules(bucket).await {
                    Ok(()) => Ok(()),
                    // Nothing left to delete
                    Err(GatewayError::NotFound { code, .. }) if code != "NoSuchBucket" => Ok(()),
                    Err(e) if e.is_retryable() => Err(backoff::Error::transient(e)),
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        };

        let notify = |e: GatewayError, wait: Duration| {
            warn!(
                bucket = %e.bucket(),
                operation = %e.operation(),
                code = e.code(),
                retry_in = ?wait,
                "Retrying lifecycle deletion"
            );
        };

        backoff::future::retry_notify(self.policy.delete_retry.backoff(), operation, notify)
        .await?;
        Ok(())
    }

    /// Poll until the configuration reads back as absent or empty
    async fn wait_until_deleted(&self, bucket: &BucketName) -> LifecycleResult<()> {
        let wait = self.policy.deletion_wait;
        let started = Instant::now();

        loop {
            match self.gateway.get_rules(bucket).await {
                Err(GatewayError::NotFound { .. }) => return Ok(()),
                Ok(rules) if rules.is_empty() => return Ok(()),
                Ok(rules) => {
                    debug!(bucket = %bucket, remaining = rules.len(), "Lifecycle rules still visible");
                }
                Err(e) if e.is_retryable() => {
                    warn!(bucket = %bucket, error = %e, "Transient failure while waiting for deletion");
                }
                Err(e) => return Err(e.into()),
            }

            let waited = started.elapsed();
            if waited >= wait.timeout {
                return Err(LifecycleError::Timeout {
                    operation: GatewayOperation::DeleteAllRules,
                    bucket: bucket.clone(),
                    waited,
                });
            }
            tokio::time::sleep(wait.interval).await;
        }
    }
}

#[async_trait]
impl LifecycleService for LifecycleServiceImpl {
    async fn create_rule(
        &self,
        bucket: &BucketName,
        rule: LifecycleRule,
    ) -> LifecycleResult<LifecycleRule> {
        self.require_bucket(bucket).await?;

        let before = self.fetch_rules(bucket).await?;
        let merged = reconcile::append_rule(bucket, codec::encode(&rule), &before)?;
        self.push_rules(bucket, &merged).await?;

        let after = self.fetch_rules(bucket).await?;
        let rule_id = match &rule.id {
            Some(id) => id.clone(),
            None => reconcile::recover_assigned_id(bucket, &before, &after, &rule)?,
        };

        let stored = Self::stored_rule(bucket, &rule_id, &after)?;
        info!(bucket = %bucket, rule_id = %rule_id, "Created lifecycle rule");
        Ok(stored)
    }

    async fn read_rule(
        &self,
        bucket: &BucketName,
        rule_id: &RuleId,
    ) -> LifecycleResult<Option<LifecycleRule>> {
        if !self.gateway.bucket_exists(bucket).await? {
            debug!(bucket = %bucket, "Bucket does not exist, rule is gone");
            return Ok(None);
        }

        let rules = self.fetch_rules(bucket).await?;
        rules
            .find(rule_id.as_str())
            .map(|remote| Self::decode(bucket, remote))
            .transpose()
    }

    async fn update_rule(
        &self,
        bucket: &BucketName,
        rule: LifecycleRule,
    ) -> LifecycleResult<LifecycleRule> {
        let rule_id = rule.id.clone().ok_or(ValidationError::MissingRuleId)?;

        let current = self.fetch_rules(bucket).await?;
        let merged = reconcile::replace_rule(bucket, codec::encode(&rule), &current)?;
        self.push_rules(bucket, &merged).await?;

        let after = self.fetch_rules(bucket).await?;
        let stored = Self::stored_rule(bucket, &rule_id, &after)?;
        info!(bucket = %bucket, rule_id = %rule_id, "Updated lifecycle rule");
        Ok(stored)
    }

    async fn apply_rule(
        &self,
        bucket: &BucketName,
        rule: LifecycleRule,
    ) -> LifecycleResult<LifecycleRule> {
        if rule.id.is_some() {
            self.update_rule(bucket, rule).await
        } else {
            self.create_rule(bucket, rule).await
        }
    }

    async fn remove_rule(&self, bucket: &BucketName, rule_id: &RuleId) -> LifecycleResult<()> {
        let current = self.fetch_rules(bucket).await?;
        let remaining = reconcile::remove_rule(bucket, rule_id, &current)?;

        if remaining.is_empty() {
            // OSS rejects an empty configuration
            self.delete_all_with_retry(bucket).await?;
        } else {
            self.push_rules(bucket, &remaining).await?;
        }

        info!(bucket = %bucket, rule_id = %rule_id, "Removed lifecycle rule");
        Ok(())
    }

    async fn delete_lifecycle(&self, bucket: &BucketName) -> LifecycleResult<()> {
        if !self.gateway.bucket_exists(bucket).await? {
            debug!(bucket = %bucket, "Bucket does not exist, nothing to delete");
            return Ok(());
        }

        self.delete_all_with_retry(bucket).await?;
        self.wait_until_deleted(bucket).await?;

        info!(bucket = %bucket, "Deleted lifecycle configuration");
        Ok(())
    }

    async fn list_rules(&self, bucket: &BucketName) -> LifecycleResult<Vec<LifecycleRule>> {
        self.require_bucket(bucket).await?;

        let rules = self.fetch_rules(bucket).await?;
        rules
            .rules
            .iter()
            .map(|remote| Self::decode(bucket, remote))
            .collect()
    }
}
