use crate::domain::{
    errors::LifecycleResult,
    models::LifecycleRule,
    value_objects::{BucketName, RuleId},
};
use async_trait::async_trait;

/// Service port for managing one lifecycle rule among its siblings
#[async_trait]
pub trait LifecycleService: Send + Sync + 'static {
    /// Add a rule to the bucket and return it as stored, with its assigned ID
    async fn create_rule(
        &self,
        bucket: &BucketName,
        rule: LifecycleRule,
    ) -> LifecycleResult<LifecycleRule>;

    /// Read a rule back. A missing bucket, configuration or rule yields `None`.
    async fn read_rule(
        &self,
        bucket: &BucketName,
        rule_id: &RuleId,
    ) -> LifecycleResult<Option<LifecycleRule>>;

    /// Replace an existing rule, leaving every other rule untouched
    async fn update_rule(
        &self,
        bucket: &BucketName,
        rule: LifecycleRule,
    ) -> LifecycleResult<LifecycleRule>;

    /// Create the rule when it carries no ID, update it otherwise
    async fn apply_rule(
        &self,
        bucket: &BucketName,
        rule: LifecycleRule,
    ) -> LifecycleResult<LifecycleRule>;

    /// Remove a single rule, keeping its siblings
    async fn remove_rule(&self, bucket: &BucketName, rule_id: &RuleId) -> LifecycleResult<()>;

    /// Delete the bucket's entire lifecycle configuration and wait until it is gone
    async fn delete_lifecycle(&self, bucket: &BucketName) -> LifecycleResult<()>;

    /// All rules currently configured on the bucket
    async fn list_rules(&self, bucket: &BucketName) -> LifecycleResult<Vec<LifecycleRule>>;
}
