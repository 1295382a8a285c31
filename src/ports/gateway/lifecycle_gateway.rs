use crate::domain::{
    errors::GatewayResult, models::RemoteRuleSet, value_objects::BucketName,
};
use async_trait::async_trait;

/// Port onto a remote store of bucket lifecycle configurations.
///
/// The remote has no per-rule operations: a configuration is read, replaced
/// or deleted as a whole.
#[async_trait]
pub trait LifecycleGateway: Send + Sync + 'static {
    /// Check whether the bucket exists
    async fn bucket_exists(&self, bucket: &BucketName) -> GatewayResult<bool>;

    /// Fetch the bucket's full rule list.
    ///
    /// A bucket without any configuration yields `GatewayError::NotFound`.
    async fn get_rules(&self, bucket: &BucketName) -> GatewayResult<RemoteRuleSet>;

    /// Replace the bucket's full rule list; either all of `rules` is stored or nothing
    async fn replace_rules(&self, bucket: &BucketName, rules: &RemoteRuleSet)
        -> GatewayResult<()>;

    /// Remove the bucket's whole lifecycle configuration
    async fn delete_all_rules(&self, bucket: &BucketName) -> GatewayResult<()>;
}
