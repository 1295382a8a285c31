use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{GatewayError, GatewayOperation, GatewayResult},
        models::RemoteRuleSet,
        value_objects::BucketName,
    },
    ports::gateway::LifecycleGateway,
};

/// How an injected failure is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    NotFound,
    Transient,
    Terminal,
}

#[derive(Debug, Clone)]
struct Fault {
    kind: FaultKind,
    code: String,
}

/// In-memory emulation of the OSS lifecycle API for testing and development.
///
/// Like OSS it assigns IDs to rules pushed without one, rejects duplicate IDs
/// and empty configurations, and distinguishes a missing bucket from a bucket
/// without configuration. Failures can be queued per operation, and deleted
/// configurations can be kept visible for a few reads to mimic eventual
/// consistency.
#[derive(Clone, Default)]
pub struct InMemoryLifecycleGateway {
    data: Arc<RwLock<GatewayData>>,
}

#[derive(Default)]
struct GatewayData {
    buckets: HashSet<String>,
    // Map of bucket name -> stored configuration
    configurations: HashMap<String, RemoteRuleSet>,
    faults: HashMap<GatewayOperation, VecDeque<Fault>>,
    calls: HashMap<GatewayOperation, usize>,
    // Reads that still see the configuration after the next delete
    linger_reads: HashMap<String, usize>,
    // Deleted configuration and how many more reads will see it
    lingering: HashMap<String, (usize, RemoteRuleSet)>,
}

impl GatewayData {
    /// Count the call and pop the next injected failure, if any
    fn enter(&mut self, operation: GatewayOperation, bucket: &BucketName) -> GatewayResult<()> {
        *self.calls.entry(operation).or_insert(0) += 1;

        let Some(fault) = self
            .faults
            .get_mut(&operation)
            .and_then(|queue| queue.pop_front())
        else {
            return Ok(());
        };

        let message = "injected failure";
        Err(match fault.kind {
            FaultKind::NotFound => GatewayError::not_found(operation, bucket, fault.code, message),
            FaultKind::Transient => GatewayError::transient(operation, bucket, fault.code, message),
            FaultKind::Terminal => GatewayError::terminal(operation, bucket, fault.code, message),
        })
    }

    fn require_bucket(&self, operation: GatewayOperation, bucket: &BucketName) -> GatewayResult<()> {
        if self.buckets.contains(bucket.as_str()) {
            Ok(())
        } else {
            Err(GatewayError::not_found(
                operation,
                bucket,
                "NoSuchBucket",
                "The specified bucket does not exist.",
            ))
        }
    }
}

impl InMemoryLifecycleGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that already knows the given buckets
    pub fn with_buckets<I>(buckets: I) -> Self
    where
        I: IntoIterator<Item = BucketName>,
    {
        let data = GatewayData {
            buckets: buckets.into_iter().map(String::from).collect(),
            ..Default::default()
        };
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub async fn create_bucket(&self, bucket: &BucketName) {
        let mut data = self.data.write().await;
        data.buckets.insert(bucket.as_str().to_string());
    }

    /// Store a configuration directly, bypassing validation and fault injection
    pub async fn seed_rules(&self, bucket: &BucketName, rules: RemoteRuleSet) {
        let mut data = self.data.write().await;
        data.buckets.insert(bucket.as_str().to_string());
        data.configurations
            .insert(bucket.as_str().to_string(), rules);
    }

    /// Snapshot of the stored configuration
    pub async fn rules(&self, bucket: &BucketName) -> Option<RemoteRuleSet> {
        let data = self.data.read().await;
        data.configurations.get(bucket.as_str()).cloned()
    }

    /// Queue a failure for the next call of `operation`
    pub async fn inject_fault(&self, operation: GatewayOperation, kind: FaultKind, code: &str) {
        let mut data = self.data.write().await;
        data.faults.entry(operation).or_default().push_back(Fault {
            kind,
            code: code.to_string(),
        });
    }

    /// Keep the configuration visible for `reads` reads after the next delete
    pub async fn linger_after_delete(&self, bucket: &BucketName, reads: usize) {
        let mut data = self.data.write().await;
        data.linger_reads.insert(bucket.as_str().to_string(), reads);
    }

    /// Number of calls made to `operation`, including failed ones
    pub async fn call_count(&self, operation: GatewayOperation) -> usize {
        let data = self.data.read().await;
        data.calls.get(&operation).copied().unwrap_or(0)
    }
}

#[async_trait]
impl LifecycleGateway for InMemoryLifecycleGateway {
    async fn bucket_exists(&self, bucket: &BucketName) -> GatewayResult<bool> {
        let mut data = self.data.write().await;
        data.enter(GatewayOperation::BucketExists, bucket)?;
        Ok(data.buckets.contains(bucket.as_str()))
    }

    async fn get_rules(&self, bucket: &BucketName) -> GatewayResult<RemoteRuleSet> {
        let op = GatewayOperation::GetRules;
        let mut data = self.data.write().await;
        data.enter(op, bucket)?;
        data.require_bucket(op, bucket)?;

        if let Some((remaining, stale)) = data.lingering.remove(bucket.as_str()) {
            if remaining > 1 {
                data.lingering
                    .insert(bucket.as_str().to_string(), (remaining - 1, stale.clone()));
            }
            return Ok(stale);
        }

        data.configurations
            .get(bucket.as_str())
            .cloned()
            .ok_or_else(|| {
                GatewayError::not_found(
                    op,
                    bucket,
                    "NoSuchLifecycle",
                    "The bucket lifecycle configuration does not exist.",
                )
            })
    }

    async fn replace_rules(&self, bucket: &BucketName, rules: &RemoteRuleSet) -> GatewayResult<()> {
        let op = GatewayOperation::ReplaceRules;
        let mut data = self.data.write().await;
        data.enter(op, bucket)?;
        data.require_bucket(op, bucket)?;

        if rules.is_empty() {
            return Err(GatewayError::terminal(
                op,
                bucket,
                "MalformedXML",
                "The lifecycle configuration must contain at least one rule.",
            ));
        }

        let mut stored = rules.clone();
        let mut seen = HashSet::new();
        for rule in &mut stored.rules {
            if rule.id.is_empty() {
                rule.id = Uuid::new_v4().simple().to_string();
            }
            if !seen.insert(rule.id.clone()) {
                return Err(GatewayError::terminal(
                    op,
                    bucket,
                    "InvalidArgument",
                    format!("Duplicate rule ID '{}'.", rule.id),
                ));
            }
        }

        data.lingering.remove(bucket.as_str());
        data.configurations
            .insert(bucket.as_str().to_string(), stored);
        Ok(())
    }

    async fn delete_all_rules(&self, bucket: &BucketName) -> GatewayResult<()> {
        let op = GatewayOperation::DeleteAllRules;
        let mut data = self.data.write().await;
        data.enter(op, bucket)?;
        data.require_bucket(op, bucket)?;

        let removed = data.configurations.remove(bucket.as_str());
        let linger = data.linger_reads.remove(bucket.as_str()).unwrap_or(0);
        if let (Some(removed), true) = (removed, linger > 0) {
            data.lingering
                .insert(bucket.as_str().to_string(), (linger, removed));
        }
        Ok(())
    }
}
