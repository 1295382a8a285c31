use std::time::Duration;

use thiserror::Error;

use super::{GatewayError, GatewayOperation, ValidationError};
use crate::domain::value_objects::{BucketName, RuleId};

/// A remote rule that cannot be mapped back onto the declared model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unparseable timestamp in '{field}': '{value}' ({reason})")]
    Timestamp {
        field: String,
        value: String,
        reason: String,
    },

    #[error("unknown storage class in '{field}': '{value}'")]
    StorageClass { field: String, value: String },

    #[error("invalid rule ID '{value}': {source}")]
    RuleId {
        value: String,
        #[source]
        source: ValidationError,
    },
}

/// Coarse classification of lifecycle failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    RuleNotFound,
    RuleAlreadyExists,
    IdentityRecovery,
    TransientGateway,
    TerminalGateway,
    Decode,
    Validation,
    Timeout,
}

/// Errors specific to lifecycle rule management
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: BucketName },

    #[error("Lifecycle rule '{rule_id}' not found in bucket '{bucket}'")]
    RuleNotFound { bucket: BucketName, rule_id: RuleId },

    #[error("Lifecycle rule '{rule_id}' already exists in bucket '{bucket}'")]
    RuleAlreadyExists { bucket: BucketName, rule_id: RuleId },

    #[error("Could not recover the ID assigned to the new lifecycle rule in bucket '{bucket}': {reason}")]
    IdentityRecovery { bucket: BucketName, reason: String },

    #[error("Timed out after {waited:?} waiting for {operation} on bucket '{bucket}' to take effect")]
    Timeout {
        operation: GatewayOperation,
        bucket: BucketName,
        waited: Duration,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{operation} on bucket '{bucket}' returned a rule that cannot be decoded: {source}")]
    Decode {
        operation: GatewayOperation,
        bucket: BucketName,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::BucketNotFound { .. } => ErrorKind::NotFound,
            LifecycleError::RuleNotFound { .. } => ErrorKind::RuleNotFound,
            LifecycleError::RuleAlreadyExists { .. } => ErrorKind::RuleAlreadyExists,
            LifecycleError::IdentityRecovery { .. } => ErrorKind::IdentityRecovery,
            LifecycleError::Timeout { .. } => ErrorKind::Timeout,
            LifecycleError::Gateway(GatewayError::NotFound { .. }) => ErrorKind::NotFound,
            LifecycleError::Gateway(GatewayError::Transient { .. }) => ErrorKind::TransientGateway,
            LifecycleError::Gateway(GatewayError::Terminal { .. }) => ErrorKind::TerminalGateway,
            LifecycleError::Decode { .. } => ErrorKind::Decode,
            LifecycleError::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;
