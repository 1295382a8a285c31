use crate::domain::value_objects::BucketName;
use thiserror::Error;

/// Calls the service makes against the remote lifecycle API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    BucketExists,
    GetRules,
    ReplaceRules,
    DeleteAllRules,
}

impl GatewayOperation {
    /// Name of the matching OSS SDK call, used in error context and logs
    pub fn sdk_call(&self) -> &'static str {
        match self {
            GatewayOperation::BucketExists => "IsBucketExist",
            GatewayOperation::GetRules => "GetBucketLifecycle",
            GatewayOperation::ReplaceRules => "SetBucketLifecycle",
            GatewayOperation::DeleteAllRules => "DeleteBucketLifecycle",
        }
    }
}

impl std::fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sdk_call())
    }
}

/// Errors reported by a remote gateway, classified by how callers must react
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Bucket or lifecycle configuration absent
    #[error("{operation} on bucket '{bucket}': not found ({code}): {message}")]
    NotFound {
        operation: GatewayOperation,
        bucket: BucketName,
        code: String,
        message: String,
    },

    /// Network or service hiccup; the same call may succeed later
    #[error("{operation} on bucket '{bucket}': transient failure ({code}): {message}")]
    Transient {
        operation: GatewayOperation,
        bucket: BucketName,
        code: String,
        message: String,
    },

    /// Rejected request that will never succeed as-is (AccessDenied, malformed input, ...)
    #[error("{operation} on bucket '{bucket}': request rejected ({code}): {message}")]
    Terminal {
        operation: GatewayOperation,
        bucket: BucketName,
        code: String,
        message: String,
    },
}

impl GatewayError {
    pub fn not_found(
        operation: GatewayOperation,
        bucket: &BucketName,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GatewayError::NotFound {
            operation,
            bucket: bucket.clone(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn transient(
        operation: GatewayOperation,
        bucket: &BucketName,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GatewayError::Transient {
            operation,
            bucket: bucket.clone(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn terminal(
        operation: GatewayOperation,
        bucket: &BucketName,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GatewayError::Terminal {
            operation,
            bucket: bucket.clone(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn operation(&self) -> GatewayOperation {
        match self {
            GatewayError::NotFound { operation, .. }
            | GatewayError::Transient { operation, .. }
            | GatewayError::Terminal { operation, .. } => *operation,
        }
    }

    pub fn bucket(&self) -> &BucketName {
        match self {
            GatewayError::NotFound { bucket, .. }
            | GatewayError::Transient { bucket, .. }
            | GatewayError::Terminal { bucket, .. } => bucket,
        }
    }

    /// Remote error code, e.g. `NoSuchBucket` or `AccessDenied`
    pub fn code(&self) -> &str {
        match self {
            GatewayError::NotFound { code, .. }
            | GatewayError::Transient { code, .. }
            | GatewayError::Terminal { code, .. } => code,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transient { .. })
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_carries_context() {
        let bucket = BucketName::new("logs-bucket".to_string()).unwrap();
        let err = GatewayError::terminal(
            GatewayOperation::DeleteAllRules,
            &bucket,
            "AccessDenied",
            "You have no right to access this object.",
        );

        let msg = err.to_string();
        assert!(msg.contains("DeleteBucketLifecycle"));
        assert!(msg.contains("logs-bucket"));
        assert!(msg.contains("AccessDenied"));
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "AccessDenied");
        assert_eq!(err.operation(), GatewayOperation::DeleteAllRules);
        assert_eq!(err.bucket(), &bucket);
    }

    #[test]
    fn test_only_transient_is_retryable() {
        let bucket = BucketName::new("logs-bucket".to_string()).unwrap();
        let op = GatewayOperation::GetRules;

        assert!(GatewayError::transient(op, &bucket, "InternalError", "").is_retryable());
        assert!(!GatewayError::not_found(op, &bucket, "NoSuchBucket", "").is_retryable());
        assert!(GatewayError::not_found(op, &bucket, "NoSuchLifecycle", "").is_not_found());
    }
}
