use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use serde::{Deserialize, Serialize};

/// Exponential backoff bounds for retried gateway calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(30),
            max_elapsed: Duration::from_secs(5 * 60),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build()
    }
}

/// Fixed-interval polling bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(500),
        }
    }
}

/// Timing bounds of the lifecycle service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePolicy {
    /// Retries of the bucket-wide delete
    pub delete_retry: RetryPolicy,
    /// Polling until a deleted configuration stops being visible
    pub deletion_wait: WaitPolicy,
}

impl ServicePolicy {
    /// Millisecond bounds for tests and local runs against the in-memory gateway
    pub fn fast() -> Self {
        Self {
            delete_retry: RetryPolicy {
                initial_interval: Duration::from_millis(1),
                max_interval: Duration::from_millis(5),
                max_elapsed: Duration::from_millis(500),
            },
            deletion_wait: WaitPolicy {
                interval: Duration::from_millis(1),
                timeout: Duration::from_millis(200),
            },
        }
    }
}
