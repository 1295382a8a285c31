pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - rules, fingerprints, value objects and errors
pub use domain::{
    AbortMultipartUpload,
    // Value objects
    BucketName,
    CalendarDate,
    DecodeError,
    ErrorKind,
    Expiration,
    // Fingerprints
    Fingerprint,
    FingerprintSet,
    Fingerprinted,
    GatewayError,
    GatewayOperation,
    // Errors
    LifecycleError,
    LifecycleResult,
    // Models
    LifecycleRule,
    RemoteRule,
    RemoteRuleSet,
    RuleId,
    StorageClass,
    Tag,
    Transition,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{LifecycleGateway, LifecycleService};

// Service implementations - business logic
pub use services::{LifecycleServiceImpl, RetryPolicy, ServicePolicy, WaitPolicy};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, AppBuilder, AppConfig, AppError, AppServices,
    GatewayBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::inbound::schema::{LifecycleResourceConfig, LifecycleResourceState};
pub use adapters::outbound::memory::{FaultKind, InMemoryLifecycleGateway};
pub use adapters::outbound::oss::{OssConfig, OssCredentials, OssLifecycleGateway};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AppBuilder, AppServices, BucketName, InMemoryLifecycleGateway,
        LifecycleGateway, LifecycleResourceConfig, LifecycleResourceState, LifecycleRule,
        LifecycleService, LifecycleServiceImpl, OssLifecycleGateway, RuleId, ServicePolicy,
    };
}
