pub mod codec;
pub mod errors;
pub mod fingerprint;
pub mod models;
pub mod reconcile;
pub mod value_objects;

// Re-export commonly used types
pub use errors::{
    DecodeError, ErrorKind, GatewayError, GatewayOperation, GatewayResult, LifecycleError,
    LifecycleResult, ValidationError,
};
pub use fingerprint::{Fingerprint, FingerprintSet, Fingerprinted};
pub use models::*;
pub use value_objects::*;
