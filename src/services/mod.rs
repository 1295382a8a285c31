mod lifecycle_service_impl;
mod policy;

pub use lifecycle_service_impl::LifecycleServiceImpl;
pub use policy::{RetryPolicy, ServicePolicy, WaitPolicy};
