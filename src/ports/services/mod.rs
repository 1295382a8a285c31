mod lifecycle_service;

pub use lifecycle_service::LifecycleService;
