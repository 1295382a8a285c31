pub mod gateway;
pub mod services;

// Re-export all port traits for convenience
pub use gateway::LifecycleGateway;
pub use services::LifecycleService;
