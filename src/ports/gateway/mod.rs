mod lifecycle_gateway;

pub use lifecycle_gateway::LifecycleGateway;
