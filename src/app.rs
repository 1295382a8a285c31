use std::sync::Arc;

use crate::{
    adapters::outbound::{
        memory::InMemoryLifecycleGateway,
        oss::{OssConfig, OssCredentials, OssLifecycleGateway},
    },
    ports::gateway::LifecycleGateway,
    services::{LifecycleServiceImpl, ServicePolicy},
};

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub gateway_backend: GatewayBackend,
    pub policy: ServicePolicy,
}

/// Where lifecycle configurations live
#[derive(Clone, Default)]
pub enum GatewayBackend {
    #[default]
    InMemory,
    Oss {
        /// Region endpoint without scheme, e.g. `oss-cn-hangzhou.aliyuncs.com`
        endpoint: String,
        access_key_id: String,
        access_key_secret: String,
        security_token: Option<String>,
        use_https: bool,
    },
}

impl std::fmt::Debug for GatewayBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayBackend::InMemory => f.write_str("InMemory"),
            GatewayBackend::Oss {
                endpoint,
                access_key_id,
                security_token,
                use_https,
                ..
            } => f
                .debug_struct("Oss")
                .field("endpoint", endpoint)
                .field("access_key_id", access_key_id)
                .field("access_key_secret", &"<redacted>")
                .field("security_token", &security_token.as_ref().map(|_| "<redacted>"))
                .field("use_https", use_https)
                .finish(),
        }
    }
}

/// Application services container
pub struct AppServices {
    pub lifecycle_service: LifecycleServiceImpl,
    /// Present when running against the in-memory backend
    pub memory_gateway: Option<InMemoryLifecycleGateway>,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    gateway: Option<Arc<dyn LifecycleGateway>>,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            gateway: None,
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure gateway backend
    pub fn with_gateway_backend(mut self, backend: GatewayBackend) -> Self {
        self.config.gateway_backend = backend;
        self
    }

    /// Configure retry and polling bounds
    pub fn with_policy(mut self, policy: ServicePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Use an already constructed gateway instead of the configured backend
    pub fn with_gateway(mut self, gateway: Arc<dyn LifecycleGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Build the complete application with services
    pub fn build(self) -> Result<AppServices, AppError> {
        let (gateway, memory_gateway) = match self.gateway {
            Some(gateway) => (gateway, None),
            None => Self::create_gateway(&self.config.gateway_backend)?,
        };

        let lifecycle_service = LifecycleServiceImpl::with_policy(gateway, self.config.policy);

        Ok(AppServices {
            lifecycle_service,
            memory_gateway,
        })
    }

    /// Create the gateway adapter based on configuration
    fn create_gateway(
        backend: &GatewayBackend,
    ) -> Result<(Arc<dyn LifecycleGateway>, Option<InMemoryLifecycleGateway>), AppError> {
        match backend {
            GatewayBackend::InMemory => {
                let gateway = InMemoryLifecycleGateway::new();
                Ok((Arc::new(gateway.clone()), Some(gateway)))
            }
            GatewayBackend::Oss {
                endpoint,
                access_key_id,
                access_key_secret,
                security_token,
                use_https,
            } => {
                let mut config = OssConfig::new(
                    endpoint.clone(),
                    OssCredentials {
                        access_key_id: access_key_id.clone(),
                        access_key_secret: access_key_secret.clone(),
                        security_token: security_token.clone(),
                    },
                );
                config.use_https = *use_https;

                let gateway =
                    OssLifecycleGateway::new(config).map_err(|e| AppError::GatewayInit {
                        message: e.to_string(),
                    })?;
                Ok((Arc::new(gateway), None))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Gateway initialization error: {message}")]
    GatewayInit { message: String },
}

/// Create an in-memory application for testing and development
pub fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_gateway_backend(GatewayBackend::InMemory)
        .build()
}

/// Create application from environment variables
pub fn create_app_from_env() -> Result<AppServices, AppError> {
    let gateway_backend = gateway_backend_from(|key| std::env::var(key).ok())?;
    AppBuilder::new()
        .with_gateway_backend(gateway_backend)
        .build()
}

/// Resolve the gateway backend from an environment lookup.
///
/// `OSS_BACKEND=oss` selects the real service; anything else is in-memory.
pub fn gateway_backend_from<F>(lookup: F) -> Result<GatewayBackend, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Configuration {
                message: format!("{} environment variable required", key),
            })
    };

    match lookup("OSS_BACKEND").as_deref() {
        Some("oss") => {
            let endpoint = match lookup("OSS_ENDPOINT").filter(|v| !v.is_empty()) {
                Some(endpoint) => endpoint,
                None => format!("oss-{}.aliyuncs.com", required("ALICLOUD_REGION")?),
            };
            let use_https = lookup("OSS_USE_HTTPS")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true);

            Ok(GatewayBackend::Oss {
                endpoint,
                access_key_id: required("ALICLOUD_ACCESS_KEY")?,
                access_key_secret: required("ALICLOUD_SECRET_KEY")?,
                security_token: lookup("ALICLOUD_SECURITY_TOKEN").filter(|v| !v.is_empty()),
                use_https,
            })
        }
        _ => Ok(GatewayBackend::InMemory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_create_in_memory_app() {
        let app = create_in_memory_app().unwrap();
        assert!(app.memory_gateway.is_some());
    }

    #[test]
    fn test_app_builder_with_policy() {
        let app = AppBuilder::new()
            .with_policy(ServicePolicy::fast())
            .build()
            .unwrap();
        assert_eq!(*app.lifecycle_service.policy(), ServicePolicy::fast());
    }

    #[test]
    fn test_backend_defaults_to_memory() {
        assert!(matches!(
            gateway_backend_from(lookup(&[])).unwrap(),
            GatewayBackend::InMemory
        ));
    }

    #[test]
    fn test_oss_backend_from_region() {
        let backend = gateway_backend_from(lookup(&[
            ("OSS_BACKEND", "oss"),
            ("ALICLOUD_REGION", "cn-beijing"),
            ("ALICLOUD_ACCESS_KEY", "ak"),
            ("ALICLOUD_SECRET_KEY", "sk"),
        ]))
        .unwrap();

        match backend {
            GatewayBackend::Oss {
                endpoint,
                security_token,
                use_https,
                ..
            } => {
                assert_eq!(endpoint, "oss-cn-beijing.aliyuncs.com");
                assert_eq!(security_token, None);
                assert!(use_https);
            }
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn test_debug_hides_secrets() {
        let backend = GatewayBackend::Oss {
            endpoint: "oss-cn-hangzhou.aliyuncs.com".to_string(),
            access_key_id: "ak".to_string(),
            access_key_secret: "very-secret".to_string(),
            security_token: Some("sts-token".to_string()),
            use_https: true,
        };
        let rendered = format!("{:?}", backend);
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("sts-token"));
        assert!(rendered.contains("oss-cn-hangzhou.aliyuncs.com"));
    }

    #[test]
    fn test_oss_backend_requires_credentials() {
        let err = gateway_backend_from(lookup(&[
            ("OSS_BACKEND", "oss"),
            ("OSS_ENDPOINT", "oss-cn-hangzhou.aliyuncs.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ALICLOUD_ACCESS_KEY"));
    }
}
