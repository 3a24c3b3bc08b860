pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{
    ConfigMapLoader, CONFIG_FILE_NAME, ENV_CONFIG_MAP_NAME, ENV_HOSTNAME, ENV_NAMESPACE,
    POD_TEMPLATE_NAME,
};
pub use models::{
    AppConfig, Config, KubernetesConfig, LoggingConfig, Metric, Metrics, RegistryConfig,
    ServerConfig,
};
pub use validation::{ConfigValidator, ValidationUtils};

use batch_job_errors::ControllerError;

/// Configuration error type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error enumeration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::Configuration(err.to_string())
    }
}
