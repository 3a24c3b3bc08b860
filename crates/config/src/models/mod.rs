pub mod app_config;
pub mod controller;

pub use app_config::{AppConfig, KubernetesConfig, LoggingConfig, RegistryConfig, ServerConfig};
pub use controller::{Config, Metric, Metrics};
