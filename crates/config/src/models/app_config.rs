use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::loader::{ENV_CONFIG_MAP_NAME, ENV_HOSTNAME, ENV_NAMESPACE};
use crate::validation::{ConfigValidator, ValidationUtils};
use crate::{ConfigError, ConfigResult};

/// Pod 内 service account 挂载的命名空间文件
pub const SERVICE_ACCOUNT_NAMESPACE_FILE: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// 进程级配置：端口、日志、注册表开关以及集群身份
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
    pub kubernetes: KubernetesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 静态报告文件服务端口
    pub public_port: u16,
    /// 回调服务端口；未设置时使用控制器配置中的 `callbackServicePort`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_port: Option<u16>,
    pub metrics_enabled: bool,
    pub metrics_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_port: 8080,
            internal_port: None,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9153".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 关闭时所有回调都会被放行；开启后只接受已通过 `admit` 登记的执行
    ///
    /// 独立运行的二进制不会调用 `admit`，开启后必须由嵌入进程的作业派发方
    /// 通过 `Application::registry()` 登记执行，否则所有回调都返回 406。
    pub enabled: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl KubernetesConfig {
    pub fn resolve_namespace(&self) -> ConfigResult<String> {
        if let Some(ns) = non_empty(self.namespace.clone()) {
            return Ok(ns);
        }
        if let Some(ns) = non_empty(std::env::var(ENV_NAMESPACE).ok()) {
            return Ok(ns);
        }
        std::fs::read_to_string(SERVICE_ACCOUNT_NAMESPACE_FILE)
            .ok()
            .and_then(|ns| non_empty(Some(ns.trim().to_string())))
            .ok_or_else(|| {
                ConfigError::Environment(format!(
                    "namespace not configured: set kubernetes.namespace, {ENV_NAMESPACE} or mount {SERVICE_ACCOUNT_NAMESPACE_FILE}"
                ))
            })
    }

    pub fn resolve_config_map_name(&self) -> ConfigResult<String> {
        non_empty(self.config_map_name.clone())
            .or_else(|| non_empty(std::env::var(ENV_CONFIG_MAP_NAME).ok()))
            .ok_or_else(|| {
                ConfigError::Environment(format!(
                    "configmap name not configured: set kubernetes.config_map_name or {ENV_CONFIG_MAP_NAME}"
                ))
            })
    }

    /// 控制器自身 pod 的名称，用于查找 owner
    pub fn resolve_hostname(&self) -> String {
        non_empty(self.hostname.clone())
            .or_else(|| non_empty(std::env::var(ENV_HOSTNAME).ok()))
            .or_else(|| {
                hostname::get()
                    .ok()
                    .map(|h| h.to_string_lossy().to_string())
            })
            .unwrap_or_default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.public_port", 8080)?
            .set_default("server.metrics_enabled", true)?
            .set_default("server.metrics_address", "0.0.0.0:9153")?
            .set_default("registry.enabled", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("config file does not exist: {}", path));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("BJC")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration to TOML")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_port(self.server.public_port, "server.public_port")?;
        if let Some(port) = self.server.internal_port {
            ValidationUtils::validate_port(port, "server.internal_port")?;
            if port == self.server.public_port {
                return Err(ConfigError::Validation(
                    "server.internal_port must differ from server.public_port".to_string(),
                ));
            }
        }
        if self.server.metrics_enabled {
            ValidationUtils::validate_not_empty(
                &self.server.metrics_address,
                "server.metrics_address",
            )?;
        }
        ValidationUtils::validate_one_of(
            &self.logging.level,
            &["trace", "debug", "info", "warn", "error"],
            "logging.level",
        )?;
        ValidationUtils::validate_one_of(&self.logging.format, &["json", "pretty"], "logging.format")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.public_port, 8080);
        assert!(config.server.internal_port.is_none());
        assert!(!config.registry.enabled);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_from_toml_partial_document() {
        let config = AppConfig::from_toml(
            r#"
[server]
internal_port = 8090

[registry]
enabled = true

[kubernetes]
namespace = "jobs"
"#,
        )
        .unwrap();

        assert_eq!(config.server.public_port, 8080);
        assert_eq!(config.server.internal_port, Some(8090));
        assert!(config.registry.enabled);
        assert_eq!(config.kubernetes.namespace.as_deref(), Some("jobs"));
        assert_eq!(config.kubernetes.resolve_namespace().unwrap(), "jobs");
    }

    #[test]
    fn test_rejects_conflicting_ports() {
        let result = AppConfig::from_toml(
            r#"
[server]
public_port = 8080
internal_port = 8080
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let result = AppConfig::from_toml(
            r#"
[logging]
format = "xml"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_uppercase_log_format() {
        let result = AppConfig::from_toml(
            r#"
[logging]
format = "JSON"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_values() {
        let mut config = AppConfig::default();
        config.server.internal_port = Some(9000);
        let raw = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&raw).unwrap();
        assert_eq!(parsed.server.internal_port, Some(9000));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controller.toml");
        std::fs::write(
            &path,
            r#"
[server]
public_port = 8181

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.server.public_port, 8181);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert!(!config.registry.enabled);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(AppConfig::load(Some("/nonexistent/controller.toml")).is_err());
    }

    #[test]
    fn test_configured_hostname_wins() {
        let k8s = KubernetesConfig {
            hostname: Some("controller-0".to_string()),
            ..KubernetesConfig::default()
        };
        assert_eq!(k8s.resolve_hostname(), "controller-0");
    }
}
