use std::sync::Arc;

use batch_job_domain::{ObjectKind, ObjectReader, OwnerResolver};
use batch_job_errors::{ControllerError, ControllerResult};
use tracing::info;

use crate::models::Config;
use crate::validation::ConfigValidator;

/// 控制器自身 pod 名称的环境变量
pub const ENV_HOSTNAME: &str = "HOSTNAME";
/// 控制器 ConfigMap 名称的环境变量
pub const ENV_CONFIG_MAP_NAME: &str = "CONFIG_MAP_NAME";
pub const ENV_NAMESPACE: &str = "NAMESPACE";
/// ConfigMap 中 pod 模板的 key
pub const POD_TEMPLATE_NAME: &str = "pod-template.yaml";
/// ConfigMap 中配置文件的 key
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// 从 ConfigMap 读取控制器配置，并补齐命名空间与 owner
pub struct ConfigMapLoader {
    reader: Arc<dyn ObjectReader>,
    namespace: String,
    config_map_name: String,
    hostname: String,
}

impl ConfigMapLoader {
    pub fn new<N: Into<String>, C: Into<String>, H: Into<String>>(
        reader: Arc<dyn ObjectReader>,
        namespace: N,
        config_map_name: C,
        hostname: H,
    ) -> Self {
        Self {
            reader,
            namespace: namespace.into(),
            config_map_name: config_map_name.into(),
            hostname: hostname.into(),
        }
    }

    pub async fn load(&self) -> ControllerResult<Config> {
        let cm = self
            .reader
            .get(&ObjectKind::config_map(), &self.namespace, &self.config_map_name)
            .await
            .map_err(|e| {
                ControllerError::config_error(format!(
                    "error getting configmap {:?}: {}",
                    self.config_map_name, e
                ))
            })?;
        let data = cm.string_map("data");

        let raw = data.get(CONFIG_FILE_NAME).ok_or_else(|| {
            ControllerError::config_error(format!(
                "could not find config file {:?} in configmap {:?}",
                CONFIG_FILE_NAME, self.config_map_name
            ))
        })?;

        let mut config = Config::from_yaml(raw).map_err(|e| {
            ControllerError::config_error(format!(
                "could not read config file {:?} in configmap {:?}: {}",
                CONFIG_FILE_NAME, self.config_map_name, e
            ))
        })?;

        config.job_pod_template = data
            .get(POD_TEMPLATE_NAME)
            .cloned()
            .ok_or_else(|| {
                ControllerError::config_error(format!(
                    "could not find pod template {:?} in configmap {:?}",
                    POD_TEMPLATE_NAME, self.config_map_name
                ))
            })?;

        config.namespace = self.namespace.clone();
        config.validate()?;

        config.owner = OwnerResolver::new(Arc::clone(&self.reader))
            .resolve_pod_owner(&self.namespace, &self.hostname)
            .await;

        info!(
            name = %config.name,
            namespace = %config.namespace,
            owner = config.owner.as_ref().map(|o| o.name.as_str()).unwrap_or("<none>"),
            "loaded controller config"
        );
        Ok(config)
    }
}
