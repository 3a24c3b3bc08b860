use std::collections::BTreeMap;

use batch_job_domain::KubeObject;
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigResult;

/// 控制器配置，来自 ConfigMap 中的 `config.yaml`
///
/// `namespace`、`job_pod_template` 和 `owner` 不在文件里，加载后由加载器补齐，
/// 之后整个进程只读。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub name: String,
    pub job_service_account: String,
    pub job_node_selector: BTreeMap<String, String>,
    pub run_on_unscheduled_nodes: bool,
    pub cron_expression: String,
    pub report_directory: String,
    pub report_history: u32,
    pub pod_pool_size: u32,
    pub run_on_startup: bool,
    pub metrics: Metrics,
    pub custom: BTreeMap<String, serde_json::Value>,
    pub callback_service_name: String,
    pub callback_service_port: u16,

    #[serde(skip)]
    pub namespace: String,
    #[serde(skip)]
    pub job_pod_template: String,
    #[serde(skip)]
    pub owner: Option<KubeObject>,
}

impl Config {
    /// 解析 YAML（JSON 是其子集）
    pub fn from_yaml(raw: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// 某个节点上某次执行的 job pod 名称
    ///
    /// 节点名按 `.` 切分只取第一段，`worker-1.cluster.local` 得到 `worker-1`。
    pub fn pod_name(&self, node_name: &str, execution_id: &str) -> String {
        let node = node_name.split('.').next().unwrap_or(node_name);
        format!("{}-job-{}-{}", self.name, node, execution_id)
    }
}

impl ConfigValidator for Config {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.name, "name")?;
        ValidationUtils::validate_not_empty(&self.namespace, "namespace")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub prefix: String,
    pub gauges: BTreeMap<String, Metric>,
}

impl Metrics {
    pub fn name_for(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metric {
    pub help: String,
    pub labels: Vec<String>,
}
