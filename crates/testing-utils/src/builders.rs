//! Test data builders for creating cluster objects and controller configs

use batch_job_config::{Config, Metrics};
use batch_job_domain::{KubeObject, ObjectKind, OwnerReference};
use serde_json::json;

/// Builder for pods and arbitrary owner objects
pub struct ObjectBuilder {
    object: KubeObject,
}

impl ObjectBuilder {
    pub fn pod(name: &str) -> Self {
        Self::new(ObjectKind::pod(), name)
    }

    pub fn new(kind: ObjectKind, name: &str) -> Self {
        Self {
            object: KubeObject::new(kind, name)
                .with_namespace("test-ns")
                .with_uid(uuid::Uuid::new_v4().to_string()),
        }
    }

    pub fn owned_by(mut self, api_version: &str, kind: &str, name: &str) -> Self {
        self.object
            .owner_references
            .push(OwnerReference::new(api_version, kind, name));
        self
    }

    pub fn build(self) -> KubeObject {
        self.object
    }
}

/// ConfigMap carrying the given `data` entries
pub fn config_map(name: &str, entries: &[(&str, &str)]) -> KubeObject {
    let data: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    KubeObject::new(ObjectKind::config_map(), name)
        .with_namespace("test-ns")
        .with_attributes(json!({ "data": data }))
}

/// Controller config as it looks after loading
pub fn test_config(name: &str, namespace: &str) -> Config {
    Config {
        name: name.to_string(),
        namespace: namespace.to_string(),
        metrics: Metrics {
            prefix: "foo".to_string(),
            ..Metrics::default()
        },
        ..Config::default()
    }
}
