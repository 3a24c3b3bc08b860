use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 对象类型描述符（apiVersion + kind）
///
/// 同一个读取接口既用于 Pod，也用于任意 owner 类型，
/// 调用方通过描述符指定要读取的类型。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKind {
    pub api_version: String,
    pub kind: String,
}

impl ObjectKind {
    pub fn new<A: Into<String>, K: Into<String>>(api_version: A, kind: K) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    pub fn pod() -> Self {
        Self::new("v1", "Pod")
    }

    pub fn config_map() -> Self {
        Self::new("v1", "ConfigMap")
    }
}

impl Default for ObjectKind {
    fn default() -> Self {
        Self::pod()
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

impl OwnerReference {
    pub fn new<A: Into<String>, K: Into<String>, N: Into<String>>(
        api_version: A,
        kind: K,
        name: N,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::new(self.api_version.clone(), self.kind.clone())
    }
}

/// 从集群读取到的对象：元数据是强类型的，其余字段保留为属性树
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubeObject {
    pub kind: ObjectKind,
    pub name: String,
    pub namespace: Option<String>,
    pub uid: Option<String>,
    pub owner_references: Vec<OwnerReference>,
    pub attributes: Value,
}

impl KubeObject {
    pub fn new<N: Into<String>>(kind: ObjectKind, name: N) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: None,
            uid: None,
            owner_references: Vec::new(),
            attributes: Value::Null,
        }
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_uid<S: Into<String>>(mut self, uid: S) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_owner(mut self, owner: OwnerReference) -> Self {
        self.owner_references.push(owner);
        self
    }

    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// 只跟随第一个 owner reference
    pub fn first_owner(&self) -> Option<&OwnerReference> {
        self.owner_references.first()
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// 读取 `data` 之类的字符串映射，非字符串值被忽略
    pub fn string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.attribute(key)
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub kind: ObjectKind,
    pub name: String,
}

/// 一次 owner 解析走过的路径；`root` 为空表示没有找到 owner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerChain {
    pub links: Vec<ChainLink>,
    pub root: Option<KubeObject>,
}

impl OwnerChain {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_map_ignores_non_strings() {
        let cm = KubeObject::new(ObjectKind::config_map(), "cm").with_attributes(json!({
            "data": { "config.yaml": "name: foo", "count": 3 }
        }));
        let data = cm.string_map("data");
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("config.yaml").map(String::as_str), Some("name: foo"));
        assert!(cm.string_map("binaryData").is_empty());
    }

    #[test]
    fn test_first_owner_wins() {
        let pod = KubeObject::new(ObjectKind::pod(), "p")
            .with_owner(OwnerReference::new("apps/v1", "ReplicaSet", "rs-1"))
            .with_owner(OwnerReference::new("batch/v1", "Job", "job-1"));
        let owner = pod.first_owner().unwrap();
        assert_eq!(owner.name, "rs-1");
        assert_eq!(owner.object_kind(), ObjectKind::new("apps/v1", "ReplicaSet"));
    }

    #[test]
    fn test_default_kind_is_pod() {
        assert_eq!(ObjectKind::default(), ObjectKind::pod());
        assert_eq!(ObjectKind::pod().to_string(), "v1/Pod");
    }
}
