use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{ChainLink, KubeObject, ObjectKind, OwnerChain};
use crate::ports::ObjectReader;

/// 单条 owner 链最多跟随的跳数
pub const DEFAULT_MAX_HOPS: usize = 32;

/// 沿 owner reference 向上查找顶层控制器
///
/// 每一步只跟随第一个 owner reference。读取失败不是错误，
/// 解析在该处停止并返回"没有 owner"。
pub struct OwnerResolver {
    reader: Arc<dyn ObjectReader>,
    max_hops: usize,
}

impl OwnerResolver {
    pub fn new(reader: Arc<dyn ObjectReader>) -> Self {
        Self {
            reader,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// 返回根对象；没有 owner 或查找失败时返回 `None`
    pub async fn resolve(
        &self,
        kind: &ObjectKind,
        namespace: &str,
        name: &str,
    ) -> Option<KubeObject> {
        self.resolve_chain(kind, namespace, name).await.root
    }

    /// 查找某个 pod 的顶层 owner
    pub async fn resolve_pod_owner(&self, namespace: &str, pod_name: &str) -> Option<KubeObject> {
        info!(kind = "Pod", name = %pod_name, "looking for owner of pod");
        let owner = self.resolve(&ObjectKind::pod(), namespace, pod_name).await;
        if let Some(owner) = &owner {
            info!(kind = %owner.kind.kind, name = %owner.name, "found owner for pods");
        }
        owner
    }

    pub async fn resolve_chain(&self, kind: &ObjectKind, namespace: &str, name: &str) -> OwnerChain {
        let mut chain = OwnerChain::default();
        let mut visited: HashSet<(ObjectKind, String)> = HashSet::new();
        let mut current_kind = kind.clone();
        let mut current_name = name.to_string();

        loop {
            if chain.links.len() >= self.max_hops {
                warn!(
                    kind = %current_kind.kind,
                    name = %current_name,
                    max_hops = self.max_hops,
                    "owner chain too long, giving up"
                );
                return chain;
            }
            if !visited.insert((current_kind.clone(), current_name.clone())) {
                warn!(kind = %current_kind.kind, name = %current_name, "owner chain contains a cycle");
                return chain;
            }

            chain.links.push(ChainLink {
                kind: current_kind.clone(),
                name: current_name.clone(),
            });

            let object = match self.reader.get(&current_kind, namespace, &current_name).await {
                Ok(object) => object,
                Err(e) => {
                    debug!(
                        kind = %current_kind.kind,
                        name = %current_name,
                        error = %e,
                        "error finding owner"
                    );
                    return chain;
                }
            };

            match object.first_owner() {
                Some(owner) => {
                    current_kind = owner.object_kind();
                    current_name = owner.name.clone();
                }
                None => {
                    chain.root = Some(object);
                    return chain;
                }
            }
        }
    }
}
