use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use batch_job_config::Metrics;
use batch_job_domain::{CallbackKind, ExecutionKey, ExecutionRecord, ExecutionRegistry};
use chrono::Utc;
use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const CALLBACKS_RECEIVED_TOTAL: &str = "callbacks_received_total";
pub const CALLBACK_BYTES_RECEIVED_TOTAL: &str = "callback_bytes_received_total";

/// 内存执行注册表
///
/// 键为 (节点, 执行ID)。准入与清除由作业生命周期的持有者驱动，
/// 回调服务只读取准入状态并回写到达信息。
#[derive(Debug, Clone)]
pub struct InMemoryExecutionRegistry {
    records: Arc<RwLock<HashMap<ExecutionKey, ExecutionRecord>>>,
    callbacks_metric: String,
    bytes_metric: String,
}

impl InMemoryExecutionRegistry {
    pub fn new(metrics: &Metrics) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            callbacks_metric: metric_name(metrics, CALLBACKS_RECEIVED_TOTAL),
            bytes_metric: metric_name(metrics, CALLBACK_BYTES_RECEIVED_TOTAL),
        }
    }

    /// 允许 (node, execution_id) 提交回调；重复准入保留原有记录
    pub async fn admit(&self, node: &str, execution_id: &str) {
        let key = ExecutionKey::new(node, execution_id);
        let mut records = self.records.write().await;
        if !records.contains_key(&key) {
            info!(node = %node, execution_id = %execution_id, "execution admitted");
            records.insert(key, ExecutionRecord::new(Utc::now()));
        }
    }

    pub async fn evict(&self, node: &str, execution_id: &str) -> Option<ExecutionRecord> {
        let removed = self
            .records
            .write()
            .await
            .remove(&ExecutionKey::new(node, execution_id));
        if removed.is_some() {
            info!(node = %node, execution_id = %execution_id, "execution evicted");
        }
        removed
    }

    /// 清除某次执行在所有节点上的记录，返回清除数量
    pub async fn evict_execution(&self, execution_id: &str) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|key, _| key.execution_id != execution_id);
        let removed = before - records.len();
        info!(execution_id = %execution_id, removed, "execution evicted on all nodes");
        removed
    }

    pub async fn get(&self, node: &str, execution_id: &str) -> Option<ExecutionRecord> {
        self.records
            .read()
            .await
            .get(&ExecutionKey::new(node, execution_id))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn metric_name(metrics: &Metrics, name: &str) -> String {
    if metrics.prefix.is_empty() {
        name.to_string()
    } else {
        metrics.name_for(name)
    }
}

#[async_trait]
impl ExecutionRegistry for InMemoryExecutionRegistry {
    async fn has(&self, node: &str, execution_id: &str) -> bool {
        self.records
            .read()
            .await
            .contains_key(&ExecutionKey::new(node, execution_id))
    }

    async fn report_received(
        &self,
        execution_id: &str,
        node: &str,
        length: usize,
        kind: CallbackKind,
    ) {
        let key = ExecutionKey::new(node, execution_id);
        {
            let mut records = self.records.write().await;
            match records.get_mut(&key) {
                Some(record) => record.record_arrival(length, kind, Utc::now()),
                None => {
                    debug!(key = %key, kind = %kind, "arrival for evicted execution ignored");
                    return;
                }
            }
        }

        counter!(self.callbacks_metric.clone(), "kind" => kind.as_str()).increment(1);
        counter!(self.bytes_metric.clone(), "kind" => kind.as_str()).increment(length as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> InMemoryExecutionRegistry {
        InMemoryExecutionRegistry::new(&Metrics {
            prefix: "foo".to_string(),
            ..Metrics::default()
        })
    }

    #[test]
    fn test_metric_names_use_prefix() {
        let registry = registry();
        assert_eq!(registry.callbacks_metric, "foo_callbacks_received_total");
        assert_eq!(registry.bytes_metric, "foo_callback_bytes_received_total");

        let bare = InMemoryExecutionRegistry::new(&Metrics::default());
        assert_eq!(bare.callbacks_metric, CALLBACKS_RECEIVED_TOTAL);
    }

    #[tokio::test]
    async fn test_has_only_admitted_keys() {
        let registry = registry();
        assert!(registry.is_empty().await);

        registry.admit("node-1", "abc").await;

        assert!(registry.has("node-1", "abc").await);
        assert!(!registry.has("node-2", "abc").await);
        assert!(!registry.has("node-1", "xyz").await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_readmit_keeps_record() {
        let registry = registry();
        registry.admit("node-1", "abc").await;
        registry
            .report_received("abc", "node-1", 7, CallbackKind::File)
            .await;
        registry.admit("node-1", "abc").await;

        let record = registry.get("node-1", "abc").await.unwrap();
        assert_eq!(record.bytes_received, 7);
    }

    #[tokio::test]
    async fn test_report_received_accumulates() {
        let registry = registry();
        registry.admit("node-1", "abc").await;

        registry
            .report_received("abc", "node-1", 10, CallbackKind::Result)
            .await;
        registry
            .report_received("abc", "node-1", 32, CallbackKind::Event)
            .await;

        let record = registry.get("node-1", "abc").await.unwrap();
        assert_eq!(record.callbacks_received, 2);
        assert_eq!(record.bytes_received, 42);
        assert_eq!(record.last_kind, Some(CallbackKind::Event));
        assert!(record.last_seen.is_some());
    }

    #[tokio::test]
    async fn test_report_for_unknown_key_is_ignored() {
        let registry = registry();
        registry
            .report_received("abc", "node-1", 10, CallbackKind::Result)
            .await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict() {
        let registry = registry();
        registry.admit("node-1", "abc").await;
        registry.admit("node-2", "abc").await;
        registry.admit("node-1", "xyz").await;

        assert!(registry.evict("node-1", "abc").await.is_some());
        assert!(registry.evict("node-1", "abc").await.is_none());
        assert!(!registry.has("node-1", "abc").await);

        assert_eq!(registry.evict_execution("abc").await, 1);
        assert!(!registry.has("node-2", "abc").await);
        assert!(registry.has("node-1", "xyz").await);
    }

    #[tokio::test]
    async fn test_concurrent_report_received_keeps_exact_totals() {
        let registry = registry();
        registry.admit("node-1", "abc").await;

        let mut handles = Vec::new();
        for i in 0..50 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                assert!(registry.has("node-1", "abc").await);
                registry
                    .report_received("abc", "node-1", i, CallbackKind::File)
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = registry.get("node-1", "abc").await.unwrap();
        assert_eq!(record.callbacks_received, 50);
        assert_eq!(record.bytes_received, (0..50).sum::<usize>() as u64);
    }
}
