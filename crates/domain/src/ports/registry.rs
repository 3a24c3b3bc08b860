use std::sync::Arc;

use async_trait::async_trait;

use crate::models::CallbackKind;

/// 回调准入注册表
///
/// 实现必须能承受任意数量的并发请求同时调用。
#[async_trait]
pub trait ExecutionRegistry: Send + Sync {
    /// (node, execution_id) 当前是否允许回调
    async fn has(&self, node: &str, execution_id: &str) -> bool;

    /// 记录一次已准入回调的到达；同一会话会被调用多次
    async fn report_received(
        &self,
        execution_id: &str,
        node: &str,
        length: usize,
        kind: CallbackKind,
    );
}

/// 未启用注册表时使用：全部放行，不做记录
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAdmit;

#[async_trait]
impl ExecutionRegistry for AlwaysAdmit {
    async fn has(&self, _node: &str, _execution_id: &str) -> bool {
        true
    }

    async fn report_received(
        &self,
        _execution_id: &str,
        _node: &str,
        _length: usize,
        _kind: CallbackKind,
    ) {
    }
}

/// 把可选的注册表变成总是存在的准入实现
pub fn registry_or_always_admit(
    registry: Option<Arc<dyn ExecutionRegistry>>,
) -> Arc<dyn ExecutionRegistry> {
    registry.unwrap_or_else(|| Arc::new(AlwaysAdmit))
}
