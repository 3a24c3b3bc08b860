use async_trait::async_trait;
use batch_job_errors::ControllerResult;

use crate::models::{EventType, KubeObject, ObjectKind};
use crate::services::format_message;

/// 只读的集群对象读取能力
#[async_trait]
pub trait ObjectReader: Send + Sync {
    async fn get(
        &self,
        kind: &ObjectKind,
        namespace: &str,
        name: &str,
    ) -> ControllerResult<KubeObject>;
}

/// Kubernetes 事件记录能力
///
/// 发送即返回，失败由实现自行记录日志。
#[async_trait]
pub trait EventRecorder: Send + Sync {
    async fn event(&self, object: &KubeObject, event_type: EventType, reason: &str, message: &str);

    async fn eventf(
        &self,
        object: &KubeObject,
        event_type: EventType,
        reason: &str,
        message_fmt: &str,
        args: &[String],
    ) {
        let message = format_message(message_fmt, args);
        self.event(object, event_type, reason, &message).await
    }
}
