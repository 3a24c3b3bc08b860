use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use batch_job_domain::{CallbackKind, EventPayload, ObjectKind};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::routes::{AppState, CallbackParams};

/// 把 worker pod 提交的事件挂到对应的 job pod 上
pub async fn post_event(
    State(state): State<AppState>,
    Path(params): Path<CallbackParams>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let CallbackParams { node, execution_id } = params;
    let length = body.len();

    state
        .registry
        .report_received(&execution_id, &node, length, CallbackKind::Event)
        .await;

    let event: EventPayload = serde_json::from_slice(&body).map_err(ApiError::DecodeEvent)?;
    event.validate().map_err(ApiError::Validation)?;

    let pod_name = state.config.pod_name(&node, &execution_id);
    let pod = state
        .reader
        .get(&ObjectKind::pod(), &state.config.namespace, &pod_name)
        .await
        .map_err(|source| ApiError::PodNotFound {
            pod: pod_name.clone(),
            source,
        })?;

    if event.is_formatted() {
        state
            .recorder
            .eventf(&pod, event.event_type(), &event.reason, &event.message, &event.args)
            .await;
    } else {
        state
            .recorder
            .event(&pod, event.event_type(), &event.reason, &event.message)
            .await;
    }

    info!(
        node = %node,
        id = %execution_id,
        length,
        pod = %pod_name,
        reason = %event.reason,
        "event created"
    );
    Ok(StatusCode::OK)
}
