use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use batch_job_domain::{report_file_path, CallbackKind};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::routes::{AppState, CallbackParams};

/// 结果报告的存储文件名
pub fn report_file_name(node: &str) -> String {
    format!("{node}.json")
}

/// 接收 JSON 结果报告，原样落盘
pub async fn post_report(
    State(state): State<AppState>,
    Path(params): Path<CallbackParams>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let CallbackParams { node, execution_id } = params;
    let length = body.len();

    state
        .registry
        .report_received(&execution_id, &node, length, CallbackKind::Result)
        .await;

    serde_json::from_slice::<serde_json::Value>(&body).map_err(ApiError::DecodeReport)?;

    let name = report_file_name(&node);
    let path = state
        .sink
        .write(&report_file_path(&execution_id, &name), &body)
        .await
        .map_err(ApiError::Storage)?;

    info!(
        node = %node,
        id = %execution_id,
        length,
        name = %name,
        path = %path.display(),
        "received report"
    );
    Ok(StatusCode::OK)
}
