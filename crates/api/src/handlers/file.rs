use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
};
use batch_job_domain::{report_file_path, CallbackKind};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::routes::{AppState, CallbackParams};

#[derive(Debug, Default, Deserialize)]
pub struct FileQuery {
    pub name: Option<String>,
}

/// 接收任意文件，存为 `{node}-{name}`
///
/// 调用方给的文件名只取最后一个路径分量，见 [`stored_file_name`]。
pub async fn post_file(
    State(state): State<AppState>,
    Path(params): Path<CallbackParams>,
    Query(query): Query<FileQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let CallbackParams { node, execution_id } = params;
    let length = body.len();

    state
        .registry
        .report_received(&execution_id, &node, length, CallbackKind::File)
        .await;

    let name = stored_file_name(&node, query.name.as_deref(), &headers);
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
        "received file"
    );
    Ok(StatusCode::OK)
}

/// 文件名优先级：query `name`，其次 `Content-Disposition` 的 filename，最后按 Content-Type 生成
///
/// 调用方给出的名字不会原样使用：只保留最后一个路径分量（`/` 与 `\` 都算分隔符），
/// 剩下 `.`、`..` 或空串时改用生成的名字。
pub fn stored_file_name(node: &str, query_name: Option<&str>, headers: &HeaderMap) -> String {
    let chosen = query_name
        .and_then(base_name)
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(disposition_file_name)
                .and_then(base_name)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            format!("{}{}", uuid::Uuid::new_v4(), extension_for(content_type))
        });
    format!("{node}-{chosen}")
}

/// `attachment; filename="report.txt"` 中的 filename
pub fn disposition_file_name(value: &str) -> Option<&str> {
    value.split(';').map(str::trim).find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        (!name.is_empty()).then_some(name)
    })
}

pub fn extension_for(content_type: Option<&str>) -> &'static str {
    let content_type = content_type.unwrap_or_default().trim().to_ascii_lowercase();
    if content_type.starts_with("application/json") {
        ".json"
    } else if content_type.starts_with("text/plain") {
        ".txt"
    } else {
        ".file"
    }
}

// 调用方给的名字只保留最后一段
fn base_name(name: &str) -> Option<&str> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name).trim();
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}
