use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use batch_job_domain::is_valid_path_segment;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::routes::{AppState, CallbackParams};

/// 回调准入：(node, execution_id) 不在注册表中时直接返回 406，不进入处理器
///
/// 路径参数在路由匹配后才做百分号解码，解码出分隔符或 `.`/`..` 的请求返回 400。
pub async fn admission(
    State(state): State<AppState>,
    Path(params): Path<CallbackParams>,
    request: Request,
    next: Next,
) -> Response {
    for (field, value) in [("node", &params.node), ("execution_id", &params.execution_id)] {
        if !is_valid_path_segment(value) {
            return ApiError::InvalidPath {
                field,
                value: value.clone(),
            }
            .into_response();
        }
    }
    if !state.registry.has(&params.node, &params.execution_id).await {
        return ApiError::NotAcceptable {
            node: params.node,
            execution_id: params.execution_id,
        }
        .into_response();
    }
    debug!(node = %params.node, id = %params.execution_id, "callback admitted");
    next.run(request).await
}

pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration = ?start.elapsed(),
        "request handled"
    );

    response
}

pub fn trace_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
}
