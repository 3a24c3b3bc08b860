use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use batch_job_config::Config;
use batch_job_domain::{
    registry_or_always_admit, EventRecorder, ExecutionRegistry, ObjectReader, ReportSink,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::handlers::{event::post_event, file::post_file, health::health_check, report::post_report};
use crate::middleware::{admission, request_logging, trace_layer};

pub const CALLBACK_BASE_PATH: &str = "/report/{node}/{execution_id}";
pub const CALLBACK_RESULT_SUB_PATH: &str = "/result";
pub const CALLBACK_FILE_SUB_PATH: &str = "/file";
pub const CALLBACK_EVENT_SUB_PATH: &str = "/event";
pub const HEALTH_PATH: &str = "/health";

/// 单个回调请求体的上限
pub const MAX_CALLBACK_BODY_BYTES: usize = 64 * 1024 * 1024;

/// 回调路径参数
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub node: String,
    pub execution_id: String,
}

/// 回调服务状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<dyn ExecutionRegistry>,
    pub sink: Arc<dyn ReportSink>,
    pub reader: Arc<dyn ObjectReader>,
    pub recorder: Arc<dyn EventRecorder>,
}

impl AppState {
    /// 未提供注册表时全部放行
    pub fn new(
        config: Arc<Config>,
        registry: Option<Arc<dyn ExecutionRegistry>>,
        sink: Arc<dyn ReportSink>,
        reader: Arc<dyn ObjectReader>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        Self {
            config,
            registry: registry_or_always_admit(registry),
            sink,
            reader,
            recorder,
        }
    }
}

pub fn callback_path(sub_path: &str) -> String {
    format!("{CALLBACK_BASE_PATH}{sub_path}")
}

/// 创建回调路由；准入中间件只挂在回调路由上
pub fn create_routes(state: AppState) -> Router {
    let callbacks = Router::new()
        .route(&callback_path(CALLBACK_RESULT_SUB_PATH), post(post_report))
        .route(&callback_path(CALLBACK_FILE_SUB_PATH), post(post_file))
        .route(&callback_path(CALLBACK_EVENT_SUB_PATH), post(post_event))
        .route_layer(from_fn_with_state(state.clone(), admission))
        .layer(DefaultBodyLimit::max(MAX_CALLBACK_BODY_BYTES));

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .merge(callbacks)
        .layer(from_fn(request_logging))
        .layer(trace_layer())
        .with_state(state)
}
