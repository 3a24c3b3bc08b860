//! # Batch Job Controller API
//!
//! job pod 回调服务：worker pod 把结果报告、任意文件和 Kubernetes 事件
//! 通过 HTTP 提交给控制器。
//!
//! ## 架构设计
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Callback Server                      │
//! ├──────────────────────────────────────────────────────┤
//! │  Routes  │  Admission  │  Handlers  │  Error         │
//! │ (路由定义) │ (准入中间件) │ (处理器)    │ (错误处理)       │
//! └──────────────────────────────────────────────────────┘
//!            ↓                  ↓                 ↓
//!   ExecutionRegistry      ReportSink      ObjectReader / EventRecorder
//! ```
//!
//! ## API 端点
//!
//! - `POST /report/{node}/{execution_id}/result` - JSON 结果报告
//! - `POST /report/{node}/{execution_id}/file` - 任意文件
//! - `POST /report/{node}/{execution_id}/event` - Kubernetes 事件
//! - `GET /health` - 健康检查
//!
//! 三个回调路由都先经过准入中间件：(node, execution_id) 不在注册表中时返回 406。
//! 没有注册表时全部放行。
//!
//! ## 错误响应
//!
//! 错误响应体是纯文本，以固定前缀开头：
//!
//! | 状态码 | 前缀 |
//! |--------|------|
//! | 400 | `error decoding report` / `error decoding event` / 校验信息 |
//! | 404 | `error finding pod` |
//! | 406 | `execution not admitted` |
//! | 500 | `error storing report` |

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use routes::{create_routes, AppState, CallbackParams};
pub use server::{Server, ServerKind};
