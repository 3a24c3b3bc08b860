use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use crate::middleware::trace_layer;
use crate::routes::{
    callback_path, create_routes, AppState, CALLBACK_EVENT_SUB_PATH, CALLBACK_FILE_SUB_PATH,
    CALLBACK_RESULT_SUB_PATH,
};

/// 监听器类别，只用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    /// 对外的静态报告文件服务
    Public,
    /// 集群内的回调服务
    Internal,
}

impl ServerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Public => "public",
            ServerKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 按端口、路由和类别参数化的 HTTP 监听器
pub struct Server {
    pub port: u16,
    pub kind: ServerKind,
    router: Router,
}

impl Server {
    /// 直接提供报告目录下的文件，不做准入
    pub fn static_file_server<P: AsRef<Path>>(port: u16, report_directory: P) -> Self {
        let router = Router::new()
            .fallback_service(ServeDir::new(report_directory.as_ref()))
            .layer(trace_layer());
        Self {
            port,
            kind: ServerKind::Public,
            router,
        }
    }

    pub fn callback_server(port: u16, state: AppState) -> Self {
        info!(
            port,
            result = %callback_path(CALLBACK_RESULT_SUB_PATH),
            file = %callback_path(CALLBACK_FILE_SUB_PATH),
            event = %callback_path(CALLBACK_EVENT_SUB_PATH),
            "callback routes registered"
        );
        Self {
            port,
            kind: ServerKind::Internal,
            router: create_routes(state),
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            kind = %self.kind,
            address = %listener.local_addr()?,
            "server listening"
        );
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!(kind = %self.kind, "server stopped");
        Ok(())
    }
}
