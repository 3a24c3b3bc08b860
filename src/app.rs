use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use batch_job_api::{AppState, Server};
use batch_job_config::{AppConfig, Config, ConfigMapLoader, Metrics};
use batch_job_domain::{EventRecorder, ExecutionRegistry, ObjectReader};
use batch_job_infrastructure::{
    FileSystemReportSink, InMemoryExecutionRegistry, KubeEventRecorder, KubeObjectReader,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

use crate::shutdown::ShutdownManager;

/// 开启时注册表初始为空，直到派发方调用 `admit` 之前所有回调都被拒绝
fn build_registry(enabled: bool, metrics: &Metrics) -> Option<InMemoryExecutionRegistry> {
    if enabled {
        warn!(
            "execution registry enabled, callbacks are rejected until a dispatcher admits them \
             through Application::registry()"
        );
        Some(InMemoryExecutionRegistry::new(metrics))
    } else {
        warn!("execution registry disabled, every callback is admitted");
        None
    }
}

/// 控制器进程：装配配置、集群能力与两个 HTTP 监听器
pub struct Application {
    config: AppConfig,
    controller: Arc<Config>,
    registry: Option<InMemoryExecutionRegistry>,
    reader: Arc<dyn ObjectReader>,
    recorder: Arc<dyn EventRecorder>,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let namespace = config.kubernetes.resolve_namespace()?;
        let config_map_name = config.kubernetes.resolve_config_map_name()?;
        let hostname = config.kubernetes.resolve_hostname();

        let client = kube::Client::try_default()
            .await
            .context("failed to create kubernetes client")?;
        let reader: Arc<dyn ObjectReader> = Arc::new(KubeObjectReader::new(client.clone()));

        let controller = ConfigMapLoader::new(
            Arc::clone(&reader),
            namespace.as_str(),
            config_map_name.as_str(),
            hostname.as_str(),
        )
        .load()
        .await
        .with_context(|| format!("failed to load controller config from {config_map_name}"))?;

        let recorder: Arc<dyn EventRecorder> = Arc::new(KubeEventRecorder::new(
            client,
            controller.name.clone(),
            Some(hostname),
        ));

        let registry = build_registry(config.registry.enabled, &controller.metrics);

        Ok(Self {
            config,
            controller: Arc::new(controller),
            registry,
            reader,
            recorder,
        })
    }

    /// 回调端口：显式配置优先，其次是控制器配置中的 `callbackServicePort`
    fn internal_port(&self) -> Result<u16> {
        match self.config.server.internal_port {
            Some(port) => Ok(port),
            None if self.controller.callback_service_port != 0 => {
                Ok(self.controller.callback_service_port)
            }
            None => Err(anyhow::anyhow!(
                "callback port not configured: set server.internal_port or callbackServicePort"
            )),
        }
    }

    /// 注册表句柄，由作业派发方在创建 job pod 时调用 `admit`
    ///
    /// 本进程自身从不登记执行，开启注册表时必须由嵌入方调用。
    pub fn registry(&self) -> Option<InMemoryExecutionRegistry> {
        self.registry.clone()
    }

    fn state(&self) -> AppState {
        let registry = self
            .registry
            .clone()
            .map(|r| Arc::new(r) as Arc<dyn ExecutionRegistry>);
        AppState::new(
            Arc::clone(&self.controller),
            registry,
            Arc::new(FileSystemReportSink::new(&self.controller.report_directory)),
            Arc::clone(&self.reader),
            Arc::clone(&self.recorder),
        )
    }

    fn install_metrics_exporter(&self) -> Result<()> {
        if !self.config.server.metrics_enabled {
            return Ok(());
        }
        let addr: SocketAddr = self
            .config
            .server
            .metrics_address
            .parse()
            .with_context(|| format!("invalid metrics address: {}", self.config.server.metrics_address))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install prometheus exporter")?;
        info!(address = %addr, "metrics exporter listening");
        Ok(())
    }

    pub async fn run(&self, shutdown: ShutdownManager) -> Result<()> {
        self.install_metrics_exporter()?;

        let public = Server::static_file_server(
            self.config.server.public_port,
            &self.controller.report_directory,
        );
        let internal = Server::callback_server(self.internal_port()?, self.state());

        info!(
            name = %self.controller.name,
            namespace = %self.controller.namespace,
            public_port = public.port,
            internal_port = internal.port,
            report_directory = %self.controller.report_directory,
            "starting servers"
        );

        let public_signal = shutdown.signal().await;
        let internal_signal = shutdown.signal().await;
        tokio::try_join!(
            async { public.run(public_signal).await.context("public server failed") },
            async {
                internal
                    .run(internal_signal)
                    .await
                    .context("callback server failed")
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_registry_is_absent() {
        assert!(build_registry(false, &Metrics::default()).is_none());
    }

    #[tokio::test]
    async fn test_enabled_registry_rejects_until_admitted() {
        let registry = build_registry(true, &Metrics::default()).unwrap();
        assert!(registry.is_empty().await);
        assert!(!registry.has("node-1", "abc").await);

        registry.admit("node-1", "abc").await;

        assert!(registry.has("node-1", "abc").await);
    }
}
