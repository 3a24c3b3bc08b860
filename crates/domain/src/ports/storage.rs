use std::path::{Path, PathBuf};

use async_trait::async_trait;
use batch_job_errors::ControllerResult;

/// 报告存储：按相对路径写入字节，返回最终落盘位置
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write(&self, relative_path: &Path, bytes: &[u8]) -> ControllerResult<PathBuf>;
}
