use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use batch_job_domain::ReportSink;
use batch_job_errors::{ControllerError, ControllerResult};
use tokio::fs;
use tracing::debug;

/// 以报告目录为根的文件系统存储
///
/// 每次写入先落到同目录下的临时文件，再 rename 到目标名，
/// 读取方（静态文件服务）不会看到写了一半的文件。
#[derive(Debug, Clone)]
pub struct FileSystemReportSink {
    root: PathBuf,
}

impl FileSystemReportSink {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &Path) -> ControllerResult<PathBuf> {
        if relative_path.as_os_str().is_empty() {
            return Err(ControllerError::storage_error("empty report path"));
        }
        for component in relative_path.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(ControllerError::storage_error(format!(
                        "report path must stay inside the report directory: {}",
                        relative_path.display()
                    )))
                }
            }
        }
        Ok(self.root.join(relative_path))
    }
}

#[async_trait]
impl ReportSink for FileSystemReportSink {
    async fn write(&self, relative_path: &Path, bytes: &[u8]) -> ControllerResult<PathBuf> {
        let target = self.resolve(relative_path)?;
        let parent = target
            .parent()
            .ok_or_else(|| ControllerError::storage_error("report path has no parent"))?;
        let file_name = target
            .file_name()
            .ok_or_else(|| ControllerError::storage_error("report path has no file name"))?
            .to_string_lossy()
            .to_string();

        fs::create_dir_all(parent).await?;

        let temp = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));
        if let Err(e) = fs::write(&temp, bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(path = %target.display(), bytes = bytes.len(), "report written");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_job_testing_utils::list_files;

    #[tokio::test]
    async fn test_write_creates_execution_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSystemReportSink::new(dir.path());

        let path = sink
            .write(Path::new("abc/node-1.json"), br#"{"a":1}"#)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("abc").join("node-1.json"));
        assert_eq!(std::fs::read(&path).unwrap(), br#"{"a":1}"#);
        assert_eq!(list_files(&dir.path().join("abc")), vec!["node-1.json"]);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSystemReportSink::new(dir.path());

        sink.write(Path::new("abc/f.txt"), b"first").await.unwrap();
        let path = sink.write(Path::new("abc/f.txt"), b"second").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"second");
        assert_eq!(list_files(&dir.path().join("abc")), vec!["f.txt"]);
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSystemReportSink::new(dir.path());

        for path in ["../escape.txt", "/etc/passwd", "abc/../../x", ""] {
            let err = sink.write(Path::new(path), b"x").await.unwrap_err();
            assert!(matches!(err, ControllerError::Storage(_)), "{path}");
        }
    }
}
