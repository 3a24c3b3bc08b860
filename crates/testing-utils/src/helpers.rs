//! Test helper utilities for report directories

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary report directory with the execution sub directory already created
pub struct TestReportDir {
    dir: TempDir,
}

impl TestReportDir {
    pub fn new(execution_id: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("batch-job-test-")
            .tempdir()
            .expect("create temp report dir");
        std::fs::create_dir_all(dir.path().join(execution_id)).expect("create execution dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn execution_dir(&self, execution_id: &str) -> PathBuf {
        self.dir.path().join(execution_id)
    }

    /// Sorted file names directly beneath the execution directory
    pub fn files(&self, execution_id: &str) -> Vec<String> {
        list_files(&self.execution_dir(execution_id))
    }

    pub fn read(&self, execution_id: &str, file_name: &str) -> Vec<u8> {
        std::fs::read(self.execution_dir(execution_id).join(file_name)).expect("read report file")
    }
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
