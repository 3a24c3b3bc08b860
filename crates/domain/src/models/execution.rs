use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一次回调会话的唯一标识：(节点, 执行ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionKey {
    pub node: String,
    pub execution_id: String,
}

impl ExecutionKey {
    pub fn new<N: Into<String>, I: Into<String>>(node: N, execution_id: I) -> Self {
        Self {
            node: node.into(),
            execution_id: execution_id.into(),
        }
    }
}

impl fmt::Display for ExecutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.node, self.execution_id)
    }
}

/// 回调类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackKind {
    Result,
    File,
    Event,
}

impl CallbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackKind::Result => "result",
            CallbackKind::File => "file",
            CallbackKind::Event => "event",
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已准入执行的到达记录
///
/// 只允许注册表修改；处理器通过 `report_received` 间接更新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub admitted_at: DateTime<Utc>,
    pub callbacks_received: u64,
    pub bytes_received: u64,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_kind: Option<CallbackKind>,
}

impl ExecutionRecord {
    pub fn new(admitted_at: DateTime<Utc>) -> Self {
        Self {
            admitted_at,
            callbacks_received: 0,
            bytes_received: 0,
            last_seen: None,
            last_kind: None,
        }
    }

    pub fn record_arrival(&mut self, length: usize, kind: CallbackKind, at: DateTime<Utc>) {
        self.callbacks_received += 1;
        self.bytes_received += length as u64;
        self.last_seen = Some(at);
        self.last_kind = Some(kind);
    }
}

/// 节点名与执行ID会成为存储路径的一段，不能含分隔符，也不能是 `.` 或 `..`
pub fn is_valid_path_segment(value: &str) -> bool {
    !matches!(value, "" | "." | "..") && !value.contains(['/', '\\'])
}

/// 报告在存储中的相对路径：`{execution_id}/{file_name}`
pub fn report_file_path(execution_id: &str, file_name: &str) -> PathBuf {
    PathBuf::from(execution_id).join(file_name)
}
