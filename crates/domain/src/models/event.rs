use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

pub const FIRST_CHAR_MUST_BE_UPPERCASE: &str = "first_char_must_be_uppercase";

/// Kubernetes 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Normal,
    Warning,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Normal => "Normal",
            EventType::Warning => "Warning",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// worker pod 通过 `/event` 回调提交的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub warning: bool,
    pub reason: String,
    pub message: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        if self.warning {
            EventType::Warning
        } else {
            EventType::Normal
        }
    }

    /// 有参数时走格式化发送路径
    pub fn is_formatted(&self) -> bool {
        !self.args.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_reason(&self.reason)
    }
}

/// Kubernetes 事件 reason 约定：首字母必须大写
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    match reason.chars().next() {
        Some(c) if c.is_uppercase() => Ok(()),
        _ => Err(ValidationError::new(FIRST_CHAR_MUST_BE_UPPERCASE).with_message(
            Cow::Owned(format!(
                "Key: 'Event.Reason' Error:Field validation for 'Reason' failed on the '{FIRST_CHAR_MUST_BE_UPPERCASE}' tag"
            )),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_event() {
        let event: EventPayload =
            serde_json::from_str(r#"{ "reason": "Started", "message": "go" }"#).unwrap();
        assert!(!event.warning);
        assert!(event.args.is_empty());
        assert_eq!(event.event_type(), EventType::Normal);
        assert!(!event.is_formatted());
    }

    #[test]
    fn test_decode_event_with_args() {
        let event: EventPayload = serde_json::from_str(
            r#"{ "warning": true, "reason": "TestReason", "message": "test message: %s" ,"args" : ["a1"]}"#,
        )
        .unwrap();
        assert_eq!(event.event_type(), EventType::Warning);
        assert!(event.is_formatted());
        assert_eq!(event.args, vec!["a1".to_string()]);
    }

    #[test]
    fn test_reason_validation() {
        assert!(validate_reason("TestReason").is_ok());
        assert!(validate_reason("Ä").is_ok());

        let err = validate_reason("testReason").unwrap_err();
        assert_eq!(err.code, FIRST_CHAR_MUST_BE_UPPERCASE);
        let message = err.message.unwrap();
        assert!(message.contains("'Reason' failed on the 'first_char_must_be_uppercase' tag"));

        assert!(validate_reason("").is_err());
        assert!(validate_reason("1Reason").is_err());
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(EventType::Warning.to_string(), "Warning");
        assert_eq!(EventType::Normal.as_str(), "Normal");
    }
}
