use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use batch_job_errors::ControllerError;
use tracing::{error, warn};

/// 406 响应体的固定前缀
pub const NOT_ACCEPTABLE_PREFIX: &str = "execution not admitted";
pub const DECODE_REPORT_PREFIX: &str = "error decoding report";
pub const DECODE_EVENT_PREFIX: &str = "error decoding event";
pub const POD_NOT_FOUND_PREFIX: &str = "error finding pod";
pub const STORAGE_PREFIX: &str = "error storing report";
pub const INVALID_PATH_PREFIX: &str = "invalid callback path";

/// 回调接口的错误，响应体为纯文本，以固定前缀开头
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("execution not admitted: node {node} id {execution_id}")]
    NotAcceptable { node: String, execution_id: String },

    #[error("invalid callback path: {field} {value:?}")]
    InvalidPath { field: &'static str, value: String },

    #[error("error decoding report: {0}")]
    DecodeReport(#[source] serde_json::Error),

    #[error("error decoding event: {0}")]
    DecodeEvent(#[source] serde_json::Error),

    #[error("{}", validation_message(.0))]
    Validation(validator::ValidationError),

    #[error("error finding pod {pod}: {source}")]
    PodNotFound {
        pod: String,
        #[source]
        source: ControllerError,
    },

    #[error("error storing report: {0}")]
    Storage(#[source] ControllerError),
}

pub type ApiResult<T> = Result<T, ApiError>;

fn validation_message(err: &validator::ValidationError) -> String {
    match &err.message {
        Some(message) => message.to_string(),
        None => format!("validation failed on the '{}' tag", err.code),
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            ApiError::InvalidPath { .. }
            | ApiError::DecodeReport(_)
            | ApiError::DecodeEvent(_)
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PodNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_string();
        match &self {
            ApiError::NotAcceptable { .. } | ApiError::InvalidPath { .. } => {
                warn!(status = status.as_u16(), result = %body, "callback rejected")
            }
            _ => error!(status = status.as_u16(), result = %body, "callback failed"),
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_job_domain::validate_reason;

    #[test]
    fn test_status_codes() {
        let decode = serde_json::from_str::<serde_json::Value>("foo").unwrap_err();
        assert_eq!(
            ApiError::DecodeEvent(decode).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotAcceptable {
                node: "n".to_string(),
                execution_id: "id".to_string()
            }
            .status_code(),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(
            ApiError::Storage(ControllerError::storage_error("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_start_with_prefixes() {
        let decode = serde_json::from_str::<serde_json::Value>("foo").unwrap_err();
        assert!(ApiError::DecodeEvent(decode)
            .to_string()
            .starts_with(DECODE_EVENT_PREFIX));

        let not_found = ApiError::PodNotFound {
            pod: "p".to_string(),
            source: ControllerError::upstream_lookup("Pod", "p", "boom"),
        };
        assert!(not_found.to_string().starts_with(POD_NOT_FOUND_PREFIX));

        let denied = ApiError::NotAcceptable {
            node: "n".to_string(),
            execution_id: "id".to_string(),
        };
        assert!(denied.to_string().starts_with(NOT_ACCEPTABLE_PREFIX));

        let invalid = ApiError::InvalidPath {
            field: "node",
            value: "a/b".to_string(),
        };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "invalid callback path: node \"a/b\"");
        assert!(invalid.to_string().starts_with(INVALID_PATH_PREFIX));
    }

    #[test]
    fn test_validation_surfaces_rule() {
        let err = ApiError::Validation(validate_reason("testReason").unwrap_err());
        assert!(err
            .to_string()
            .contains("'Reason' failed on the 'first_char_must_be_uppercase' tag"));
    }
}
