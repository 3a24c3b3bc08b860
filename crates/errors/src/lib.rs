use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("error getting {kind} {name}: {message}")]
    UpstreamLookup {
        kind: String,
        name: String,
        message: String,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("kubernetes error: {0}")]
    Kubernetes(String),
}

pub type ControllerResult<T> = Result<T, ControllerError>;

impl ControllerError {
    pub fn upstream_lookup<K: Into<String>, N: Into<String>, M: ToString>(
        kind: K,
        name: N,
        message: M,
    ) -> Self {
        Self::UpstreamLookup {
            kind: kind.into(),
            name: name.into(),
            message: message.to_string(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn storage_error<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<std::io::Error> for ControllerError {
    fn from(err: std::io::Error) -> Self {
        ControllerError::Storage(err.to_string())
    }
}
