use std::time::Duration;

use thiserror::Error;

use flowline_dag::DagError;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to dial runner at {endpoint}")]
    Dial {
        endpoint: String,
        #[source]
        source: flowline_api::ApiError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("runner is not initialized")]
    NotInitialized,

    #[error("stream failed: {0}")]
    Stream(#[source] Box<tonic::Status>),

    #[error("task timed out after {0:?}")]
    TimeoutExceeded(Duration),

    #[error("relay aborted: {0}")]
    Relay(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Dag(#[from] DagError),
}

impl From<tonic::Status> for RunnerError {
    fn from(status: tonic::Status) -> Self {
        RunnerError::Stream(Box::new(status))
    }
}
