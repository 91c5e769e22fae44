use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to dial scheduler at {endpoint}")]
    Dial {
        endpoint: String,
        #[source]
        source: flowline_api::ApiError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("scheduler is not initialized")]
    NotInitialized,

    #[error("schedule call failed: {0}")]
    Status(#[source] Box<tonic::Status>),

    #[error("schedule call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<tonic::Status> for SchedulerError {
    fn from(status: tonic::Status) -> Self {
        SchedulerError::Status(Box::new(status))
    }
}
