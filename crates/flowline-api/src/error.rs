use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to connect: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("call failed: {0}")]
    Status(#[source] Box<tonic::Status>),
}

impl From<tonic::Status> for ApiError {
    fn from(status: tonic::Status) -> Self {
        ApiError::Status(Box::new(status))
    }
}
