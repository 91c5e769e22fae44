pub mod proto {
    pub mod runner {
        tonic::include_proto!("flowline.runner.v1");
    }

    pub mod scheduler {
        tonic::include_proto!("flowline.scheduler.v1");
    }
}

mod error;
pub use error::ApiError;

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::proto::runner::runner_service_client::RunnerServiceClient;
use crate::proto::scheduler::scheduler_service_client::SchedulerServiceClient;

/// Streamed task payloads are effectively unbounded; lift tonic's 4 MiB
/// default to the largest representable 32-bit size.
pub const MAX_MESSAGE_SIZE: usize = i32::MAX as usize;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Open a plaintext channel to `host:port`, failing fast when the peer is
/// unreachable.
pub async fn connect(host: &str, port: u16) -> Result<Channel, ApiError> {
    let uri = format!("http://{host}:{port}");
    debug!(%uri, "dialing");

    let channel = Endpoint::from_shared(uri)?
        .connect_timeout(CONNECT_TIMEOUT)
        .connect()
        .await?;

    Ok(channel)
}

/// Runner client over an established channel, with message limits raised.
pub fn runner_client(channel: Channel) -> RunnerServiceClient<Channel> {
    RunnerServiceClient::new(channel)
        .max_decoding_message_size(MAX_MESSAGE_SIZE)
        .max_encoding_message_size(MAX_MESSAGE_SIZE)
}

/// Scheduler client over an established channel, with message limits raised.
pub fn scheduler_client(channel: Channel) -> SchedulerServiceClient<Channel> {
    SchedulerServiceClient::new(channel)
        .max_decoding_message_size(MAX_MESSAGE_SIZE)
        .max_encoding_message_size(MAX_MESSAGE_SIZE)
}
