//! Per-vertex invocation adapter: one bidirectional stream to the remote
//! runner per vertex, exactly one request message, then receive-only relay of
//! output lines into the shared live log until the sentinel or an error.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::task::AbortOnDropHandle;
use tonic::{Streaming, transport::Channel};
use tracing::debug;

use flowline_api::proto::runner as pb;
use flowline_api::proto::runner::runner_service_client::RunnerServiceClient;
use flowline_dag::{EOF_SENTINEL, Invoker, Line, LiveLog, Vertex};

use crate::encode::encode;
use crate::error::RunnerError;
use crate::timeout::TimeoutPolicy;

/// The graph engine's per-vertex callback. One instance serves the whole
/// run; the underlying channel is shared and the client clone per invocation
/// is cheap.
pub struct TaskInvoker {
    client: RunnerServiceClient<Channel>,
    api_version: String,
    kind: String,
    metadata_name: String,
    policy: TimeoutPolicy,
    forward_eof: bool,
}

impl TaskInvoker {
    pub fn new(
        client: RunnerServiceClient<Channel>,
        api_version: String,
        kind: String,
        metadata_name: String,
        policy: TimeoutPolicy,
        forward_eof: bool,
    ) -> Self {
        Self {
            client,
            api_version,
            kind,
            metadata_name,
            policy,
            forward_eof,
        }
    }

    async fn send_task(
        &self,
        vertex: &Vertex,
        log: LiveLog,
        deadline: Duration,
    ) -> Result<(), RunnerError> {
        let request = self.build_request(vertex);
        let mut client = self.client.clone();
        let deadline_at = tokio::time::Instant::now() + deadline;

        debug!(task = %vertex.name, ?deadline, "opening task stream");

        let response = match tokio::time::timeout_at(
            deadline_at,
            client.send_task(tokio_stream::once(request)),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(status)) => return Err(status.into()),
            Err(_) => return Err(RunnerError::TimeoutExceeded(deadline)),
        };

        // The relay is its own scheduled unit; its handle is the one-shot
        // completion signal this invocation waits on. The relay holds a queue
        // producer handle, so it must never outlive this invocation: dropping
        // the handle aborts it, whether the deadline fired or this future was
        // cancelled mid-await.
        let mut relay = AbortOnDropHandle::new(tokio::spawn(relay_output(
            response.into_inner(),
            vertex.name.clone(),
            log,
            self.forward_eof,
        )));

        match tokio::time::timeout_at(deadline_at, &mut relay).await {
            Ok(joined) => joined?,
            Err(_) => Err(RunnerError::TimeoutExceeded(deadline)),
        }
    }

    fn build_request(&self, vertex: &Vertex) -> pb::TaskRequest {
        let (content, gzip) = encode(&vertex.file.content, vertex.file.gzip);

        pb::TaskRequest {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            metadata: Some(pb::TaskMetadata {
                name: self.metadata_name.clone(),
            }),
            spec: Some(pb::TaskSpec {
                task: Some(pb::Task {
                    name: vertex.name.clone(),
                    file: Some(pb::TaskFile { content, gzip }),
                    params: vertex
                        .params
                        .iter()
                        .map(|p| pb::TaskParam {
                            name: p.name.clone(),
                            value: p.value.clone(),
                        })
                        .collect(),
                    commands: vertex.commands.clone(),
                    log: Some(pb::TaskLog {
                        width: vertex.width,
                    }),
                }),
            }),
        }
    }
}

#[async_trait]
impl Invoker for TaskInvoker {
    async fn invoke(&self, vertex: &Vertex, log: LiveLog) -> anyhow::Result<()> {
        let deadline = self.policy.resolve(&vertex.timeout);
        self.send_task(vertex, log, deadline).await?;
        Ok(())
    }
}

/// Relay replies into the live log until the sentinel, a clean stream end,
/// or a transport error.
async fn relay_output(
    mut stream: Streaming<pb::TaskReply>,
    task: String,
    log: LiveLog,
    forward_eof: bool,
) -> Result<(), RunnerError> {
    loop {
        match stream.message().await {
            Ok(Some(reply)) => {
                let output = reply.output.unwrap_or_default();
                let eof = output.message == EOF_SENTINEL;

                if !eof || forward_eof {
                    log.push(Line {
                        pos: output.pos,
                        time: output.time,
                        message: output.message,
                    })
                    .await?;
                }
                if eof {
                    debug!(task = %task, "stream finished");
                    return Ok(());
                }
            }
            // The remote closed without a sentinel: treated as completion.
            Ok(None) => return Ok(()),
            Err(status) => return Err(status.into()),
        }
    }
}
