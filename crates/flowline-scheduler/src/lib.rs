//! Scheduler client facade: asks the remote scheduler where the pipeline's
//! task should run and returns the decision unchanged. Placement logic lives
//! entirely on the remote side.

mod error;
pub use error::SchedulerError;

use std::time::Duration;

use tonic::transport::Channel;
use tracing::{debug, info};

use flowline_api::proto::scheduler as pb;
use flowline_api::proto::scheduler::scheduler_service_client::SchedulerServiceClient;
use flowline_model::{Config, NodeSpec, ResourceSpec, SchedulerData};

/// The remote scheduler's answer: the chosen node name, or an error string
/// when no node fits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDecision {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    pub config: Config,
    pub data: SchedulerData,
}

pub struct Scheduler {
    cfg: SchedulerConfig,
    client: Option<SchedulerServiceClient<Channel>>,
}

impl Scheduler {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self { cfg, client: None }
    }

    /// Dial the remote scheduler, failing fast when unreachable.
    pub async fn init(&mut self) -> Result<(), SchedulerError> {
        let server = &self.cfg.config.spec.scheduler;
        if server.host.is_empty() {
            return Err(SchedulerError::Config("scheduler host is empty".into()));
        }

        let endpoint = format!("{}:{}", server.host, server.port);
        let channel = flowline_api::connect(&server.host, server.port)
            .await
            .map_err(|source| SchedulerError::Dial { endpoint, source })?;
        self.client = Some(flowline_api::scheduler_client(channel));

        info!(host = %server.host, port = server.port, "scheduler initialized");
        Ok(())
    }

    /// One unary `Schedule` call under the config-driven deadline.
    pub async fn run(&mut self) -> Result<ScheduleDecision, SchedulerError> {
        let client = self.client.as_mut().ok_or(SchedulerError::NotInitialized)?;
        let deadline = Duration::from_secs(self.cfg.config.spec.scheduler.timeout);
        let request = build_request(&self.cfg.data);

        debug!(task = %self.cfg.data.spec.task.name, ?deadline, "requesting placement");

        let reply = match tokio::time::timeout(deadline, client.schedule(request)).await {
            Ok(Ok(response)) => response.into_inner(),
            Ok(Err(status)) => return Err(status.into()),
            Err(_) => return Err(SchedulerError::Timeout(deadline)),
        };

        Ok(ScheduleDecision {
            name: reply.name,
            error: reply.error,
        })
    }

    /// Best-effort teardown; never fails.
    pub fn deinit(&mut self) {
        self.client = None;
    }
}

fn build_request(data: &SchedulerData) -> pb::ScheduleRequest {
    let task = &data.spec.task;

    pb::ScheduleRequest {
        api_version: data.api_version.clone(),
        kind: data.kind.clone(),
        metadata: Some(pb::ScheduleMetadata {
            name: data.metadata.name.clone(),
        }),
        spec: Some(pb::ScheduleSpec {
            task: Some(pb::SchedTask {
                name: task.name.clone(),
                node_name: task.node_name.clone(),
                node_selector: task.node_selector.clone(),
                requested_resource: Some(to_resource(&task.requested_resource)),
                tolerates_unschedulable: task.tolerates_unschedulable,
            }),
            nodes: data.spec.nodes.iter().map(to_node).collect(),
        }),
    }
}

fn to_node(node: &NodeSpec) -> pb::Node {
    pb::Node {
        name: node.name.clone(),
        host: node.host.clone(),
        label: node.label.clone(),
        allocatable_resource: Some(to_resource(&node.allocatable_resource)),
        requested_resource: Some(to_resource(&node.requested_resource)),
        unschedulable: node.unschedulable,
    }
}

fn to_resource(resource: &ResourceSpec) -> pb::Resource {
    pb::Resource {
        milli_cpu: resource.milli_cpu,
        memory: resource.memory,
        storage: resource.storage,
    }
}
