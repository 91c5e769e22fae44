//! Execution facade: owns the runner channel and the live log queue for the
//! lifetime of one run.
//!
//! Lifecycle: `init` dials and builds the graph, `run` blocks until the graph
//! engine settles every vertex, `tail` hands the consumer end to the caller,
//! `deinit` closes queue then channel and never fails.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use flowline_dag::{Dag, LiveLog, LogTail};
use flowline_model::{Config, RunnerData, TaskSpec};

use crate::error::RunnerError;
use crate::invoker::TaskInvoker;
use crate::timeout::TimeoutPolicy;

/// Queue capacity used when the config leaves it unset.
pub const DEFAULT_LOG_CAPACITY: usize = 5000;

#[derive(Debug, Clone, Default)]
pub struct TaskerConfig {
    pub config: Config,
    pub data: RunnerData,
    pub policy: TimeoutPolicy,
    /// Forward the `"EOF"` sentinel line to the consumer before terminating
    /// a task's relay. Off by default: the sentinel is then a pure
    /// termination signal and never reaches log-consuming code.
    pub forward_eof: bool,
    /// Live log capacity; `0` means [`DEFAULT_LOG_CAPACITY`].
    pub capacity: usize,
}

pub struct Tasker {
    cfg: TaskerConfig,
    client: Option<
        flowline_api::proto::runner::runner_service_client::RunnerServiceClient<
            tonic::transport::Channel,
        >,
    >,
    dag: Option<Dag>,
    log: Option<LiveLog>,
    tail: Option<LogTail>,
}

impl Tasker {
    pub fn new(cfg: TaskerConfig) -> Self {
        Self {
            cfg,
            client: None,
            dag: None,
            log: None,
            tail: None,
        }
    }

    /// Dial the remote runner, project the task list into the execution
    /// graph, and open the live log queue.
    pub async fn init(&mut self) -> Result<(), RunnerError> {
        let server = &self.cfg.config.spec.runner;
        if server.host.is_empty() {
            return Err(RunnerError::Config("runner host is empty".into()));
        }

        let endpoint = format!("{}:{}", server.host, server.port);
        let channel = flowline_api::connect(&server.host, server.port)
            .await
            .map_err(|source| RunnerError::Dial { endpoint, source })?;
        self.client = Some(flowline_api::runner_client(channel));

        let tasks: Vec<flowline_dag::Task> =
            self.cfg.data.spec.tasks.iter().map(to_task).collect();
        let dag = Dag::init(&tasks);
        debug!(
            vertices = dag.vertices().len(),
            edges = dag.edges().len(),
            "graph built"
        );
        self.dag = Some(dag);

        let capacity = if self.cfg.capacity == 0 {
            DEFAULT_LOG_CAPACITY
        } else {
            self.cfg.capacity
        };
        let (log, tail) = flowline_dag::channel(capacity);
        self.log = Some(log);
        self.tail = Some(tail);

        info!(tasks = self.cfg.data.spec.tasks.len(), "runner initialized");
        Ok(())
    }

    /// Hand the graph, the invocation adapter, and the queue to the engine;
    /// blocks until overall completion or failure.
    pub async fn run(&mut self, token: CancellationToken) -> Result<(), RunnerError> {
        let client = self.client.clone().ok_or(RunnerError::NotInitialized)?;
        let dag = self.dag.as_ref().ok_or(RunnerError::NotInitialized)?;
        let log = self.log.clone().ok_or(RunnerError::NotInitialized)?;

        let invoker = Arc::new(TaskInvoker::new(
            client,
            self.cfg.data.api_version.clone(),
            self.cfg.data.kind.clone(),
            self.cfg.data.metadata.name.clone(),
            self.cfg.policy,
            self.cfg.forward_eof,
        ));

        dag.run(invoker, log, token).await.map_err(Into::into)
    }

    /// Consumer end of the live log; available once per run, before or
    /// during `run`.
    pub fn tail(&mut self) -> Option<LogTail> {
        self.tail.take()
    }

    /// The configured task list, e.g. to size completion expectations.
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.cfg.data.spec.tasks
    }

    /// Best-effort teardown: close the queue (all producers have stopped
    /// once `run` returned), withdraw an unclaimed tail, then release the
    /// channel. Never fails.
    pub fn deinit(&mut self) {
        self.log = None;
        self.tail = None;
        self.dag = None;
        self.client = None;
    }
}

fn to_task(spec: &TaskSpec) -> flowline_dag::Task {
    flowline_dag::Task {
        name: spec.name.clone(),
        file: flowline_dag::File {
            content: spec.file.content.clone().into_bytes(),
            gzip: spec.file.gzip,
        },
        params: spec
            .params
            .iter()
            .map(|p| flowline_dag::Param {
                name: p.name.clone(),
                value: p.value.clone(),
            })
            .collect(),
        commands: spec.commands.clone(),
        width: spec.log.width,
        timeout: flowline_dag::Timeout {
            amount: spec.timeout.amount,
            unit: spec.timeout.unit.clone(),
        },
        depends: spec.depends.clone(),
    }
}
