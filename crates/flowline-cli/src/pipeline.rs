//! Pipeline orchestration: scheduler decision first, then the task graph,
//! with a printer draining the live log concurrently with the run.

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use flowline_runner::{Tasker, TaskerConfig, TimeoutPolicy};
use flowline_scheduler::{Scheduler, SchedulerConfig};

use crate::cli::CliArgs;
use crate::load;

pub async fn run(args: CliArgs, token: CancellationToken) -> anyhow::Result<()> {
    let config = load::load_config(&args.config_file)?;
    let runner_data = load::load_runner_data(&args.runner_file)?;
    let scheduler_data = load::load_scheduler_data(&args.scheduler_file)?;

    let scheduler = Scheduler::new(SchedulerConfig {
        config: config.clone(),
        data: scheduler_data,
    });
    let tasker = Tasker::new(TaskerConfig {
        config,
        data: runner_data,
        policy: TimeoutPolicy::default(),
        forward_eof: args.forward_eof,
        capacity: 0,
    });

    let mut pipeline = Pipeline::new(scheduler, tasker);

    pipeline.init().await.context("failed to init pipeline")?;
    let result = pipeline.run(token).await;
    pipeline.deinit();

    result
}

pub struct Pipeline {
    scheduler: Scheduler,
    tasker: Tasker,
}

impl Pipeline {
    pub fn new(scheduler: Scheduler, tasker: Tasker) -> Self {
        Self { scheduler, tasker }
    }

    pub async fn init(&mut self) -> anyhow::Result<()> {
        self.scheduler
            .init()
            .await
            .context("failed to init scheduler")?;
        self.tasker.init().await.context("failed to init runner")?;
        Ok(())
    }

    pub async fn run(&mut self, token: CancellationToken) -> anyhow::Result<()> {
        let decision = self
            .scheduler
            .run()
            .await
            .context("failed to run scheduler")?;

        println!("   Run: scheduler");
        println!("  Name: {}", decision.name);
        println!(" Error: {}", decision.error);
        println!();
        println!("   Run: runner");

        let mut tail = self
            .tasker
            .tail()
            .context("live log was already taken")?;
        let printer = tokio::spawn(async move {
            while let Some(line) = tail.next_line().await {
                println!("    Pos: {}", line.pos);
                println!("   Time: {}", line.time);
                println!("Message: {}", line.message);
            }
            while let Some(failure) = tail.next_error().await {
                println!(" Failed: {} ({})", failure.name, failure.error);
            }
        });

        info!(tasks = self.tasker.tasks().len(), "running task graph");
        let result = self.tasker.run(token).await;

        // All producers have stopped; closing the queue lets the printer
        // finish draining.
        self.tasker.deinit();
        let _ = printer.await;

        result.context("failed to run tasks")
    }

    /// Unconditional teardown; errors are swallowed so it can never mask an
    /// already-reported run failure.
    pub fn deinit(&mut self) {
        self.tasker.deinit();
        self.scheduler.deinit();
    }
}
