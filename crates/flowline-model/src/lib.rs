mod config;
pub use config::{Config, Metadata, Server, Spec};

mod runner;
pub use runner::{FileSpec, LogSpec, ParamSpec, RunnerData, RunnerSpec, TaskSpec, TimeoutSpec};

mod scheduler;
pub use scheduler::{
    NodeSpec, ResourceSpec, SchedTaskSpec, SchedulerData, SchedulerSpec,
};
