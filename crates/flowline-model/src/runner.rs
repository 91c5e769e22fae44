use serde::{Deserialize, Serialize};

use crate::Metadata;

/// Runner data file (JSON): the task list submitted to the remote runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerData {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: RunnerSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerSpec {
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

/// One declared task.
///
/// `depends` names predecessor tasks in the same list; a task without
/// `depends` is a graph root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    #[serde(default)]
    pub file: FileSpec,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub log: LogSpec,
    #[serde(default)]
    pub timeout: TimeoutSpec,
    #[serde(default)]
    pub depends: Vec<String>,
}

/// Optional payload file shipped with a task.
///
/// `gzip` requests compression before transmission; the wire flag reflects
/// whether compression was actually applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSpec {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub gzip: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSpec {
    #[serde(default)]
    pub width: i64,
}

/// Declared timeout; zero amount or an unrecognized unit falls back to the
/// process-wide default policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeoutSpec {
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub unit: String,
}
