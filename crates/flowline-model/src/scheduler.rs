use serde::{Deserialize, Serialize};

use crate::Metadata;

/// Scheduler data file (JSON): the placement question asked of the remote
/// scheduler — one task's resource requirements plus the candidate nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerData {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: SchedulerSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerSpec {
    #[serde(default)]
    pub task: SchedTaskSpec,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedTaskSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub node_selector: Vec<String>,
    #[serde(default)]
    pub requested_resource: ResourceSpec,
    #[serde(default)]
    pub tolerates_unschedulable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub allocatable_resource: ResourceSpec,
    #[serde(default)]
    pub requested_resource: ResourceSpec,
    #[serde(default)]
    pub unschedulable: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(default, rename = "milliCPU")]
    pub milli_cpu: i64,
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub storage: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_data_from_json() {
        let json = r#"{
            "apiVersion": "v1",
            "kind": "scheduler",
            "metadata": {"name": "demo"},
            "spec": {
                "task": {
                    "name": "build",
                    "requestedResource": {"milliCPU": 500, "memory": 1024, "storage": 2048}
                },
                "nodes": [
                    {
                        "name": "node-1",
                        "host": "10.0.0.1",
                        "allocatableResource": {"milliCPU": 4000, "memory": 8192, "storage": 65536}
                    }
                ]
            }
        }"#;
        let data: SchedulerData = serde_json::from_str(json).unwrap();

        assert_eq!(data.spec.task.requested_resource.milli_cpu, 500);
        assert_eq!(data.spec.nodes.len(), 1);
        assert_eq!(data.spec.nodes[0].allocatable_resource.storage, 65536);
        assert!(!data.spec.nodes[0].unschedulable);
    }
}
