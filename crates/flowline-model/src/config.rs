use serde::{Deserialize, Serialize};

/// Cluster configuration loaded from the YAML config file.
///
/// Carries the endpoints of the two remote services; everything task-related
/// lives in the runner and scheduler data files instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: Spec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default)]
    pub runner: Server,
    #[serde(default)]
    pub scheduler: Server,
}

/// One remote service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    /// Per-call deadline in seconds for unary calls against this service.
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            timeout: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_yaml() {
        let yaml = r#"
apiVersion: v1
kind: flowline
metadata:
  name: demo
spec:
  runner:
    host: 127.0.0.1
    port: 15001
  scheduler:
    host: 127.0.0.1
    port: 15002
    timeout: 30
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.api_version, "v1");
        assert_eq!(cfg.metadata.name, "demo");
        assert_eq!(cfg.spec.runner.host, "127.0.0.1");
        assert_eq!(cfg.spec.runner.port, 15001);
        assert_eq!(cfg.spec.runner.timeout, 10);
        assert_eq!(cfg.spec.scheduler.timeout, 30);
    }

    #[test]
    fn config_defaults() {
        let cfg: Config = serde_yaml::from_str("kind: flowline").unwrap();

        assert_eq!(cfg.kind, "flowline");
        assert!(cfg.spec.runner.host.is_empty());
        assert_eq!(cfg.spec.scheduler.timeout, 10);
    }
}
