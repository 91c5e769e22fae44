use std::fs;
use std::path::Path;

use anyhow::Context;

use flowline_model::{Config, RunnerData, SchedulerData};

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

pub fn load_runner_data(path: &Path) -> anyhow::Result<RunnerData> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read runner file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse runner file {}", path.display()))
}

pub fn load_scheduler_data(path: &Path) -> anyhow::Result<SchedulerData> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scheduler file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse scheduler file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_yaml_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "apiVersion: v1\nkind: flowline\nspec:\n  runner:\n    host: localhost\n    port: 15001\n"
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.spec.runner.port, 15001);
    }

    #[test]
    fn loads_runner_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"spec": {{"tasks": [{{"name": "a"}}, {{"name": "b", "depends": ["a"]}}]}}}}"#
        )
        .unwrap();

        let data = load_runner_data(file.path()).unwrap();
        assert_eq!(data.spec.tasks.len(), 2);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_config(Path::new("/nonexistent/flowline.yml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/flowline.yml"));
    }
}
