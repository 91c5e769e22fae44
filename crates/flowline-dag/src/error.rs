use thiserror::Error;

#[derive(Debug, Error)]
pub enum DagError {
    #[error("duplicate vertex: {0}")]
    DuplicateVertex(String),

    #[error("edge references unknown vertex: {from} -> {to}")]
    UnknownVertex { from: String, to: String },

    #[error("circular dependency detected")]
    CircularDependency,

    #[error("run cancelled")]
    Cancelled,

    #[error("{count} task(s) failed: {names}", count = .0.len(), names = .0.join(", "))]
    Failed(Vec<String>),

    #[error("live log queue is closed")]
    QueueClosed,
}
