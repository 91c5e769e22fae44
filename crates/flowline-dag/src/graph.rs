//! Execution-graph projection: a flat task list becomes one vertex per task
//! and one directed edge per `(dependency, dependent)` pair.

/// A declared task, dependencies included.
#[derive(Debug, Clone, Default)]
pub struct Task {
    pub name: String,
    pub file: File,
    pub params: Vec<Param>,
    pub commands: Vec<String>,
    pub width: i64,
    pub timeout: Timeout,
    pub depends: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct File {
    pub content: Vec<u8>,
    pub gzip: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Param {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct Timeout {
    pub amount: i64,
    pub unit: String,
}

/// A schedulable graph node: every task field except `depends`, which turned
/// into edges at build time. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Vertex {
    pub name: String,
    pub file: File,
    pub params: Vec<Param>,
    pub commands: Vec<String>,
    pub width: i64,
    pub timeout: Timeout,
}

/// Directed dependency link: `to` cannot start before `from` completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Project the task list into vertices and edges.
///
/// Vertices keep the input's insertion order. Dangling `depends` references
/// are passed through untouched; the engine rejects them at run setup.
pub fn build(tasks: &[Task]) -> (Vec<Vertex>, Vec<Edge>) {
    let mut vertices = Vec::with_capacity(tasks.len());
    let mut edges = Vec::new();

    for task in tasks {
        vertices.push(Vertex {
            name: task.name.clone(),
            file: task.file.clone(),
            params: task.params.clone(),
            commands: task.commands.clone(),
            width: task.width,
            timeout: task.timeout.clone(),
        });

        for dep in &task.depends {
            edges.push(Edge {
                from: dep.clone(),
                to: task.name.clone(),
            });
        }
    }

    (vertices, edges)
}
