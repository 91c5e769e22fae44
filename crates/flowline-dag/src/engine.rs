//! Dependency-ordered concurrent traversal.
//!
//! The engine owns traversal order and parallelism; callers supply the
//! single-vertex execution strategy through [`Invoker`]. Every zero-indegree
//! vertex is spawned immediately, a completion unlocks its dependents, and a
//! failure transitively suppresses every not-yet-started dependent while
//! independent branches keep running.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::DagError;
use crate::graph::{Edge, Task, Vertex, build};
use crate::livelog::{Failure, LiveLog};

/// Single-vertex execution strategy, called once per vertex after all of its
/// dependencies completed. Multiple invocations may run concurrently.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, vertex: &Vertex, log: LiveLog) -> anyhow::Result<()>;
}

/// The built execution graph plus its run entry point.
#[derive(Debug, Default)]
pub struct Dag {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl Dag {
    pub fn init(tasks: &[Task]) -> Self {
        let (vertices, edges) = build(tasks);
        Self { vertices, edges }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Drive every vertex through `invoker`, blocking until all vertices
    /// settled (completed, failed, or suppressed) or the token fired.
    ///
    /// Returns `Err(DagError::Failed)` listing the failed vertices when any
    /// invocation errored; each failure is also pushed to `log`'s error lane.
    pub async fn run(
        &self,
        invoker: Arc<dyn Invoker>,
        log: LiveLog,
        token: CancellationToken,
    ) -> Result<(), DagError> {
        let total = self.vertices.len();
        if total == 0 {
            return Ok(());
        }

        let mut index: HashMap<String, Arc<Vertex>> = HashMap::with_capacity(total);
        for vertex in &self.vertices {
            if index
                .insert(vertex.name.clone(), Arc::new(vertex.clone()))
                .is_some()
            {
                return Err(DagError::DuplicateVertex(vertex.name.clone()));
            }
        }

        let mut indegree: HashMap<String, usize> =
            self.vertices.iter().map(|v| (v.name.clone(), 0)).collect();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

        for edge in &self.edges {
            // An edge is never dropped: both endpoints must exist.
            if !index.contains_key(&edge.from) || !index.contains_key(&edge.to) {
                return Err(DagError::UnknownVertex {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
            *indegree.get_mut(&edge.to).expect("endpoint checked") += 1;
            dependents
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
        }

        if has_cycle(&self.vertices, &dependents) {
            return Err(DagError::CircularDependency);
        }

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(String, anyhow::Result<()>)>();

        let mut handles = Vec::with_capacity(total);
        let mut started: HashSet<String> = HashSet::new();
        let mut skipped: HashSet<String> = HashSet::new();
        let mut failed: Vec<String> = Vec::new();
        let mut settled = 0usize;

        let spawn_vertex = |name: &str| {
            let vertex = Arc::clone(&index[name]);
            let invoker = Arc::clone(&invoker);
            let log = log.clone();
            let done = done_tx.clone();
            debug!(task = %name, "vertex ready");

            tokio::spawn(async move {
                let result = invoker.invoke(&vertex, log).await;
                // Receiver outlives every started vertex.
                let _ = done.send((vertex.name.clone(), result));
            })
        };

        // Roots first, in insertion order.
        let roots: Vec<String> = self
            .vertices
            .iter()
            .filter(|v| indegree[&v.name] == 0)
            .map(|v| v.name.clone())
            .collect();
        for name in &roots {
            started.insert(name.clone());
            handles.push(spawn_vertex(name));
        }

        while settled < total {
            tokio::select! {
                _ = token.cancelled() => {
                    warn!("run cancelled, aborting in-flight vertices");
                    // Abandoned vertices hold queue producer handles; abort
                    // them so the queue can close during teardown.
                    for handle in &handles {
                        handle.abort();
                    }
                    return Err(DagError::Cancelled);
                }
                recv = done_rx.recv() => {
                    let (name, result) = recv.expect("done_tx held by engine");
                    settled += 1;

                    match result {
                        Ok(()) => {
                            debug!(task = %name, "vertex completed");
                            for dep in dependents.get(&name).cloned().unwrap_or_default() {
                                if skipped.contains(&dep) {
                                    continue;
                                }
                                let degree = indegree.get_mut(&dep).expect("known vertex");
                                *degree -= 1;
                                if *degree == 0 {
                                    started.insert(dep.clone());
                                    handles.push(spawn_vertex(&dep));
                                }
                            }
                        }
                        Err(err) => {
                            warn!(task = %name, error = %err, "vertex failed");
                            let _ = log
                                .fail(Failure {
                                    name: name.clone(),
                                    error: format!("{err:#}"),
                                })
                                .await;
                            failed.push(name.clone());

                            // Everything downstream of the failure can never
                            // start; count it as settled.
                            let mut stack = VecDeque::from([name.clone()]);
                            while let Some(current) = stack.pop_front() {
                                for dep in dependents.get(&current).cloned().unwrap_or_default() {
                                    if started.contains(&dep) || skipped.contains(&dep) {
                                        continue;
                                    }
                                    debug!(task = %dep, blocked_by = %name, "vertex suppressed");
                                    skipped.insert(dep.clone());
                                    settled += 1;
                                    stack.push_back(dep);
                                }
                            }
                        }
                    }
                }
            }
        }

        for handle in handles {
            let _ = handle.await;
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DagError::Failed(failed))
        }
    }
}

fn has_cycle(vertices: &[Vertex], dependents: &HashMap<String, Vec<String>>) -> bool {
    fn visit(
        name: &str,
        dependents: &HashMap<String, Vec<String>>,
        visited: &mut HashSet<String>,
        stack: &mut HashSet<String>,
    ) -> bool {
        if stack.contains(name) {
            return true;
        }
        if visited.contains(name) {
            return false;
        }

        visited.insert(name.to_string());
        stack.insert(name.to_string());

        if let Some(next) = dependents.get(name) {
            for dep in next {
                if visit(dep, dependents, visited, stack) {
                    return true;
                }
            }
        }

        stack.remove(name);
        false
    }

    let mut visited = HashSet::new();
    let mut stack = HashSet::new();

    vertices
        .iter()
        .any(|v| visit(&v.name, dependents, &mut visited, &mut stack))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    use anyhow::bail;

    use super::*;
    use crate::livelog::{Line, channel};

    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail: HashSet<String>,
        delay: Duration,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: HashSet::new(),
                delay: Duration::ZERO,
            }
        }

        fn failing(names: &[&str]) -> Self {
            Self {
                fail: names.iter().map(|s| s.to_string()).collect(),
                ..Self::new()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Invoker for Recorder {
        async fn invoke(&self, vertex: &Vertex, log: LiveLog) -> anyhow::Result<()> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.calls.lock().unwrap().push(vertex.name.clone());
            if self.fail.contains(&vertex.name) {
                bail!("induced failure");
            }
            log.push(Line {
                pos: 0,
                time: 0,
                message: format!("{} done", vertex.name),
            })
            .await?;
            Ok(())
        }
    }

    fn task(name: &str, depends: &[&str]) -> Task {
        Task {
            name: name.to_string(),
            depends: depends.iter().map(|s| s.to_string()).collect(),
            ..Task::default()
        }
    }

    #[tokio::test]
    async fn dependency_order_is_respected() {
        let dag = Dag::init(&[task("a", &[]), task("b", &["a"])]);
        let recorder = Arc::new(Recorder::new());
        let (log, _tail) = channel(16);

        dag.run(recorder.clone(), log, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(recorder.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn diamond_joins_after_both_branches() {
        let dag = Dag::init(&[
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("d", &["b", "c"]),
        ]);
        let recorder = Arc::new(Recorder::new());
        let (log, _tail) = channel(16);

        dag.run(recorder.clone(), log, CancellationToken::new())
            .await
            .unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], "a");
        assert_eq!(calls[3], "d");
    }

    #[tokio::test]
    async fn failure_suppresses_dependents() {
        let dag = Dag::init(&[task("a", &[]), task("b", &["a"]), task("c", &["b"])]);
        let recorder = Arc::new(Recorder::failing(&["a"]));
        let (log, mut tail) = channel(16);

        let err = dag
            .run(recorder.clone(), log, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DagError::Failed(ref names) if names == &vec!["a".to_string()]));
        assert_eq!(recorder.calls(), vec!["a"]);

        let failure = tail.next_error().await.unwrap();
        assert_eq!(failure.name, "a");
        assert!(failure.error.contains("induced failure"));
    }

    #[tokio::test]
    async fn independent_branch_survives_sibling_failure() {
        let dag = Dag::init(&[
            task("bad", &[]),
            task("good", &[]),
            task("after-good", &["good"]),
        ]);
        let recorder = Arc::new(Recorder::failing(&["bad"]));
        let (log, _tail) = channel(16);

        let err = dag
            .run(recorder.clone(), log, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DagError::Failed(_)));
        let calls = recorder.calls();
        assert!(calls.contains(&"good".to_string()));
        assert!(calls.contains(&"after-good".to_string()));
    }

    #[tokio::test]
    async fn unknown_edge_endpoint_is_rejected() {
        let dag = Dag::init(&[task("b", &["missing"])]);
        let (log, _tail) = channel(16);

        let err = dag
            .run(Arc::new(Recorder::new()), log, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DagError::UnknownVertex { ref from, ref to } if from == "missing" && to == "b"
        ));
    }

    #[tokio::test]
    async fn cycle_is_rejected_before_any_invocation() {
        let dag = Dag::init(&[task("a", &["b"]), task("b", &["a"])]);
        let recorder = Arc::new(Recorder::new());
        let (log, _tail) = channel(16);

        let err = dag
            .run(recorder.clone(), log, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DagError::CircularDependency));
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn cancellation_stops_the_run() {
        let dag = Dag::init(&[task("slow", &[]), task("after", &["slow"])]);
        let recorder = Arc::new(Recorder {
            delay: Duration::from_secs(5),
            ..Recorder::new()
        });
        let (log, _tail) = channel(16);
        let token = CancellationToken::new();

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let err = dag.run(recorder, log, token).await.unwrap_err();
        assert!(matches!(err, DagError::Cancelled));
    }

    #[tokio::test]
    async fn cancellation_closes_the_queue_promptly() {
        let dag = Dag::init(&[task("slow", &[])]);
        let recorder = Arc::new(Recorder {
            delay: Duration::from_secs(3600),
            ..Recorder::new()
        });
        let (log, mut tail) = channel(1);
        let token = CancellationToken::new();

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let err = dag.run(recorder, log, token).await.unwrap_err();
        assert!(matches!(err, DagError::Cancelled));

        // The aborted vertex must release its producer handle; the drained
        // queue closes instead of staying open for the vertex's lifetime.
        let drained = tokio::time::timeout(Duration::from_secs(1), tail.next_line()).await;
        assert!(matches!(drained, Ok(None)));
    }

    #[tokio::test]
    async fn empty_graph_completes_immediately() {
        let dag = Dag::init(&[]);
        let (log, _tail) = channel(1);

        dag.run(Arc::new(Recorder::new()), log, CancellationToken::new())
            .await
            .unwrap();
    }
}
