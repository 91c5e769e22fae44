//! Bounded hand-off of task output from the per-task relays to the single
//! consumer. Backpressure, never drop: a full queue parks the producer until
//! the consumer drains a slot.

use tokio::sync::mpsc;

use crate::error::DagError;

/// Reserved reply message that marks the end of one task's stream. It is a
/// termination signal, not output; whether it is also forwarded to the
/// consumer is the caller's choice.
pub const EOF_SENTINEL: &str = "EOF";

/// One line of task output, ordered by `pos` within a task's stream.
/// Interleaving across tasks is unordered; consumers key on `pos` plus task
/// identity, not arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub pos: i64,
    pub time: i64,
    pub message: String,
}

/// A failed vertex, reported on the queue's error lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub error: String,
}

/// Producer handle, cloned into each in-flight task relay.
#[derive(Debug, Clone)]
pub struct LiveLog {
    line: mpsc::Sender<Line>,
    error: mpsc::Sender<Failure>,
}

/// Consumer handle. `next_line` returning `None` means closed and drained:
/// all producers finished and the owner released its handle.
#[derive(Debug)]
pub struct LogTail {
    line: mpsc::Receiver<Line>,
    error: mpsc::Receiver<Failure>,
}

/// Open one queue for one run. The owner keeps the `LiveLog` until teardown;
/// dropping the last `LiveLog` closes the queue. A zero capacity is clamped
/// to one.
pub fn channel(capacity: usize) -> (LiveLog, LogTail) {
    // tokio's mpsc rejects a zero capacity.
    let capacity = capacity.max(1);
    let (line_tx, line_rx) = mpsc::channel(capacity);
    let (error_tx, error_rx) = mpsc::channel(capacity);

    (
        LiveLog {
            line: line_tx,
            error: error_tx,
        },
        LogTail {
            line: line_rx,
            error: error_rx,
        },
    )
}

impl LiveLog {
    /// Append a line, waiting while the queue is full.
    pub async fn push(&self, line: Line) -> Result<(), DagError> {
        self.line.send(line).await.map_err(|_| DagError::QueueClosed)
    }

    /// Report a failed vertex on the error lane.
    pub async fn fail(&self, failure: Failure) -> Result<(), DagError> {
        self.error
            .send(failure)
            .await
            .map_err(|_| DagError::QueueClosed)
    }
}

impl LogTail {
    pub async fn next_line(&mut self) -> Option<Line> {
        self.line.recv().await
    }

    pub async fn next_error(&mut self) -> Option<Failure> {
        self.error.recv().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn line(pos: i64) -> Line {
        Line {
            pos,
            time: 0,
            message: format!("line {pos}"),
        }
    }

    #[tokio::test]
    async fn push_blocks_when_full_and_resumes_after_drain() {
        let (log, mut tail) = channel(1);

        log.push(line(0)).await.unwrap();

        // Queue is full: the next push must park rather than drop.
        let blocked = tokio::time::timeout(Duration::from_millis(50), log.push(line(1))).await;
        assert!(blocked.is_err());

        assert_eq!(tail.next_line().await.unwrap().pos, 0);

        // One slot free again.
        log.push(line(1)).await.unwrap();
        assert_eq!(tail.next_line().await.unwrap().pos, 1);
    }

    #[tokio::test]
    async fn closed_and_drained_yields_none() {
        let (log, mut tail) = channel(4);

        log.push(line(0)).await.unwrap();
        log.push(line(1)).await.unwrap();
        drop(log);

        assert_eq!(tail.next_line().await.unwrap().pos, 0);
        assert_eq!(tail.next_line().await.unwrap().pos, 1);
        assert!(tail.next_line().await.is_none());
        assert!(tail.next_error().await.is_none());
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped() {
        let (log, mut tail) = channel(0);

        log.push(line(0)).await.unwrap();
        assert_eq!(tail.next_line().await.unwrap().pos, 0);
    }

    #[tokio::test]
    async fn push_after_close_reports_queue_closed() {
        let (log, tail) = channel(1);
        drop(tail);

        let err = log.push(line(0)).await.unwrap_err();
        assert!(matches!(err, DagError::QueueClosed));
    }
}
