mod error;
pub use error::DagError;

mod graph;
pub use graph::{Edge, File, Param, Task, Timeout, Vertex, build};

mod livelog;
pub use livelog::{EOF_SENTINEL, Failure, Line, LiveLog, LogTail, channel};

mod engine;
pub use engine::{Dag, Invoker};
