mod error;
pub use error::RunnerError;

mod timeout;
pub use timeout::{TimeUnit, TimeoutPolicy};

mod encode;
pub use encode::encode;

mod invoker;
pub use invoker::TaskInvoker;

mod tasker;
pub use tasker::{DEFAULT_LOG_CAPACITY, Tasker, TaskerConfig};
