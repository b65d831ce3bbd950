#[macro_use]
extern crate log;

pub use error::{PoolError, Result, TaskError, TaskResult};
pub use handle::TaskHandle;
pub use pool::ThreadPool;
pub use queue::TaskQueue;

mod error;
mod handle;
mod pool;
mod queue;
