use failure::Fail;
use std::io;

#[derive(Debug, Fail)]
pub enum PoolError {
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
    #[fail(display = "invalid pool state: {}", _0)]
    InvalidState(&'static str),
    #[fail(display = "the thread pool has been shut down")]
    Shutdown,
}

impl From<io::Error> for PoolError {
    fn from(err: io::Error) -> PoolError {
        PoolError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;

/// Failure captured from a task body, delivered through its `TaskHandle`.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum TaskError {
    #[fail(display = "task panicked: {}", _0)]
    Panicked(String),
}

impl TaskError {
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> TaskError {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "opaque panic payload".to_owned()
        };
        TaskError::Panicked(msg)
    }
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
