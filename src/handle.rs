use crate::error::TaskResult;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Caller-side view of one submission's eventual outcome.
///
/// The underlying cell is assigned exactly once, by the worker that ran the
/// task. Reads block until that happens; once resolved, every read (from any
/// thread) observes the same outcome.
pub struct TaskHandle<T> {
    cell: Arc<ResultCell<T>>,
}

/// Worker-side half; consumed on resolution so the cell cannot be assigned
/// twice.
pub(crate) struct Completion<T> {
    cell: Arc<ResultCell<T>>,
}

struct ResultCell<T> {
    slot: Mutex<Option<TaskResult<T>>>,
    ready: Condvar,
}

pub(crate) fn pair<T>() -> (TaskHandle<T>, Completion<T>) {
    let cell = Arc::new(ResultCell {
        slot: Mutex::new(None),
        ready: Condvar::new(),
    });
    let handle = TaskHandle {
        cell: Arc::clone(&cell),
    };
    (handle, Completion { cell })
}

impl<T> TaskHandle<T> {
    /// Blocks until the task has run, then returns its outcome. A task
    /// failure is returned as `Err`, carrying the original panic message.
    pub fn get(&self) -> TaskResult<T>
    where
        T: Clone,
    {
        let mut slot = self.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            slot = self
                .cell
                .ready
                .wait(slot)
                .expect("result cell lock poisoned");
        }
    }

    /// Non-blocking probe; `None` while the task is still pending.
    pub fn try_get(&self) -> Option<TaskResult<T>>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<Option<TaskResult<T>>> {
        self.cell.slot.lock().expect("result cell lock poisoned")
    }
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> TaskHandle<T> {
        TaskHandle {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> Completion<T> {
    pub(crate) fn complete(self, outcome: TaskResult<T>) {
        let mut slot = self.cell.slot.lock().expect("result cell lock poisoned");
        debug_assert!(slot.is_none(), "result cell resolved twice");
        *slot = Some(outcome);
        // Broadcast: several threads may block on the same handle.
        self.cell.ready.notify_all();
    }
}
