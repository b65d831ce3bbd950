use std::collections::VecDeque;
use std::sync::Mutex;

/// Thread-safe FIFO of deferred work items.
///
/// Every operation is serialized by one internal lock, held only for the
/// duration of that operation. `dequeue` never waits; blocking for new work
/// is the pool's job, signalled through its own condition variable.
pub struct TaskQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> TaskQueue<T> {
    pub fn new() -> TaskQueue<T> {
        TaskQueue {
            items: Mutex::new(VecDeque::new()),
        }
    }

    pub fn enqueue(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Removes and returns the head, or `None` immediately if the queue is
    /// empty. Items are moved out, never cloned.
    pub fn dequeue(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Snapshot; only guaranteed true at the instant the lock was held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every queued item without running it.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<VecDeque<T>> {
        // Poisoning would mean a panic inside VecDeque itself.
        self.items.lock().expect("task queue lock poisoned")
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> TaskQueue<T> {
        TaskQueue::new()
    }
}
