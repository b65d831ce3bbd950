use crate::error::{PoolError, Result, TaskError};
use crate::handle::{self, TaskHandle};
use crate::queue::TaskQueue;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Lifecycle {
    New,
    Running,
    Shutdown,
}

/// State shared between the pool front-end and its workers. Workers hold an
/// `Arc` to this rather than a pointer back to the pool, so they can never
/// outlive it.
struct PoolShared {
    queue: TaskQueue<Task>,
    state: Mutex<Lifecycle>,
    work_signal: Condvar,
}

impl PoolShared {
    fn state_lock(&self) -> MutexGuard<Lifecycle> {
        self.state.lock().expect("pool state lock poisoned")
    }
}

/// A fixed-size pool of worker threads draining one shared FIFO queue.
///
/// Built in two steps, `new` then `init`, after which `submit` hands back a
/// [`TaskHandle`] per task. `shutdown` lets queued work drain, then joins
/// every worker; it is also run on drop.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    size: usize,
}

impl ThreadPool {
    pub fn new(size: usize) -> ThreadPool {
        assert!(size > 0, "pool size must be positive");
        ThreadPool {
            shared: Arc::new(PoolShared {
                queue: TaskQueue::new(),
                state: Mutex::new(Lifecycle::New),
                work_signal: Condvar::new(),
            }),
            workers: Mutex::new(Vec::with_capacity(size)),
            size,
        }
    }

    /// Spawns the worker threads. Fails with `InvalidState` if the pool was
    /// already initialized or shut down.
    pub fn init(&self) -> Result<()> {
        {
            let mut state = self.shared.state_lock();
            match *state {
                Lifecycle::New => *state = Lifecycle::Running,
                Lifecycle::Running => {
                    return Err(PoolError::InvalidState("pool is already initialized"));
                }
                Lifecycle::Shutdown => {
                    return Err(PoolError::InvalidState("pool has been shut down"));
                }
            }
        }
        let mut workers = self.workers_lock();
        for id in 0..self.size {
            let worker = Worker {
                id,
                shared: Arc::clone(&self.shared),
            };
            let handle = thread::Builder::new()
                .name(format!("taskpool-worker-{}", id))
                .spawn(move || worker.serve())?;
            workers.push(handle);
        }
        debug!("thread pool started with {} workers", self.size);
        Ok(())
    }

    /// Enqueues `task` and wakes one idle worker, returning a handle to its
    /// eventual outcome. Never blocks on execution. Fails with
    /// `InvalidState` before `init` and with `Shutdown` once shutdown has
    /// begun; in neither case is the task enqueued.
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let state = self.shared.state_lock();
        match *state {
            Lifecycle::New => return Err(PoolError::InvalidState("pool is not initialized")),
            Lifecycle::Shutdown => return Err(PoolError::Shutdown),
            Lifecycle::Running => {}
        }
        let (handle, completion) = handle::pair();
        let boxed: Task = Box::new(move || {
            // A task failure must never take its worker thread down; it is
            // captured and delivered through the handle instead.
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(task)).map_err(TaskError::from_panic);
            completion.complete(outcome);
        });
        // Enqueue and signal while still holding the state lock, so no task
        // can slip in once a shutdown has been observed, and no wakeup can
        // race past a worker between its predicate check and its wait.
        self.shared.queue.enqueue(boxed);
        self.shared.work_signal.notify_one();
        drop(state);
        Ok(handle)
    }

    /// Requests shutdown and blocks until every queued and in-flight task
    /// has finished and all workers have exited. Safe to call more than
    /// once; later calls return immediately.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state_lock();
            *state = Lifecycle::Shutdown;
            // Broadcast: every worker has to re-check its exit condition.
            self.shared.work_signal.notify_all();
        }
        let workers = mem::replace(&mut *self.workers_lock(), Vec::new());
        for handle in workers {
            if handle.join().is_err() {
                // Tasks are caught inside the worker; reaching this is a
                // bug in the pool itself.
                error!("a worker thread panicked outside of a task");
            }
        }
        trace!("thread pool shut down");
    }

    fn workers_lock(&self) -> MutexGuard<Vec<thread::JoinHandle<()>>> {
        self.workers.lock().expect("worker list lock poisoned")
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    id: usize,
    shared: Arc<PoolShared>,
}

impl Worker {
    fn serve(self) {
        debug!("worker {} started", self.id);
        while let Some(task) = self.next_task() {
            trace!("worker {} picked up a task", self.id);
            task();
            trace!("worker {} finished a task", self.id);
        }
        debug!("worker {} exiting", self.id);
    }

    // A queued task always wins over the shutdown flag, so work enqueued
    // before shutdown was signalled still gets drained.
    fn next_task(&self) -> Option<Task> {
        let mut state = self.shared.state_lock();
        loop {
            if let Some(task) = self.shared.queue.dequeue() {
                return Some(task);
            }
            if *state == Lifecycle::Shutdown {
                return None;
            }
            state = self
                .shared
                .work_signal
                .wait(state)
                .expect("pool state lock poisoned");
        }
    }
}
