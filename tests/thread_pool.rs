use crossbeam_utils::sync::WaitGroup;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use taskpool::{PoolError, Result, TaskError, ThreadPool};

fn running_pool(size: usize) -> Result<ThreadPool> {
    let pool = ThreadPool::new(size);
    pool.init()?;
    Ok(pool)
}

#[test]
fn submit_counter() -> Result<()> {
    const TASK_NUM: usize = 20;
    const ADD_COUNT: usize = 1000;

    let pool = running_pool(4)?;
    let wg = WaitGroup::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..TASK_NUM {
        let counter = Arc::clone(&counter);
        let wg = wg.clone();
        pool.submit(move || {
            for _ in 0..ADD_COUNT {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            drop(wg);
        })?;
    }

    wg.wait();
    assert_eq!(counter.load(Ordering::SeqCst), TASK_NUM * ADD_COUNT);
    pool.shutdown();
    Ok(())
}

#[test]
fn tasks_start_in_submission_order() -> Result<()> {
    // A single worker makes the dequeue order observable as run order.
    let pool = running_pool(1)?;
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..10 {
        let order = Arc::clone(&order);
        pool.submit(move || {
            order.lock().unwrap().push(i);
        })?;
    }
    pool.shutdown();

    let order = order.lock().unwrap();
    assert_eq!(*order, (0..10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn shutdown_drains_queued_tasks() -> Result<()> {
    const TASK_NUM: usize = 50;

    let pool = running_pool(2)?;
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..TASK_NUM {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            thread::sleep(Duration::from_millis(1));
            counter.fetch_add(1, Ordering::SeqCst);
        })?;
    }
    // No waiting: every already-queued task must still complete before
    // shutdown returns.
    pool.shutdown();

    assert_eq!(counter.load(Ordering::SeqCst), TASK_NUM);
    Ok(())
}

#[test]
fn handle_delivers_the_computed_value() -> Result<()> {
    let pool = running_pool(2)?;
    let handle = pool.submit(|| 6 * 7)?;
    assert_eq!(handle.get(), Ok(42));
    pool.shutdown();
    Ok(())
}

#[test]
fn resolved_handle_reads_are_stable() -> Result<()> {
    let pool = running_pool(2)?;
    let handle = pool.submit(|| "stable".to_owned())?;

    let reader = {
        let handle = handle.clone();
        thread::spawn(move || handle.get())
    };
    let first = handle.get();
    let second = handle.get();
    let concurrent = reader.join().expect("reader thread panicked");

    assert_eq!(first, Ok("stable".to_owned()));
    assert_eq!(first, second);
    assert_eq!(first, concurrent);
    pool.shutdown();
    Ok(())
}

#[test]
fn panicking_task_does_not_kill_its_worker() -> Result<()> {
    // One worker: if the panic took the thread down, the second task could
    // never run.
    let pool = running_pool(1)?;

    let failed = pool.submit(|| -> u32 { panic!("deliberate task failure") })?;
    let survived = pool.submit(|| 11)?;

    assert_eq!(
        failed.get(),
        Err(TaskError::Panicked("deliberate task failure".to_owned()))
    );
    assert_eq!(survived.get(), Ok(11));
    pool.shutdown();
    Ok(())
}

#[test]
fn submit_before_init_fails() {
    let pool = ThreadPool::new(2);
    match pool.submit(|| ()) {
        Err(PoolError::InvalidState(_)) => {}
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("submit succeeded on an uninitialized pool"),
    }
}

#[test]
fn double_init_fails() -> Result<()> {
    let pool = running_pool(2)?;
    match pool.init() {
        Err(PoolError::InvalidState(_)) => {}
        Err(e) => panic!("unexpected error: {}", e),
        Ok(()) => panic!("second init succeeded"),
    }
    pool.shutdown();
    Ok(())
}

#[test]
fn submit_after_shutdown_fails() -> Result<()> {
    let pool = running_pool(2)?;
    pool.shutdown();
    match pool.submit(|| ()) {
        Err(PoolError::Shutdown) => {}
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("submit succeeded after shutdown"),
    }
    Ok(())
}

#[test]
fn shutdown_is_idempotent() -> Result<()> {
    let pool = running_pool(2)?;
    pool.submit(|| ())?;
    pool.shutdown();
    pool.shutdown();
    Ok(())
}

#[test]
fn twenty_tasks_resolve_to_their_own_index() -> Result<()> {
    const TASK_NUM: usize = 20;

    let pool = running_pool(4)?;
    let mut handles = Vec::with_capacity(TASK_NUM);
    for i in 0..TASK_NUM {
        handles.push(pool.submit(move || {
            let delay = rand::thread_rng().gen_range(100, 600);
            thread::sleep(Duration::from_micros(delay));
            i
        })?);
    }
    pool.shutdown();

    for (i, handle) in handles.iter().enumerate() {
        assert!(handle.is_resolved(), "handle {} left pending", i);
        assert_eq!(handle.get(), Ok(i));
    }
    Ok(())
}
