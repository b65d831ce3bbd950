#[macro_use]
extern crate log;

use log::LevelFilter;
use rand::Rng;
use std::process::exit;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;
use taskpool::{Result, ThreadPool};

#[derive(StructOpt, Debug)]
#[structopt(name = "pool-demo")]
struct Opt {
    #[structopt(
        long,
        help = "Sets the number of worker threads",
        value_name = "N",
        default_value = "4"
    )]
    workers: usize,
    #[structopt(
        long,
        help = "Sets the number of tasks to submit",
        value_name = "N",
        default_value = "20"
    )]
    tasks: usize,
}

fn run(opt: Opt) -> Result<()> {
    info!("pool-demo {}", env!("CARGO_PKG_VERSION"));
    info!("{} workers, {} tasks", opt.workers, opt.tasks);

    let pool = ThreadPool::new(opt.workers);
    pool.init()?;

    let started = Instant::now();
    let mut handles = Vec::with_capacity(opt.tasks);
    for i in 0..opt.tasks {
        let handle = pool.submit(move || {
            let delay = rand::thread_rng().gen_range(100, 600);
            thread::sleep(Duration::from_micros(delay));
            i
        })?;
        handles.push(handle);
    }

    for (i, handle) in handles.iter().enumerate() {
        match handle.get() {
            Ok(value) => info!("task {} -> {}", i, value),
            Err(e) => error!("task {} failed: {}", i, e),
        }
    }

    pool.shutdown();
    info!("all tasks done in {:?}", started.elapsed());
    Ok(())
}

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();
    let opt = Opt::from_args();
    if let Err(e) = run(opt) {
        error!("{}", e);
        exit(1);
    }
}
