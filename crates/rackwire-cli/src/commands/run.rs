//! Real-time run command.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Args;

use super::common::{engine_config, open_patch};
use crate::GlobalArgs;

#[derive(Args)]
pub struct RunArgs {
    /// Patch file (JSON)
    patch: PathBuf,

    /// Stop after this many seconds (runs until Ctrl+C otherwise)
    #[arg(short, long)]
    seconds: Option<f64>,

    /// Measure per-module step time
    #[arg(long)]
    power_meter: bool,
}

pub fn run(args: RunArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut config = engine_config(global)?;
    config.power_meter |= args.power_meter;
    let power_meter = config.power_meter;
    let sample_rate = config.sample_rate;

    let (editor, report) = open_patch(&args.patch, config)?;
    let engine = editor.engine();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    println!(
        "Running {} modules and {} wires at {} Hz",
        report.modules_loaded, report.wires_loaded, sample_rate
    );
    if args.seconds.is_none() {
        println!("Press Ctrl+C to stop...");
    }

    let deadline = args
        .seconds
        .map(|s| Instant::now() + Duration::from_secs_f64(s.max(0.0)));
    let started = Instant::now();
    engine.start()?;
    while running.load(Ordering::SeqCst) && deadline.is_none_or(|d| Instant::now() < d) {
        std::thread::sleep(Duration::from_millis(10));
    }
    engine.stop();

    let elapsed = started.elapsed().as_secs_f64();
    let frames = engine.frame_count();
    println!("Stepped {frames} frames in {elapsed:.2}s");

    if power_meter {
        println!();
        println!("{:>4}  {:14}  {:>10}", "#", "Model", "CPU (us)");
        for (pos, id) in editor.module_ids().enumerate() {
            let cpu = engine.module_cpu_time(id)?;
            let name = editor.module_slugs(id).map_or("?", |(_, model)| model);
            println!("{pos:>4}  {name:14}  {:>10.3}", cpu * 1e6);
        }
    }
    Ok(())
}
