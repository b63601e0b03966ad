// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod errors;
pub mod logging;
pub mod monitor;
pub mod sink;
pub mod source;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::monitor::{JobMonitor, MonitorOptions, MonitorOutcome};
use crate::sink::WriterSink;
use crate::source::JobHandle;
use crate::source::scenario::{Scenario, load_scenario};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the scripted job from the scenario file
/// - the monitor, printing to stdout
/// - Ctrl-C handling
///
/// Returns `true` if the job succeeded (or on `--dry-run`).
pub async fn run(args: CliArgs) -> Result<bool> {
    let cfg = load_and_validate(args.config.as_deref())?;
    let scenario = load_scenario(&args.job)
        .with_context(|| format!("loading scenario {:?}", args.job))?;

    if args.dry_run {
        print_dry_run(&cfg, &scenario);
        return Ok(true);
    }

    let monitor = JobMonitor::new(MonitorOptions::from(&cfg));

    // Ctrl-C → stop at the next poll or sleep, without a summary.
    {
        let cancel = monitor.cancellation_token();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    let Scenario {
        job_id,
        status,
        events,
    } = scenario;
    info!(job = %job_id, polls = status.remaining(), "starting scripted job");

    let mut job = JobHandle::new(job_id, status, events);
    let mut sink = WriterSink::stdout();
    let outcome = monitor.run(&mut job, &mut sink).await?;

    debug!(
        ?outcome,
        polls = job.status_source().polls(),
        "scripted job finished"
    );
    Ok(outcome == MonitorOutcome::Succeeded)
}

/// Simple dry-run output: print effective settings and the scripted job.
fn print_dry_run(cfg: &ConfigFile, scenario: &Scenario) {
    let m = &cfg.monitor;

    println!("jobmon dry-run");
    println!("  monitor.poll_interval_ms = {}", m.poll_interval_ms);
    println!(
        "  monitor.completion_poll_interval_ms = {}",
        m.completion_poll_interval_ms
    );
    println!("  monitor.progress_reporting = {}", m.progress_reporting);
    println!("  monitor.status_timeout_ms = {}", m.status_timeout_ms);
    println!("  monitor.max_status_retries = {}", m.max_status_retries);
    println!("  monitor.event_batch_size = {}", m.event_batch_size);
    println!("  monitor.task_output_filter = {:?}", m.task_output_filter);
    println!();
    println!("job {}", scenario.job_id);
    println!("  scripted polls: {}", scenario.status.remaining());

    debug!("dry-run complete (no monitoring)");
}
