// src/pipeline/run.rs

//! The polling loop around reconciliation cycles.

use std::time::Duration;

use tokio::sync::watch;

use crate::error::Result;
use crate::pipeline::{CycleReport, Reconciler};

/// Run cycles until `shutdown` flips to `true`.
///
/// Each cycle is its own recovery boundary: an error is logged and the loop
/// still sleeps and tries again. A shutdown request never interrupts a
/// running cycle; it is honored once the cycle finishes or during the sleep.
pub async fn run_watcher(
    reconciler: &mut Reconciler<'_>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut cycle: u64 = 0;

    loop {
        cycle += 1;
        log_cycle(cycle, reconciler.run_cycle().await);

        if *shutdown.borrow() {
            break;
        }

        log::info!("Waiting {} seconds before next check...", interval.as_secs());
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            // A dropped sender disables this branch; the sleep still runs.
            Ok(()) = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    log::info!("Watcher stopped after {} cycles", cycle);
}

/// Log the outcome of one cycle.
pub fn log_cycle(cycle: u64, result: Result<CycleReport>) {
    match result {
        Ok(report) => {
            let elapsed = report.end_time - report.start_time;
            log::info!(
                "Cycle {} finished in {}ms: {} threads listed ({} new), {}/{} threads fetched, {} new posts, {} delivery failures",
                cycle,
                elapsed.num_milliseconds(),
                report.threads_discovered,
                report.new_threads,
                report.threads_checked - report.thread_failures,
                report.threads_checked,
                report.new_posts,
                report.delivery_failures
            );
        }
        Err(e) => log::error!("Cycle {} failed: {}", cycle, e),
    }
}
