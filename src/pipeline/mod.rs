//! Pipeline entry points for watcher operations.
//!
//! - `Reconciler::run_cycle`: one discover / merge / fetch / filter / notify / persist pass
//! - `run_watcher`: repeat cycles forever with a sleep in between

pub mod reconcile;
pub mod run;

pub use reconcile::{CycleReport, Reconciler, filter_new};
pub use run::{log_cycle, run_watcher};
