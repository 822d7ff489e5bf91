//! Pipeline entry points for watcher operations.
//!
//! - `run_cycle`: one fetch→parse→filter→dedup→notify→persist pass
//! - `Watcher`: the indefinite scheduling loop around it

pub mod cycle;
pub mod watch;

pub use cycle::{CycleContext, CycleError, CycleOutcome, run_cycle};
pub use watch::Watcher;
