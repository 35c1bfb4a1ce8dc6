//! Refresh orchestration and the background refresh loop.

pub mod orchestrator;
pub mod scheduler;

pub use orchestrator::{RefreshOutcome, Refresher};
pub use scheduler::RefreshScheduler;
