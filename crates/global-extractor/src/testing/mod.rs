//! Test orchestration: hand the harness to an external runtime and read back
//! the per-provider results it writes.

pub mod results;
pub mod runner;

pub use results::{TestResults, TestStatus};
pub use runner::{NodeRunner, TestOrchestrator, TestRunner};
