//! Global extractor builder.
//!
//! Collects per-provider stream extractor snippets into one distributable
//! script, tests the result with an external runtime, and rebuilds a
//! known-good variant from the providers that passed.

pub mod assembly;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod region;
pub mod report;
pub mod testing;

pub use config::BuildConfig;
pub use error::{BuildError, Result};
pub use extraction::{ExtractorRecord, ProviderFilter};
pub use pipeline::Pipeline;
