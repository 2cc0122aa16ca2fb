//! Template assembly for the global extractor.
//!
//! Splices the built bundle into `global_extractor_scheme.js`, writes the
//! test harness, then writes exactly one distributable: the known-good file
//! for filtered passes or the all-inclusive file for unfiltered ones.

pub mod template;

pub use template::{assemble, Assembled, Variant};
