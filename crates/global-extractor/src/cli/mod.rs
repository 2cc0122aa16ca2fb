//! CLI subcommand implementations for the `global-extractor` binary.

pub mod build_cmd;
pub mod doctor;
pub mod output;
pub mod run_cmd;
pub mod test_cmd;
