//! README status table.

pub mod table;

pub use table::{render_table, splice_table, update_readme};
