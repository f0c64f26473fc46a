//! Persistence of harvested data as JSON and CSV files
//!
//! The writers here take already-shaped data from [`crate::tabular`] and
//! render it to any [`std::io::Write`]. [`OutputDir`] binds them to the
//! per-run directory layout used by the `fetch` command.
//!
//! Files are written whole; an interrupted run can leave a partial file
//! behind.

mod csv;
mod json;
mod output_dir;

pub use csv::{write_flat_table, write_long_rows, write_pivot};
pub use json::write_pretty;
pub use output_dir::{OutputDir, RUN_STAMP_FORMAT};
