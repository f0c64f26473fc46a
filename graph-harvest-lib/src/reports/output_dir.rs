use super::{write_flat_table, write_long_rows, write_pivot, write_pretty};
use crate::error::HarvestError;
use crate::tabular::{FlatTable, LongRow, PivotTable};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;

const LOG_TARGET: &str = "output";

/// Format of the per-run directory name.
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The `<root>/<platform>/<YYYYMMDD_HHMMSS>/` directory one run writes into.
#[derive(Debug, Clone)]
pub struct OutputDir {
    path: Utf8PathBuf,
}

impl OutputDir {
    /// Create (if needed) the run directory for `platform` stamped with `started`.
    pub fn create<Tz: TimeZone>(root: &Utf8Path, platform: &str, started: &DateTime<Tz>) -> Result<Self, HarvestError>
    where
        Tz::Offset: core::fmt::Display,
    {
        let path = root.join(platform).join(started.format(RUN_STAMP_FORMAT).to_string());
        fs::create_dir_all(&path)?;
        log::debug!(target: LOG_TARGET, "Created output directory '{path}'");
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[must_use]
    pub fn file(&self, name: &str) -> Utf8PathBuf {
        self.path.join(name)
    }

    pub fn save_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<Utf8PathBuf, HarvestError> {
        let path = self.file(name);
        write_pretty(value, BufWriter::new(File::create(&path)?))?;
        log::debug!(target: LOG_TARGET, "Wrote '{path}'");
        Ok(path)
    }

    pub fn save_flat_table(&self, name: &str, table: &FlatTable) -> Result<Utf8PathBuf, HarvestError> {
        let path = self.file(name);
        write_flat_table(table, BufWriter::new(File::create(&path)?))?;
        log::debug!(target: LOG_TARGET, "Wrote '{path}' ({} rows)", table.rows().len());
        Ok(path)
    }

    pub fn save_long_rows(&self, name: &str, rows: &[LongRow], time_header: &str) -> Result<Utf8PathBuf, HarvestError> {
        let path = self.file(name);
        write_long_rows(rows, time_header, BufWriter::new(File::create(&path)?))?;
        log::debug!(target: LOG_TARGET, "Wrote '{path}' ({} rows)", rows.len());
        Ok(path)
    }

    pub fn save_pivot(&self, name: &str, table: &PivotTable, time_header: &str) -> Result<Utf8PathBuf, HarvestError> {
        let path = self.file(name);
        write_pivot(table, time_header, BufWriter::new(File::create(&path)?))?;
        log::debug!(target: LOG_TARGET, "Wrote '{path}' ({} rows)", table.rows().len());
        Ok(path)
    }
}
