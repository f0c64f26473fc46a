//! Per-platform harvesting logic
//!
//! Each platform implements [`Platform`]: it knows which resources to request
//! and how its metadata and listings are laid out as CSV files. The parts every
//! platform shares (the raw JSON dump and the daily insights tables) live in
//! [`save_data`].
//!
//! A [`HarvestError::DataShape`] raised while tabulating one section only skips
//! that section; every other error aborts the save.

mod facebook;
mod instagram;

pub use facebook::Facebook;
pub use instagram::Instagram;

use crate::error::HarvestError;
use crate::graph::{Fetch, TimeWindow};
use crate::reports::OutputDir;
use crate::tabular::{FlatRecord, FlatTable, extract_series, normalize, pivot};
use clap::ValueEnum;
use core::future::Future;
use serde_json::{Map, Value};
use strum::{EnumIter, IntoStaticStr};

const LOG_TARGET: &str = "harvest";

/// Column header for the time field of the insights tables.
const INSIGHTS_TIME_HEADER: &str = "date";

/// The platforms a harvest can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum PlatformKind {
    /// Facebook page
    Facebook,

    /// Instagram business account
    Instagram,
}

impl PlatformKind {
    /// Lowercase name used in file and directory names.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
        }
    }
}

/// A source of page or account data on the Graph API.
pub trait Platform: Sync {
    fn kind(&self) -> PlatformKind;

    /// Fetch everything this platform harvests, keyed by section name.
    ///
    /// The map always holds an `insights_data` section next to the
    /// platform's own metadata and listing sections.
    fn get_insights<F: Fetch + Sync>(
        &self,
        fetcher: &F,
        window: TimeWindow,
    ) -> impl Future<Output = Result<Map<String, Value>, HarvestError>> + Send;

    /// Write the platform's metadata and listing tables into `out`.
    fn save_platform_specific_data(&self, data: &Map<String, Value>, out: &OutputDir) -> Result<(), HarvestError>;
}

/// Persist one harvest: the raw document, the insights tables, then the platform's own tables.
pub fn save_data<P: Platform>(platform: &P, data: &Map<String, Value>, out: &OutputDir) -> Result<(), HarvestError> {
    let result = save_sections(platform, data, out);
    match &result {
        Ok(()) => log::info!(target: LOG_TARGET, "Data saved successfully in {}", out.path()),
        Err(e) => log::error!(target: LOG_TARGET, "Error saving data: {e}"),
    }

    result
}

fn save_sections<P: Platform>(platform: &P, data: &Map<String, Value>, out: &OutputDir) -> Result<(), HarvestError> {
    let name = platform.kind().name();
    let _ = out.save_json(&format!("{name}_raw_data.json"), data)?;

    if let Some(insights) = data.get("insights_data") {
        skip_malformed("insights", save_insights(name, insights, out))?;
    }

    platform.save_platform_specific_data(data, out)
}

fn save_insights(name: &str, insights: &Value, out: &OutputDir) -> Result<(), HarvestError> {
    let rows = extract_series(insights)?;
    if rows.is_empty() {
        log::info!(target: LOG_TARGET, "No insights data to tabulate");
        return Ok(());
    }

    let _ = out.save_long_rows(&format!("{name}_daily_insights.csv"), &rows, INSIGHTS_TIME_HEADER)?;
    let table = pivot(&rows)?;
    let _ = out.save_pivot(&format!("{name}_daily_insights_pivot.csv"), &table, INSIGHTS_TIME_HEADER)?;
    Ok(())
}

/// Downgrade a section-local failure to a warning so the remaining sections still get written.
pub(crate) fn skip_malformed(section: &str, result: Result<(), HarvestError>) -> Result<(), HarvestError> {
    match result {
        Err(e) if e.is_section_local() => {
            log::warn!(target: LOG_TARGET, "Skipping {section}: {e}");
            Ok(())
        }
        other => other,
    }
}

/// Flatten a single metadata object into a one-row table.
pub(crate) fn flatten_object(value: &Value, path: &str, separator: &str) -> Result<FlatTable, HarvestError> {
    if !value.is_object() {
        return Err(HarvestError::data_shape(path, "expected an object"));
    }

    Ok(FlatTable::from_records(vec![normalize(value, separator)?]))
}

/// Flatten the `data` array of a listing, one row per element.
///
/// Nested arrays such as a post's `insights.data` stay in a single column.
/// Returns `None` when the listing has no `data` key.
pub(crate) fn flatten_listing(listing: &Value, path: &str, separator: &str) -> Result<Option<FlatTable>, HarvestError> {
    let Some(data) = listing.get("data") else {
        return Ok(None);
    };

    let Value::Array(items) = data else {
        return Err(HarvestError::data_shape(format!("{path}.data"), "expected an array"));
    };

    let records = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if item.is_object() {
                normalize(item, separator)
            } else {
                Err(HarvestError::data_shape(format!("{path}.data[{i}]"), "expected an object"))
            }
        })
        .collect::<Result<Vec<FlatRecord>, _>>()?;

    Ok(Some(FlatTable::from_records(records)))
}
