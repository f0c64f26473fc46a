//! Reshaping of nested Graph API responses into flat tables
//!
//! Everything in this module is a pure function of one JSON value: nothing
//! here touches the network or the filesystem.
//!
//! # Implementation Model
//!
//! Two reshaping paths are provided:
//!
//! - [`flatten`] turns any nested object into a [`FlatRecord`], joining object
//!   keys and record-array indices into composite column names. Several records
//!   (one per post, for example) are combined into a [`FlatTable`] whose columns
//!   are the union of their keys.
//! - [`normalize`] is the shallower variant used for harvested metadata and
//!   listings: it only joins object keys and keeps every array as one value,
//!   so the columns do not depend on how many entries an array holds.
//! - [`extract_series`] recognizes the insights shape
//!   (`data[].name` + `data[].values[]`) and produces long-format [`LongRow`]s,
//!   which [`pivot`] turns into a [`PivotTable`] with one row per timestamp and
//!   one column per metric.
//!
//! Values are carried as [`Scalar`]s, so a flat record can never hold a container.

mod flat_record;
mod flatten;
mod pivot;
mod repr;
mod scalar;
mod series;

pub use flat_record::{FlatRecord, FlatTable};
pub use flatten::{DEFAULT_SEPARATOR, flatten, normalize};
pub use pivot::{PivotRow, PivotTable, format_timestamp, normalize_timestamp, pivot};
pub use scalar::Scalar;
pub use series::{LongRow, extract_series};
