use super::{LongRow, Scalar};
use crate::error::HarvestError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Rendering used for normalized timestamps in pivot output.
const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S+00:00";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// A wide table: one row per distinct timestamp, one column per distinct metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotTable {
    metrics: Vec<String>,
    rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    pub timestamp: DateTime<Utc>,

    /// One cell per metric column; `None` where no observation exists.
    pub cells: Vec<Option<Scalar>>,
}

impl PivotTable {
    /// Metric column names in first-seen order.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Rows in ascending timestamp order.
    #[must_use]
    pub fn rows(&self) -> &[PivotRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up the cell for a (timestamp, metric) pair.
    #[must_use]
    pub fn get(&self, timestamp: DateTime<Utc>, metric: &str) -> Option<&Scalar> {
        let column = self.metrics.iter().position(|m| m == metric)?;
        let row = self.rows.binary_search_by_key(&timestamp, |r| r.timestamp).ok()?;
        self.rows[row].cells[column].as_ref()
    }

    /// Expand back into long rows, row by row, skipping empty cells.
    ///
    /// Timestamps come back in their canonical rendering.
    #[must_use]
    pub fn unpivot(&self) -> Vec<LongRow> {
        self.rows
            .iter()
            .flat_map(|row| {
                let timestamp = format_timestamp(row.timestamp);
                self.metrics.iter().zip(&row.cells).filter_map(move |(metric, cell)| {
                    cell.as_ref().map(|value| LongRow {
                        metric: metric.clone(),
                        timestamp: timestamp.clone(),
                        value: value.clone(),
                    })
                })
            })
            .collect()
    }
}

/// Pivot long rows into a wide table keyed by normalized timestamp.
///
/// # Errors
///
/// Fails with [`HarvestError::Collision`] when two rows share a normalized
/// timestamp and metric, and with [`HarvestError::DataShape`] when a timestamp
/// cannot be parsed.
pub fn pivot(rows: &[LongRow]) -> Result<PivotTable, HarvestError> {
    let mut metrics: Vec<String> = Vec::new();
    let mut columns: HashMap<&str, usize> = HashMap::new();
    let mut grid: BTreeMap<DateTime<Utc>, HashMap<usize, &Scalar>> = BTreeMap::new();

    for row in rows {
        let timestamp = normalize_timestamp(&row.timestamp)?;

        let column = *columns.entry(row.metric.as_str()).or_insert_with(|| {
            metrics.push(row.metric.clone());
            metrics.len() - 1
        });

        if grid.entry(timestamp).or_default().insert(column, &row.value).is_some() {
            return Err(HarvestError::Collision {
                timestamp: format_timestamp(timestamp),
                metric: row.metric.clone(),
            });
        }
    }

    let rows = grid
        .into_iter()
        .map(|(timestamp, mut cells)| PivotRow {
            timestamp,
            cells: (0..metrics.len()).map(|column| cells.remove(&column).cloned()).collect(),
        })
        .collect();

    Ok(PivotTable { metrics, rows })
}

/// Parse an observation time into a UTC instant.
///
/// Accepts RFC 3339, the Graph API's `2024-01-01T08:00:00+0000` form, naive
/// date-times and dates (taken as UTC), and integral unix seconds.
///
/// # Errors
///
/// Fails with [`HarvestError::DataShape`] for anything else.
pub fn normalize_timestamp(text: &str) -> Result<DateTime<Utc>, HarvestError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    if let Ok(secs) = text.parse::<i64>()
        && let Some(dt) = DateTime::from_timestamp(secs, 0)
    {
        return Ok(dt);
    }

    Err(HarvestError::data_shape("timestamp", format!("unrecognized timestamp '{text}'")))
}

/// Render a normalized timestamp the way pivot output shows it.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(CANONICAL_FORMAT).to_string()
}
