use crate::error::HarvestError;
use crate::tabular::{FlatTable, LongRow, PivotTable, format_timestamp};
use std::io::Write;

/// Write a flat table with its column union as the header row.
///
/// Cells a record lacks are left empty. A table without columns produces an
/// empty file.
pub fn write_flat_table<W: Write>(table: &FlatTable, writer: W) -> Result<(), HarvestError> {
    let mut csv = csv::Writer::from_writer(writer);
    if table.columns().is_empty() {
        csv.flush()?;
        return Ok(());
    }

    csv.write_record(table.columns())?;
    for row in table.rows() {
        csv.write_record(
            table
                .columns()
                .iter()
                .map(|column| row.get(column).map(|v| v.to_cell().into_owned()).unwrap_or_default()),
        )?;
    }

    csv.flush()?;
    Ok(())
}

/// Write long-format rows as `metric,<time_header>,value`.
pub fn write_long_rows<W: Write>(rows: &[LongRow], time_header: &str, writer: W) -> Result<(), HarvestError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["metric", time_header, "value"])?;
    for row in rows {
        let value = row.value.to_cell();
        csv.write_record([row.metric.as_str(), row.timestamp.as_str(), &*value])?;
    }

    csv.flush()?;
    Ok(())
}

/// Write a pivot table as `<time_header>` followed by one column per metric.
pub fn write_pivot<W: Write>(table: &PivotTable, time_header: &str, writer: W) -> Result<(), HarvestError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(core::iter::once(time_header).chain(table.metrics().iter().map(String::as_str)))?;
    for row in table.rows() {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(format_timestamp(row.timestamp));
        record.extend(row.cells.iter().map(|cell| cell.as_ref().map(|v| v.to_cell().into_owned()).unwrap_or_default()));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}
