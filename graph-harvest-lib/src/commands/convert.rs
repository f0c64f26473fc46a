use super::Host;
use super::common::{LoggingArgs, init_logging};
use crate::Result;
use crate::reports::{write_flat_table, write_long_rows, write_pivot};
use crate::tabular::{DEFAULT_SEPARATOR, FlatTable, extract_series, flatten, pivot};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use ohno::{IntoAppError, bail};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};

const LOG_TARGET: &str = "convert";

/// Column header for the time field of converted insights.
const TIME_HEADER: &str = "end_time";

/// How a saved JSON document is turned into CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConvertKind {
    /// Flatten the whole document into a single row
    Record,

    /// Extract the metric series into long and pivoted tables
    Insights,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// JSON file to convert
    #[arg(value_name = "JSON")]
    pub input: Utf8PathBuf,

    /// Shape of the document
    #[arg(long, value_name = "KIND", default_value = "record")]
    pub kind: ConvertKind,

    /// Directory to write the CSV files into
    #[arg(long, value_name = "DIR", default_value = "data/processed")]
    pub output_dir: Utf8PathBuf,

    /// Separator placed between nested key segments
    #[arg(long, value_name = "SEP", default_value = DEFAULT_SEPARATOR)]
    pub separator: String,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

pub fn convert_json<H: Host>(host: &mut H, args: &ConvertArgs) -> Result<()> {
    init_logging(&args.logging)?;

    if args.separator.is_empty() {
        bail!("the key separator must not be empty");
    }

    let _ = writeln!(host.output(), "Processing {} from: {}", label(args.kind), args.input);

    let text = fs::read_to_string(&args.input).into_app_err_with(|| format!("reading '{}'", args.input))?;
    let document: Value = serde_json::from_str(&text).into_app_err_with(|| format!("parsing '{}' as JSON", args.input))?;

    fs::create_dir_all(&args.output_dir).into_app_err_with(|| format!("creating output directory '{}'", args.output_dir))?;
    let stem = args.input.file_stem().unwrap_or("converted");

    match args.kind {
        ConvertKind::Record => convert_record(host, &document, stem, args),
        ConvertKind::Insights => convert_insights(host, &document, stem, args),
    }
}

const fn label(kind: ConvertKind) -> &'static str {
    match kind {
        ConvertKind::Record => "record data",
        ConvertKind::Insights => "insights",
    }
}

fn convert_record<H: Host>(host: &mut H, document: &Value, stem: &str, args: &ConvertArgs) -> Result<()> {
    let record = flatten(document, "", &args.separator).into_app_err_with(|| format!("flattening '{}'", args.input))?;
    let table = FlatTable::from_records(vec![record]);

    let path = args.output_dir.join(format!("{stem}_processed.csv"));
    write_flat_table(&table, create(&path)?).into_app_err_with(|| format!("writing '{path}'"))?;
    log::debug!(target: LOG_TARGET, "Flattened '{}' into {} columns", args.input, table.columns().len());

    let _ = writeln!(host.output(), "Data saved to: {path}");
    let _ = writeln!(host.output(), "Columns: {}", table.columns().join(", "));
    Ok(())
}

fn convert_insights<H: Host>(host: &mut H, document: &Value, stem: &str, args: &ConvertArgs) -> Result<()> {
    if document.get("data").is_none() {
        let _ = writeln!(host.output(), "No 'data' field found in {}", args.input);
        return Ok(());
    }

    let rows = extract_series(document).into_app_err_with(|| format!("reading metric series from '{}'", args.input))?;

    let path = args.output_dir.join(format!("{stem}_insights_processed.csv"));
    write_long_rows(&rows, TIME_HEADER, create(&path)?).into_app_err_with(|| format!("writing '{path}'"))?;
    let _ = writeln!(host.output(), "Insights saved to: {path}");
    let _ = writeln!(host.output(), "Columns: metric, {TIME_HEADER}, value");

    let table = pivot(&rows).into_app_err_with(|| format!("pivoting metric series from '{}'", args.input))?;
    let pivot_path = args.output_dir.join(format!("{stem}_insights_pivot_processed.csv"));
    write_pivot(&table, TIME_HEADER, create(&pivot_path)?).into_app_err_with(|| format!("writing '{pivot_path}'"))?;
    let _ = writeln!(host.output(), "Pivot data saved to: {pivot_path}");

    Ok(())
}

fn create(path: &Utf8Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path).into_app_err_with(|| format!("creating '{path}'"))?))
}
