use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{StartupDataset, StartupRecord};

/// Relative path of the dataset loaded at startup.
pub const DEFAULT_DATA_PATH: &str = "cleaned_investments.csv";

/// Columns every source file must provide. Missing one is a structural
/// failure; the optional columns (funding_rounds, homepage_url) merely
/// toggle their views off.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "name",
    "market",
    "country_code",
    "status",
    "founded_year",
    "funding_total_usd",
];

/// A required column is missing from the source file.
#[derive(Debug, Error)]
#[error("missing required column '{column}'")]
pub struct SchemaError {
    pub column: &'static str,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a startup dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names (the canonical input)
/// * `.json`    – `[{ "name": ..., "market": ..., ... }, ...]`
/// * `.parquet` – flat columns, one per field
pub fn load_file(path: &Path) -> Result<StartupDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// The dataset at [`DEFAULT_DATA_PATH`], loaded at most once per process.
///
/// The first successful load is held in a `OnceLock`; later calls return the
/// same in-memory dataset without touching the file again. A failed load is
/// not cached, so the caller decides whether the failure is fatal.
pub fn load_default() -> Result<&'static StartupDataset> {
    static DATASET: OnceLock<StartupDataset> = OnceLock::new();

    if let Some(ds) = DATASET.get() {
        return Ok(ds);
    }
    let dataset = load_file(Path::new(DEFAULT_DATA_PATH))
        .with_context(|| format!("loading '{DEFAULT_DATA_PATH}'"))?;
    Ok(DATASET.get_or_init(|| dataset))
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Parse a founded-year cell. Unparseable or negative values normalize to 0
/// rather than failing the load. Accepts float-formatted cells ("2010.0").
pub fn coerce_year(cell: &str) -> i32 {
    let cell = cell.trim();
    cell.parse::<i32>()
        .ok()
        .or_else(|| cell.parse::<f64>().ok().map(|f| f as i32))
        .filter(|y| *y >= 0)
        .unwrap_or(0)
}

/// Parse a funding cell with the same fallback-to-zero policy; negative
/// values also normalize to 0.
pub fn coerce_funding(cell: &str) -> f64 {
    cell.trim().parse::<f64>().map(|v| v.max(0.0)).unwrap_or(0.0)
}

fn non_empty(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty()).then(|| cell.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. Header names are
/// whitespace-trimmed before matching, so `" market "` still binds.
fn load_csv(path: &Path) -> Result<StartupDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &'static str| -> Result<usize, SchemaError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(SchemaError { column: name })
    };

    let name_idx = column("name")?;
    let market_idx = column("market")?;
    let country_idx = column("country_code")?;
    let status_idx = column("status")?;
    let year_idx = column("founded_year")?;
    let funding_idx = column("funding_total_usd")?;
    let rounds_idx = headers.iter().position(|h| h == "funding_rounds");
    let url_idx = headers.iter().position(|h| h == "homepage_url");

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

        records.push(StartupRecord {
            name: cell(name_idx).to_string(),
            market: cell(market_idx).to_string(),
            country_code: cell(country_idx).to_string(),
            status: cell(status_idx).to_string(),
            founded_year: coerce_year(cell(year_idx)),
            funding_total_usd: coerce_funding(cell(funding_idx)),
            funding_rounds: rounds_idx.and_then(|i| cell(i).parse::<u32>().ok()),
            homepage_url: url_idx.and_then(|i| non_empty(cell(i))),
        });
    }

    Ok(StartupDataset::from_records(
        records,
        rounds_idx.is_some(),
        url_idx.is_some(),
    ))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "name": "Acme",
///     "market": "software",
///     "country_code": "USA",
///     "status": "operating",
///     "founded_year": 2010,
///     "funding_total_usd": 2000000,
///     "funding_rounds": 3,
///     "homepage_url": "http://www.acme.com"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<StartupDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut has_rounds = false;
    let mut has_url = false;
    let mut seen_required = [false; REQUIRED_COLUMNS.len()];
    let mut records = Vec::with_capacity(rows.len());

    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for (c, col) in REQUIRED_COLUMNS.iter().enumerate() {
            seen_required[c] |= obj.contains_key(*col);
        }
        has_rounds |= obj.contains_key("funding_rounds");
        has_url |= obj.contains_key("homepage_url");

        records.push(StartupRecord {
            name: json_text(obj.get("name")),
            market: json_text(obj.get("market")),
            country_code: json_text(obj.get("country_code")),
            status: json_text(obj.get("status")),
            founded_year: json_year(obj.get("founded_year")),
            funding_total_usd: json_funding(obj.get("funding_total_usd")),
            funding_rounds: obj.get("funding_rounds").and_then(json_u32),
            homepage_url: obj
                .get("homepage_url")
                .and_then(|v| v.as_str())
                .and_then(non_empty),
        });
    }

    if !rows.is_empty() {
        for (c, col) in REQUIRED_COLUMNS.iter().enumerate() {
            if !seen_required[c] {
                return Err(SchemaError { column: *col }.into());
            }
        }
    }

    Ok(StartupDataset::from_records(records, has_rounds, has_url))
}

fn json_text(val: Option<&JsonValue>) -> String {
    val.and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_string()
}

fn json_year(val: Option<&JsonValue>) -> i32 {
    match val {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .map(|i| i as i32)
            .or_else(|| n.as_f64().map(|f| f as i32))
            .filter(|y| *y >= 0)
            .unwrap_or(0),
        Some(JsonValue::String(s)) => coerce_year(s),
        _ => 0,
    }
}

fn json_funding(val: Option<&JsonValue>) -> f64 {
    match val {
        Some(JsonValue::Number(n)) => n.as_f64().map(|v| v.max(0.0)).unwrap_or(0.0),
        Some(JsonValue::String(s)) => coerce_funding(s),
        _ => 0.0,
    }
}

fn json_u32(val: &JsonValue) -> Option<u32> {
    match val {
        JsonValue::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); string, int, and float columns are
/// accepted for the numeric fields and coerced with the usual fallback.
fn load_parquet(path: &Path) -> Result<StartupDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut has_rounds = false;
    let mut has_url = false;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &'static str| -> Result<usize, SchemaError> {
            schema.index_of(name).map_err(|_| SchemaError { column: name })
        };
        let name_idx = column("name")?;
        let market_idx = column("market")?;
        let country_idx = column("country_code")?;
        let status_idx = column("status")?;
        let year_idx = column("founded_year")?;
        let funding_idx = column("funding_total_usd")?;
        let rounds_idx = schema.index_of("funding_rounds").ok();
        let url_idx = schema.index_of("homepage_url").ok();
        has_rounds |= rounds_idx.is_some();
        has_url |= url_idx.is_some();

        for row in 0..batch.num_rows() {
            records.push(StartupRecord {
                name: string_cell(batch.column(name_idx), row),
                market: string_cell(batch.column(market_idx), row),
                country_code: string_cell(batch.column(country_idx), row),
                status: string_cell(batch.column(status_idx), row),
                founded_year: int_cell(batch.column(year_idx), row)
                    .and_then(|y| i32::try_from(y).ok())
                    .filter(|y| *y >= 0)
                    .unwrap_or(0),
                funding_total_usd: float_cell(batch.column(funding_idx), row)
                    .map(|v| v.max(0.0))
                    .unwrap_or(0.0),
                funding_rounds: rounds_idx
                    .and_then(|i| int_cell(batch.column(i), row))
                    .and_then(|v| u32::try_from(v).ok()),
                homepage_url: url_idx.map(|i| string_cell(batch.column(i), row)).and_then(|s| non_empty(&s)),
            });
        }
    }

    Ok(StartupDataset::from_records(records, has_rounds, has_url))
}

// -- Arrow cell helpers --

/// Extract a string cell; nulls and non-string columns read as empty.
fn string_cell(col: &ArrayRef, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).trim().to_string())
            .unwrap_or_default(),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).trim().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Extract an integer cell from int, float, or string columns.
fn int_cell(col: &ArrayRef, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as i64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as i64),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row) as i64),
        DataType::Utf8 | DataType::LargeUtf8 => string_cell(col, row).parse().ok(),
        _ => None,
    }
}

/// Extract a float cell from float, int, or string columns.
fn float_cell(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Int32 | DataType::Int64 => int_cell(col, row).map(|v| v as f64),
        DataType::Utf8 | DataType::LargeUtf8 => string_cell(col, row).parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn year_coercion_falls_back_to_zero() {
        assert_eq!(coerce_year("2010"), 2010);
        assert_eq!(coerce_year("2010.0"), 2010);
        assert_eq!(coerce_year(" 1999 "), 1999);
        assert_eq!(coerce_year("unknown"), 0);
        assert_eq!(coerce_year(""), 0);
        assert_eq!(coerce_year("-5"), 0);
    }

    #[test]
    fn funding_coercion_falls_back_to_zero() {
        assert_eq!(coerce_funding("1500000"), 1_500_000.0);
        assert_eq!(coerce_funding("2.5e6"), 2_500_000.0);
        assert_eq!(coerce_funding("n/a"), 0.0);
        assert_eq!(coerce_funding(""), 0.0);
        assert_eq!(coerce_funding("-100"), 0.0);
    }

    #[test]
    fn csv_load_trims_headers_and_sets_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("investments.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, " name ,market,country_code,status, founded_year ,funding_total_usd").unwrap();
        writeln!(f, "Acme,software,USA,operating,2010,2000000").unwrap();
        writeln!(f, "Bit,biotech,GBR,acquired,bad-year,not-a-number").unwrap();
        drop(f);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(!ds.has_funding_rounds);
        assert!(!ds.has_homepage_url);
        assert_eq!(ds.records[0].founded_year, 2010);
        assert_eq!(ds.records[1].founded_year, 0);
        assert_eq!(ds.records[1].funding_total_usd, 0.0);
    }

    #[test]
    fn csv_missing_required_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "name,market,country_code,founded_year,funding_total_usd\n").unwrap();

        let err = load_file(&path).unwrap_err();
        let schema = err.downcast_ref::<SchemaError>().expect("schema error");
        assert_eq!(schema.column, "status");
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        assert!(load_file(Path::new("investments.xlsx")).is_err());
    }

    #[test]
    fn json_load_coerces_mixed_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("investments.json");
        std::fs::write(
            &path,
            r#"[
                {"name":"Acme","market":"software","country_code":"USA","status":"operating",
                 "founded_year":2010,"funding_total_usd":2000000,
                 "funding_rounds":3,"homepage_url":"http://www.acme.com"},
                {"name":"Bit","market":"biotech","country_code":"GBR","status":"acquired",
                 "founded_year":"2008.0","funding_total_usd":"oops",
                 "funding_rounds":null,"homepage_url":""}
            ]"#,
        )
        .unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.has_funding_rounds);
        assert!(ds.has_homepage_url);
        assert_eq!(ds.records[0].funding_rounds, Some(3));
        assert_eq!(ds.records[1].founded_year, 2008);
        assert_eq!(ds.records[1].funding_total_usd, 0.0);
        assert_eq!(ds.records[1].funding_rounds, None);
        assert_eq!(ds.records[1].homepage_url, None);
    }
}
