use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use once_cell::sync::OnceCell;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, Listing};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal problems while loading the dataset. Both halt startup.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file is missing, unreadable, or not parseable as a table.
    #[error("dataset unavailable at {}: {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// The table parsed but lacks columns the dashboard relies on.
    #[error("schema mismatch in {}: missing column(s) {}", .path.display(), .missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },
}

impl LoadError {
    fn unavailable(path: &Path, err: anyhow::Error) -> Self {
        LoadError::DataUnavailable {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Columns that must be present in the source file.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "host_name",
    "neighbourhood_group",
    "neighbourhood",
    "latitude",
    "longitude",
    "room_type",
    "price",
    "number_of_reviews",
    "last_review",
];

/// Columns removed right after loading.
pub const DROPPED_COLUMNS: [&str; 3] = ["id", "host_name", "last_review"];

/// Columns that become typed fields of [`Listing`].
const LISTING_COLUMNS: [&str; 8] = [
    "name",
    "neighbourhood_group",
    "neighbourhood",
    "latitude",
    "longitude",
    "room_type",
    "price",
    "number_of_reviews",
];

/// Typed fields that are text; CSV cells in these columns skip type guessing.
const TEXT_COLUMNS: [&str; 4] = ["name", "neighbourhood_group", "neighbourhood", "room_type"];

/// Format-independent intermediate table: header plus typed cells.
#[derive(Debug, Default)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and clean a listings file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the column names (the raw export)
/// * `.json`    – `[{ "id": 2539, "name": "...", ... }, ...]`
/// * `.parquet` – flat columns, as written by pandas or polars
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => Err(anyhow!("unsupported file extension: .{other}")),
    }
    .map_err(|e| LoadError::unavailable(path, e))?;

    let dataset = clean(path, table)?;
    log::info!(
        "Loaded {} listings from {} ({} passthrough columns)",
        dataset.len(),
        path.display(),
        dataset.extra_columns.len()
    );
    Ok(dataset)
}

/// A dataset location plus its load-once cache.
///
/// The first successful [`DatasetSource::load`] reads and cleans the file;
/// later calls hand back the same `Arc`.  Failures are not cached.
#[derive(Debug)]
pub struct DatasetSource {
    path: PathBuf,
    cache: OnceCell<Arc<Dataset>>,
}

impl DatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has already been read.
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn load(&self) -> Result<Arc<Dataset>, LoadError> {
        self.cache
            .get_or_try_init(|| load_file(&self.path).map(Arc::new))
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Cleaning: RawTable → Dataset
// ---------------------------------------------------------------------------

fn clean(path: &Path, table: RawTable) -> Result<Dataset, LoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !table.columns.iter().any(|c| c == *col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }

    let index_of = |name: &str| table.columns.iter().position(|c| c == name).unwrap_or(0);
    let idx = ListingIndices {
        name: index_of("name"),
        neighbourhood_group: index_of("neighbourhood_group"),
        neighbourhood: index_of("neighbourhood"),
        latitude: index_of("latitude"),
        longitude: index_of("longitude"),
        room_type: index_of("room_type"),
        price: index_of("price"),
        number_of_reviews: index_of("number_of_reviews"),
    };

    // Everything that is neither dropped nor a typed field passes through.
    let extra: Vec<(usize, String)> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            !DROPPED_COLUMNS.contains(&c.as_str()) && !LISTING_COLUMNS.contains(&c.as_str())
        })
        .map(|(i, c)| (i, c.clone()))
        .collect();

    let total = table.rows.len();
    let mut listings = Vec::with_capacity(total);

    for (row_no, row) in table.rows.into_iter().enumerate() {
        let listing = build_listing(row, &idx, &extra)
            .with_context(|| format!("row {row_no}"))
            .map_err(|e| LoadError::unavailable(path, e))?;
        match listing {
            Some(l) => listings.push(l),
            None => log::debug!("Dropping row {row_no}: price is zero, negative or missing"),
        }
    }

    log::info!(
        "Kept {} of {total} rows ({} dropped for price <= 0)",
        listings.len(),
        total - listings.len()
    );

    let extra_columns = extra.into_iter().map(|(_, c)| c).collect();
    Ok(Dataset::from_listings(listings, extra_columns))
}

struct ListingIndices {
    name: usize,
    neighbourhood_group: usize,
    neighbourhood: usize,
    latitude: usize,
    longitude: usize,
    room_type: usize,
    price: usize,
    number_of_reviews: usize,
}

/// Returns `Ok(None)` for rows removed by cleaning (price <= 0 or missing).
fn build_listing(
    mut row: Vec<CellValue>,
    idx: &ListingIndices,
    extra: &[(usize, String)],
) -> Result<Option<Listing>> {
    let price = match row.get(idx.price) {
        None | Some(CellValue::Null) => return Ok(None),
        Some(cell) => number(cell, "price")?,
    };
    // `!(price > 0)` also drops NaN.
    if !(price > 0.0) {
        return Ok(None);
    }

    let reviews = number(cell(&row, idx.number_of_reviews), "number_of_reviews")?;
    // 2^64 is the first f64 that no longer fits a u64.
    if !(0.0..u64::MAX as f64).contains(&reviews) || reviews.fract() != 0.0 {
        bail!("number_of_reviews: {reviews} is not a non-negative integer");
    }

    let mut extra_cells = BTreeMap::new();
    for (i, col) in extra {
        let value = row.get_mut(*i).map(std::mem::take).unwrap_or_default();
        extra_cells.insert(col.clone(), value);
    }

    Ok(Some(Listing {
        name: match cell(&row, idx.name) {
            CellValue::Null => String::new(),
            other => other.to_string(),
        },
        neighbourhood_group: text(cell(&row, idx.neighbourhood_group), "neighbourhood_group")?,
        neighbourhood: text(cell(&row, idx.neighbourhood), "neighbourhood")?,
        latitude: number(cell(&row, idx.latitude), "latitude")?,
        longitude: number(cell(&row, idx.longitude), "longitude")?,
        room_type: text(cell(&row, idx.room_type), "room_type")?,
        price,
        number_of_reviews: reviews as u64,
        extra: extra_cells,
    }))
}

fn cell(row: &[CellValue], i: usize) -> &CellValue {
    row.get(i).unwrap_or(&CellValue::Null)
}

fn number(cell: &CellValue, col: &str) -> Result<f64> {
    match cell {
        CellValue::Null => bail!("{col}: missing value"),
        CellValue::String(s) => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{col}: '{s}' is not a number")),
        other => other
            .as_f64()
            .with_context(|| format!("{col}: '{other}' is not a number")),
    }
}

fn text(cell: &CellValue, col: &str) -> Result<String> {
    match cell {
        CellValue::Null => bail!("{col}: missing value"),
        other => Ok(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let is_text: Vec<bool> = columns
        .iter()
        .map(|c| TEXT_COLUMNS.contains(&c.as_str()))
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = record
            .iter()
            .zip(&is_text)
            .map(|(raw, &text)| match (text, raw.is_empty()) {
                (true, true) => CellValue::Null,
                (true, false) => CellValue::String(raw.to_string()),
                (false, _) => CellValue::guess(raw),
            })
            .collect();
        rows.push(cells);
    }

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": 2539, "name": "Clean & quiet apt home by the park", "price": 149, ... },
///   ...
/// ]
/// ```
///
/// Columns are taken in first-seen order; a key missing from a record is null.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file (one scalar column per field).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_to_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_to_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| CellValue::String(s.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        // Dates, dictionaries, ... are kept as their display text.
        _ => Some(CellValue::String(
            array_value_to_string(col, row).context("formatting parquet cell")?,
        )),
    };
    value.with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}
