//! Flat-file data store
//!
//! Every read goes straight to disk: CSV price series, per-company datasets,
//! the precomputed predictions table and the JSON metric files. Nothing is
//! cached between calls.


use crate::config::PathsConfig;
use crate::error::{ForecastError, Result};
use crate::types::{FeatureRow, PriceRow};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One CSV row as a JSON object keyed by header name
pub type Record = Map<String, Value>;

/// Numeric columns of a feature dataset indexed by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }
}

/// Resolves and reads the files behind the API and the trainers
#[derive(Debug, Clone)]
pub struct DataStore {
    paths: PathsConfig,
}

impl DataStore {
    pub fn new(paths: PathsConfig) -> Self {
        Self { paths }
    }

    /// Path of `<company>.csv`, failing when the name is unsafe or the file is absent
    pub fn company_path(&self, company: &str) -> Result<PathBuf> {
        let filename = format!("{company}.csv");
        let not_found = || ForecastError::NotFound(format!("Company data file not found: {filename}"));

        if company.is_empty() || company.contains(['/', '\\']) || company.contains("..") {
            return Err(not_found());
        }

        let path = self.paths.data_dir().join(&filename);
        if !path.exists() {
            return Err(not_found());
        }
        Ok(path)
    }

    /// All rows of a company CSV
    pub fn company_records(&self, company: &str) -> Result<Vec<Record>> {
        let path = self.company_path(company)?;
        read_records(&path, 0)
    }

    /// The full feature dataset as served to the frontend
    pub fn dataset_records(&self) -> Result<Vec<Record>> {
        read_records(&self.paths.dataset_path(), self.paths.dataset_metadata_rows)
    }

    /// The precomputed predictions table
    pub fn prediction_records(&self) -> Result<Vec<Record>> {
        read_records(&self.paths.predictions_path(), 0)
    }

    /// Last modification time of the predictions table
    pub fn predictions_modified(&self) -> Result<DateTime<Utc>> {
        modified_at(&self.paths.predictions_path())
    }

    /// Feature dataset as numeric columns for training
    pub fn feature_frame(&self) -> Result<FeatureFrame> {
        read_feature_frame(&self.paths.dataset_path())
    }
}

/// Read a CSV into JSON records, skipping `skip_rows` rows below the header
///
/// NaN and infinite cells become `null`, matching what the JSON encoder
/// would reject anyway.
pub fn read_records(path: &Path, skip_rows: usize) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut records = Vec::new();
    for result in reader.records().skip(skip_rows) {
        let row = result?;
        let mut record = Map::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let value = row.get(i).map(parse_cell).unwrap_or(Value::Null);
            record.insert(header.clone(), value);
        }
        records.push(record);
    }

    debug!(path = %path.display(), rows = records.len(), "read csv records");
    Ok(records)
}

/// Cell texts read as missing values, besides the empty cell
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Interpret a raw CSV cell as a JSON value
pub fn parse_cell(raw: &str) -> Value {
    let cell = raw.trim();
    if cell.is_empty() || NA_TOKENS.contains(&cell) {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(i.into());
    }
    match cell.parse::<f64>() {
        Ok(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Err(_) => Value::String(cell.to_string()),
    }
}

/// Parse the leading `YYYY-MM-DD` of a date or timestamp string
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    s.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Parse a numeric cell; blanks and text become NaN, infinities are kept
fn parse_float(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Read a dataset whose first column is the date index
///
/// Rows whose index does not parse as a date (provider metadata lines) are
/// dropped.
pub fn read_feature_frame(path: &Path) -> Result<FeatureFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.len() < 2 {
        return Err(ForecastError::InvalidData(format!(
            "{} has no data columns",
            path.display()
        )));
    }

    let mut frame = FeatureFrame {
        dates: Vec::new(),
        columns: headers[1..].iter().map(|h| (h.clone(), Vec::new())).collect(),
    };

    let mut skipped = 0usize;
    for result in reader.records() {
        let row = result?;
        let Some(date) = row.get(0).and_then(parse_date) else {
            skipped += 1;
            continue;
        };
        frame.dates.push(date);
        for (i, (_, values)) in frame.columns.iter_mut().enumerate() {
            values.push(row.get(i + 1).map(parse_float).unwrap_or(f64::NAN));
        }
    }

    debug!(
        path = %path.display(),
        rows = frame.len(),
        skipped,
        "read feature frame"
    );
    Ok(frame)
}

/// Read OHLCV rows, skipping lines that are not valid bars
pub fn read_price_rows(path: &Path) -> Result<Vec<PriceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let index_of = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| ForecastError::InvalidData(format!("missing column {name}")))
    };
    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date") || h.eq_ignore_ascii_case("price"))
        .unwrap_or(0);
    let open = index_of("Open")?;
    let high = index_of("High")?;
    let low = index_of("Low")?;
    let close = index_of("Close")?;
    let volume = index_of("Volume")?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |i: usize| record.get(i).map(parse_float).unwrap_or(f64::NAN);
        let Some(date) = record.get(date_idx).and_then(parse_date) else {
            continue;
        };
        let row = PriceRow {
            date,
            open: field(open),
            high: field(high),
            low: field(low),
            close: field(close),
            volume: field(volume),
        };
        if row.close.is_finite() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Write derived feature rows as a dataset CSV
pub fn write_feature_rows(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read any JSON document
pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// File modification time in UTC
pub fn modified_at(path: &Path) -> Result<DateTime<Utc>> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified))
}
