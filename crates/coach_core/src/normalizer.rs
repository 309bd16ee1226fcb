//! crates/coach_core/src/normalizer.rs
//!
//! Turns uploaded tabular data into the fixed shapes the coach backend expects.
//!
//! Health rows arrive as `(date, metric, value)` triples and are pivoted into one
//! `HealthRecord` per date. Workout rows are validated one by one. In both cases a
//! bad row is reported with its 1-based data row number and the offending column,
//! and the remaining rows are still processed. Only a file that lacks required
//! headers (or cannot be read at all) fails as a whole.
//!
//! Health rows whose metric is not recognized are dropped without being reported,
//! while workout rows with an unknown category are reported.

use crate::domain::{HealthRecord, WorkoutCategory, WorkoutHistoryEntry};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use tracing::debug;

pub const HEALTH_COLUMNS: [&str; 3] = ["date", "metric", "value"];
pub const WORKOUT_COLUMNS: [&str; 5] = [
    "date",
    "workout_name",
    "category",
    "duration_mins",
    "completed",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

//=========================================================================================
// Errors and Results
//=========================================================================================

/// A single rejected row. The batch it belongs to carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {row}, column '{column}': {reason}")]
pub struct RowError {
    /// 1-based index among the data rows (the header is not counted).
    pub row: usize,
    pub column: &'static str,
    pub reason: String,
}

/// A file-level failure, raised before any row is looked at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("CSV is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
    #[error("Could not read CSV: {0}")]
    Csv(String),
}

/// The rows that made it through, plus a report of the ones that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub errors: Vec<RowError>,
}

impl<T> Normalized<T> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn with_decode_errors(mut self, errors: Vec<RowError>) -> Self {
        if !errors.is_empty() {
            self.errors.extend(errors);
            self.errors.sort_by_key(|e| e.row);
        }
        self
    }
}

//=========================================================================================
// Raw Rows
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHealthRow {
    pub date: String,
    pub metric: String,
    pub value: String,
}

impl RawHealthRow {
    pub fn new(date: &str, metric: &str, value: &str) -> Self {
        Self {
            date: date.to_string(),
            metric: metric.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWorkoutRow {
    pub date: String,
    pub workout_name: String,
    pub category: String,
    pub duration_mins: String,
    pub completed: String,
}

/// How to order normalized workout history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkoutOrder {
    /// Keep the order of the upload.
    #[default]
    Upload,
    /// Most recent first; rows on the same date keep their upload order.
    DateDescending,
}

//=========================================================================================
// Health Data
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HealthMetric {
    Steps,
    SleepDuration,
    HeartRate,
    BloodPressureSys,
    BloodPressureDia,
    BodyFat,
    OxygenSaturation,
}

impl HealthMetric {
    /// Matches labels like `steps`, `Sleep Duration` or `Heart Rate (bpm)`.
    fn from_label(label: &str) -> Option<Self> {
        let lowered = label.to_lowercase();
        let without_unit = lowered.split('(').next().unwrap_or("");
        let key = without_unit
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        match key.as_str() {
            "steps" | "step" | "steps_count" => Some(Self::Steps),
            "sleep_duration" | "sleep" => Some(Self::SleepDuration),
            "heart_rate" => Some(Self::HeartRate),
            "blood_pressure_sys" | "systolic" => Some(Self::BloodPressureSys),
            "blood_pressure_dia" | "diastolic" => Some(Self::BloodPressureDia),
            "body_fat" => Some(Self::BodyFat),
            "oxygen_saturation" | "o2" | "spo2" => Some(Self::OxygenSaturation),
            _ => None,
        }
    }

    fn apply(self, record: &mut HealthRecord, value: &str) -> Result<(), String> {
        match self {
            Self::Steps => record.steps = Some(parse_whole(value)?),
            Self::SleepDuration => record.sleep_duration = Some(parse_decimal(value)?),
            Self::HeartRate => record.heart_rate = Some(parse_whole(value)?),
            Self::BloodPressureSys => record.blood_pressure_sys = Some(parse_whole(value)?),
            Self::BloodPressureDia => record.blood_pressure_dia = Some(parse_whole(value)?),
            Self::BodyFat => record.body_fat = Some(parse_decimal(value)?),
            Self::OxygenSaturation => record.oxygen_saturation = Some(parse_decimal(value)?),
        }
        Ok(())
    }
}

/// Pivots `(date, metric, value)` rows into one record per date, most recent first.
///
/// A later row for the same date and metric overwrites the earlier value.
pub fn normalize_health_rows(rows: &[RawHealthRow]) -> Normalized<HealthRecord> {
    pivot_health_rows(rows.iter().enumerate().map(|(i, row)| (i + 1, row)))
}

fn pivot_health_rows<'a, I>(rows: I) -> Normalized<HealthRecord>
where
    I: IntoIterator<Item = (usize, &'a RawHealthRow)>,
{
    let mut by_date: BTreeMap<NaiveDate, HealthRecord> = BTreeMap::new();
    let mut errors = Vec::new();

    for (row_number, row) in rows {
        let Some(metric) = HealthMetric::from_label(&row.metric) else {
            debug!(row = row_number, metric = %row.metric, "Dropping unrecognized health metric");
            continue;
        };

        let date = match parse_date(&row.date) {
            Ok(date) => date,
            Err(reason) => {
                errors.push(RowError { row: row_number, column: "date", reason });
                continue;
            }
        };

        // Validate against a scratch copy so a bad value never creates an empty day.
        let mut record = by_date
            .get(&date)
            .cloned()
            .unwrap_or_else(|| HealthRecord::new(date));
        match metric.apply(&mut record, row.value.trim()) {
            Ok(()) => {
                by_date.insert(date, record);
            }
            Err(reason) => errors.push(RowError { row: row_number, column: "value", reason }),
        }
    }

    Normalized {
        records: by_date.into_values().rev().collect(),
        errors,
    }
}

/// Reads a health CSV with `date, metric, value` columns.
pub fn parse_health_csv<R: Read>(reader: R) -> Result<Normalized<HealthRecord>, ValidationError> {
    let decoded = read_rows(reader, &HEALTH_COLUMNS)?;
    let raw: Vec<(usize, RawHealthRow)> = decoded
        .rows
        .into_iter()
        .map(|(row, fields)| {
            let raw = RawHealthRow {
                date: fields[0].clone(),
                metric: fields[1].clone(),
                value: fields[2].clone(),
            };
            (row, raw)
        })
        .collect();
    let normalized = pivot_health_rows(raw.iter().map(|(row, raw)| (*row, raw)));
    Ok(normalized.with_decode_errors(decoded.errors))
}

/// Keeps the records that fall on the latest `days` distinct dates, preserving order.
pub fn retain_latest_days(records: Vec<HealthRecord>, days: usize) -> Vec<HealthRecord> {
    let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    if dates.len() <= days {
        return records;
    }
    let kept: BTreeSet<NaiveDate> = dates.into_iter().rev().take(days).collect();
    records.into_iter().filter(|r| kept.contains(&r.date)).collect()
}

//=========================================================================================
// Workout History
//=========================================================================================

pub fn normalize_workout_rows(
    rows: &[RawWorkoutRow],
    order: WorkoutOrder,
) -> Normalized<WorkoutHistoryEntry> {
    validate_workout_rows(rows.iter().enumerate().map(|(i, row)| (i + 1, row)), order)
}

fn validate_workout_rows<'a, I>(rows: I, order: WorkoutOrder) -> Normalized<WorkoutHistoryEntry>
where
    I: IntoIterator<Item = (usize, &'a RawWorkoutRow)>,
{
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (row_number, row) in rows {
        match normalize_workout_row(row) {
            Ok(entry) => records.push(entry),
            Err((column, reason)) => errors.push(RowError {
                row: row_number,
                column,
                reason,
            }),
        }
    }

    if order == WorkoutOrder::DateDescending {
        records.sort_by(|a, b| b.date.cmp(&a.date));
    }

    Normalized { records, errors }
}

fn normalize_workout_row(row: &RawWorkoutRow) -> Result<WorkoutHistoryEntry, (&'static str, String)> {
    let date = parse_date(&row.date).map_err(|reason| ("date", reason))?;

    let workout_name = row.workout_name.trim();
    if workout_name.is_empty() {
        return Err(("workout_name", "value is missing".to_string()));
    }

    let category = row
        .category
        .parse::<WorkoutCategory>()
        .map_err(|reason| ("category", reason))?;

    let duration = parse_whole(row.duration_mins.trim()).map_err(|reason| ("duration_mins", reason))?;
    let duration_minutes = u32::try_from(duration)
        .map_err(|_| ("duration_mins", format!("'{}' must not be negative", duration)))?;

    let completed = parse_flag(&row.completed).map_err(|reason| ("completed", reason))?;

    Ok(WorkoutHistoryEntry {
        date,
        workout_name: workout_name.to_string(),
        category,
        duration_minutes,
        completed,
    })
}

/// Reads a workout CSV with `date, workout_name, category, duration_mins, completed` columns.
pub fn parse_workout_csv<R: Read>(
    reader: R,
    order: WorkoutOrder,
) -> Result<Normalized<WorkoutHistoryEntry>, ValidationError> {
    let decoded = read_rows(reader, &WORKOUT_COLUMNS)?;
    let raw: Vec<(usize, RawWorkoutRow)> = decoded
        .rows
        .into_iter()
        .map(|(row, fields)| {
            let raw = RawWorkoutRow {
                date: fields[0].clone(),
                workout_name: fields[1].clone(),
                category: fields[2].clone(),
                duration_mins: fields[3].clone(),
                completed: fields[4].clone(),
            };
            (row, raw)
        })
        .collect();
    let normalized = validate_workout_rows(raw.iter().map(|(row, raw)| (*row, raw)), order);
    Ok(normalized.with_decode_errors(decoded.errors))
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Data rows with their 1-based row numbers, and the rows that could not be decoded.
struct DecodedRows {
    rows: Vec<(usize, Vec<String>)>,
    errors: Vec<RowError>,
}

/// Reads every data row and returns the `required` columns in the given order.
/// Extra columns are ignored; short rows yield empty strings. A row that cannot be
/// decoded becomes a row error and reading carries on with the next one.
fn read_rows<R: Read>(reader: R, required: &[&'static str]) -> Result<DecodedRows, ValidationError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()
        .map_err(|e| ValidationError::Csv(e.to_string()))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_lowercase())
        .collect();

    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for column in required {
        match headers.iter().position(|h| h == column) {
            Some(i) => indices.push(i),
            None => missing.push(*column),
        }
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }

    let mut decoded = DecodedRows {
        rows: Vec::new(),
        errors: Vec::new(),
    };
    for (index, record) in csv_reader.byte_records().enumerate() {
        let row = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(ValidationError::Csv(e.to_string()));
            }
            Err(e) => {
                decoded.errors.push(RowError {
                    row,
                    column: "row",
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let mut fields = Vec::with_capacity(indices.len());
        let mut bad_column = None;
        for (&i, &column) in indices.iter().zip(required) {
            match std::str::from_utf8(record.get(i).unwrap_or_default()) {
                Ok(text) => fields.push(text.to_string()),
                Err(_) => {
                    bad_column = Some(column);
                    break;
                }
            }
        }
        match bad_column {
            Some(column) => decoded.errors.push(RowError {
                row,
                column,
                reason: "value is not valid UTF-8 text".to_string(),
            }),
            None => decoded.rows.push((row, fields)),
        }
    }
    Ok(decoded)
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("value is missing".to_string());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| format!("'{}' is not a YYYY-MM-DD date", value))
}

/// Accepts `10000` as well as `10000.0`, but not `10000.5`.
fn parse_whole(value: &str) -> Result<i64, String> {
    if value.is_empty() {
        return Err("value is missing".to_string());
    }
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }
    match value.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(format!("'{}' is not a whole number", value)),
    }
}

fn parse_decimal(value: &str) -> Result<f64, String> {
    if value.is_empty() {
        return Err("value is missing".to_string());
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(format!("'{}' is not a number", value)),
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else if value.is_empty() {
        Err("value is missing".to_string())
    } else {
        Err(format!("'{}' is not true or false", value))
    }
}
