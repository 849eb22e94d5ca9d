use chrono::{NaiveDateTime, Timelike};
use polars::prelude::*;

use aerospec_core::schema::{self, canonical_columns, IDENTITY_COLUMNS};
use aerospec_parser::Measurement;

use crate::error::ProcessingError;
use crate::normalize::{naive_from_micros, render_canonical};

/// Supported time-bucket widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Hourly,
    TenMinute,
    Minute,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hourly => "hour",
            Resolution::TenMinute => "10min",
            Resolution::Minute => "minute",
        }
    }

    /// Left-aligned, half-open bucket start, anchored to the natural
    /// calendar (ten-minute buckets land on :00, :10, :20, ...).
    pub fn bucket_start(&self, stamp: NaiveDateTime) -> NaiveDateTime {
        let trimmed = stamp
            .with_second(0)
            .and_then(|s| s.with_nanosecond(0))
            .unwrap_or(stamp);
        match self {
            Resolution::Minute => trimmed,
            Resolution::TenMinute => trimmed
                .with_minute(trimmed.minute() - trimmed.minute() % 10)
                .unwrap_or(trimmed),
            Resolution::Hourly => trimmed.with_minute(0).unwrap_or(trimmed),
        }
    }
}

impl TryFrom<&str> for Resolution {
    type Error = ProcessingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hour" | "hourly" => Ok(Resolution::Hourly),
            "10min" | "10" => Ok(Resolution::TenMinute),
            "minute" | "1min" => Ok(Resolution::Minute),
            other => Err(ProcessingError::InvalidResolution(other.to_string())),
        }
    }
}

/// Group a normalized stream by (identity keys, bucket start) and average
/// every measurement column. Values are coerced to Float64 non-strictly:
/// anything unparseable becomes missing and is excluded from the mean.
pub fn resample(frame: &DataFrame, resolution: Resolution) -> Result<DataFrame, ProcessingError> {
    if frame.height() == 0 {
        return empty_aggregated();
    }

    let micros = frame
        .column(schema::TIMESTAMP_MICROS)?
        .as_materialized_series()
        .i64()?;

    let mut bucket_micros = Vec::with_capacity(frame.height());
    let mut bucket_label = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        let raw = micros.get(idx).ok_or_else(|| {
            ProcessingError::Stage("timestamp_micros column contained a null".to_string())
        })?;
        let stamp = naive_from_micros(raw)
            .ok_or_else(|| ProcessingError::Stage(format!("invalid timestamp micros {raw}")))?;
        let start = resolution.bucket_start(stamp);
        bucket_micros.push(start.and_utc().timestamp_micros());
        bucket_label.push(render_canonical(&start));
    }

    let mut working = frame.clone();
    working.with_column(Series::new("bucket_micros".into(), bucket_micros))?;
    // the bucket start replaces the per-row stamp as the record timestamp
    working.with_column(Series::new(schema::TIMESTAMP.into(), bucket_label))?;

    let group_keys: Vec<Expr> = IDENTITY_COLUMNS.iter().map(|name| col(*name)).collect();

    let mut aggregations: Vec<Expr> = Measurement::ALL
        .iter()
        .map(|metric| {
            let name = metric.canonical_name();
            col(name).cast(DataType::Float64).mean().alias(name)
        })
        .collect();
    aggregations.push(col("bucket_micros").first());

    let ordered: Vec<Expr> = canonical_columns().iter().map(|name| col(*name)).collect();

    let aggregated = working
        .lazy()
        .group_by(group_keys)
        .agg(aggregations)
        .sort(["bucket_micros"], SortMultipleOptions::default())
        .select(ordered)
        .collect()?;

    Ok(aggregated)
}

fn empty_aggregated() -> Result<DataFrame, ProcessingError> {
    let mut columns: Vec<Column> = IDENTITY_COLUMNS
        .iter()
        .map(|name| Series::new((*name).into(), Vec::<String>::new()).into())
        .collect();
    for metric in Measurement::ALL {
        columns.push(Series::new(metric.canonical_name().into(), Vec::<f64>::new()).into());
    }
    DataFrame::new(columns).map_err(ProcessingError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 9, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn bucket_starts_are_calendar_anchored() {
        assert_eq!(
            Resolution::TenMinute.bucket_start(stamp(9, 58, 20)),
            stamp(9, 50, 0)
        );
        assert_eq!(
            Resolution::TenMinute.bucket_start(stamp(10, 1, 5)),
            stamp(10, 0, 0)
        );
        assert_eq!(
            Resolution::Hourly.bucket_start(stamp(10, 59, 59)),
            stamp(10, 0, 0)
        );
        assert_eq!(
            Resolution::Minute.bucket_start(stamp(10, 1, 59)),
            stamp(10, 1, 0)
        );
    }

    #[test]
    fn resolution_names_round_trip() {
        for resolution in [Resolution::Hourly, Resolution::TenMinute, Resolution::Minute] {
            assert_eq!(Resolution::try_from(resolution.as_str()).unwrap(), resolution);
        }
        assert!(matches!(
            Resolution::try_from("weekly"),
            Err(ProcessingError::InvalidResolution(_))
        ));
    }
}
