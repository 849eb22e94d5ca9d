use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use polars::prelude::*;
use tracing::debug;

use aerospec_core::devices;
use aerospec_core::schema::{self, CANONICAL_TIMESTAMP_FORMAT};
use aerospec_parser::formats::schema::REFERENCE_COLUMNS;
use aerospec_parser::{DeviceFamily, Measurement, ParsedDeviceFile};

use crate::error::ProcessingError;

/// Knobs for the timestamp-cleaning rules. The defaults encode the 2020
/// wildfire campaign: one device family logged UTC before a firmware fix
/// (7 hours ahead of local), and its parser fell back to a 2005 year.
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    pub analysis_year: i32,
    pub utc_offset_hours: i64,
    pub stray_year: i32,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            analysis_year: 2020,
            utc_offset_hours: 7,
            stray_year: 2005,
        }
    }
}

/// Date field written by devices that never acquired a clock fix.
const NULL_DATE: &str = "0/0/0";
/// Substring of the glitched GPS-epoch dates some firmware emits.
const CORRUPT_YEAR_MARKER: &str = "80";

/// Year-first layouts seen in fixed-station feeds, four-digit year first.
const FIXED_STAMP_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Layouts seen in reference-station exports.
const REFERENCE_STAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

pub fn parse_canonical(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), CANONICAL_TIMESTAMP_FORMAT).ok()
}

pub fn render_canonical(stamp: &NaiveDateTime) -> String {
    stamp.format(CANONICAL_TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn naive_from_micros(value: i64) -> Option<NaiveDateTime> {
    let secs = value.div_euclid(1_000_000);
    let micros = value.rem_euclid(1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, micros * 1_000).map(|dt| dt.naive_utc())
}

fn parse_first_match(value: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Normalize one parsed device file: drop malformed timestamps, correct the
/// UTC-logging family, attach registry metadata, and reconcile the
/// measurement schema. `Ok(None)` is the explicit empty signal when no row
/// survives cleaning.
pub fn normalize(
    parsed: &ParsedDeviceFile,
    options: &NormalizerOptions,
) -> Result<Option<DataFrame>, ProcessingError> {
    match parsed.family {
        DeviceFamily::ReferenceStation => normalize_reference(parsed),
        DeviceFamily::BetaStation | DeviceFamily::BreakoutStation => {
            normalize_fixed(parsed, options)
        }
    }
}

struct StampColumns {
    keep: Vec<bool>,
    canonical: Vec<String>,
    micros: Vec<i64>,
    am_pm: Vec<String>,
    dropped: usize,
}

fn clean_fixed_stamps(
    dates: &StringChunked,
    times: &StringChunked,
    options: &NormalizerOptions,
) -> StampColumns {
    let height = dates.len();
    let analysis_year_token = options.analysis_year.to_string();

    let mut keep = Vec::with_capacity(height);
    let mut canonical = Vec::new();
    let mut micros = Vec::new();
    let mut am_pm = Vec::new();
    let mut dropped = 0usize;

    for idx in 0..height {
        let date = dates.get(idx).unwrap_or("").trim();
        let time = times.get(idx).unwrap_or("").trim();

        if date == NULL_DATE || date.contains(CORRUPT_YEAR_MARKER) {
            keep.push(false);
            dropped += 1;
            continue;
        }

        let stamp = format!("{date} {time}");
        let Some(mut parsed) = parse_first_match(&stamp, FIXED_STAMP_FORMATS) else {
            keep.push(false);
            dropped += 1;
            continue;
        };

        // Rows that already carry the analysis year are final; anything
        // else was logged in UTC before the firmware fix and shifts back
        // to local time exactly once.
        if parsed.year() != options.analysis_year && !date.contains(&analysis_year_token) {
            parsed = parsed - Duration::hours(options.utc_offset_hours);
        }
        if parsed.year() == options.stray_year {
            if let Some(corrected) = parsed.with_year(options.analysis_year) {
                parsed = corrected;
            }
        }

        let rendered = render_canonical(&parsed);
        let meridiem = rendered.rsplit(' ').next().unwrap_or("").to_string();

        keep.push(true);
        canonical.push(rendered);
        micros.push(parsed.and_utc().timestamp_micros());
        am_pm.push(meridiem);
    }

    StampColumns {
        keep,
        canonical,
        micros,
        am_pm,
        dropped,
    }
}

fn normalize_fixed(
    parsed: &ParsedDeviceFile,
    options: &NormalizerOptions,
) -> Result<Option<DataFrame>, ProcessingError> {
    let dates = parsed.df.column("date")?.as_materialized_series().str()?;
    let times = parsed.df.column("time")?.as_materialized_series().str()?;

    let stamps = clean_fixed_stamps(dates, times, options);
    if stamps.canonical.is_empty() {
        debug!(
            device = %parsed.device_id,
            dropped = stamps.dropped,
            "no rows survived timestamp cleaning"
        );
        return Ok(None);
    }
    if stamps.dropped > 0 {
        debug!(
            device = %parsed.device_id,
            dropped = stamps.dropped,
            "dropped rows with malformed dates"
        );
    }

    let mask = BooleanChunked::from_slice("keep".into(), &stamps.keep);
    let mut out = parsed.df.filter(&mask)?;
    let survivors = out.height();

    let info = devices::lookup(&parsed.device_id);
    if let Some(coords) = info.coordinates {
        // fixed installations trust the registry over the GPS fields
        out.with_column(Series::new(
            schema::LATITUDE.into(),
            vec![coords.latitude.to_string(); survivors],
        ))?;
        out.with_column(Series::new(
            schema::LONGITUDE.into(),
            vec![coords.longitude.to_string(); survivors],
        ))?;
    }

    out.with_column(Series::new(
        schema::DEVICE_NAME.into(),
        vec![parsed.device_id.clone(); survivors],
    ))?;
    out.with_column(Series::new(schema::TIMESTAMP.into(), stamps.canonical))?;
    out.with_column(Series::new(schema::TIMESTAMP_MICROS.into(), stamps.micros))?;
    out.with_column(Series::new(schema::AM_PM.into(), stamps.am_pm))?;
    out.with_column(Series::new(
        schema::PLACEMENT.into(),
        vec![info.placement.as_str().to_string(); survivors],
    ))?;

    schema::reconcile_measurements(&mut out)?;
    Ok(Some(out))
}

fn normalize_reference(parsed: &ParsedDeviceFile) -> Result<Option<DataFrame>, ProcessingError> {
    let raw_stamps = parsed
        .df
        .column(REFERENCE_COLUMNS[0])?
        .as_materialized_series()
        .str()?;
    let raw_values = parsed
        .df
        .column(REFERENCE_COLUMNS[1])?
        .as_materialized_series()
        .str()?;

    let mut canonical = Vec::new();
    let mut micros = Vec::new();
    let mut am_pm = Vec::new();
    let mut values = Vec::new();
    let mut dropped = 0usize;

    for idx in 0..parsed.df.height() {
        let raw = raw_stamps.get(idx).unwrap_or("").trim();
        let Some(stamp) = parse_first_match(raw, REFERENCE_STAMP_FORMATS) else {
            dropped += 1;
            continue;
        };
        let rendered = render_canonical(&stamp);
        let meridiem = rendered.rsplit(' ').next().unwrap_or("").to_string();

        canonical.push(rendered);
        micros.push(stamp.and_utc().timestamp_micros());
        am_pm.push(meridiem);
        values.push(raw_values.get(idx).unwrap_or("").trim().to_string());
    }

    if canonical.is_empty() {
        debug!(device = %parsed.device_id, dropped, "no rows survived timestamp cleaning");
        return Ok(None);
    }
    if dropped > 0 {
        debug!(device = %parsed.device_id, dropped, "dropped rows with malformed dates");
    }

    let info = devices::lookup(&parsed.device_id);
    let (latitude, longitude) = info
        .coordinates
        .map(|coords| (coords.latitude.to_string(), coords.longitude.to_string()))
        .unwrap_or_default();
    let survivors = canonical.len();

    let mut out = DataFrame::new(vec![
        Series::new(
            schema::DEVICE_NAME.into(),
            vec![parsed.device_id.clone(); survivors],
        )
        .into(),
        Series::new(schema::TIMESTAMP.into(), canonical).into(),
        Series::new(schema::TIMESTAMP_MICROS.into(), micros).into(),
        Series::new(schema::AM_PM.into(), am_pm).into(),
        Series::new(schema::LATITUDE.into(), vec![latitude; survivors]).into(),
        Series::new(schema::LONGITUDE.into(), vec![longitude; survivors]).into(),
        Series::new(
            schema::PLACEMENT.into(),
            vec![info.placement.as_str().to_string(); survivors],
        )
        .into(),
        Series::new(Measurement::Pm25Std.canonical_name().into(), values).into(),
    ])?;

    schema::reconcile_measurements(&mut out)?;
    Ok(Some(out))
}
