use csv::StringRecord;
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::{DeviceFamily, Measurement, ParsedDeviceFile};

use super::schema::RAW_IDENTITY_COLUMNS;

/// Field index where the measurement block starts in a fixed-station row.
const MEASUREMENT_OFFSET: usize = RAW_IDENTITY_COLUMNS.len();

pub(crate) fn csv_reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
}

pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).unwrap_or_default().trim().is_empty()
}

/// Column accumulator for the shared fixed-station layout. Values stay
/// String; numeric coercion happens at resampling time.
struct RawColumns {
    identity: Vec<Vec<String>>,
    measurements: Vec<Vec<String>>,
}

impl RawColumns {
    fn new() -> Self {
        Self {
            identity: (0..RAW_IDENTITY_COLUMNS.len()).map(|_| Vec::new()).collect(),
            measurements: (0..Measurement::ALL.len()).map(|_| Vec::new()).collect(),
        }
    }

    fn push_row(&mut self, record: &StringRecord) {
        for (idx, column) in self.identity.iter_mut().enumerate() {
            column.push(record.get(idx).unwrap_or_default().trim().to_string());
        }
        for (idx, column) in self.measurements.iter_mut().enumerate() {
            column.push(
                record
                    .get(MEASUREMENT_OFFSET + idx)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            );
        }
    }

    fn len(&self) -> usize {
        self.identity[0].len()
    }

    fn into_columns(self) -> Vec<(&'static str, Vec<String>)> {
        let mut columns = Vec::with_capacity(self.identity.len() + self.measurements.len());
        for (name, values) in RAW_IDENTITY_COLUMNS.iter().zip(self.identity) {
            columns.push((*name, values));
        }
        for (metric, values) in Measurement::ALL.iter().zip(self.measurements) {
            columns.push((metric.canonical_name(), values));
        }
        columns
    }
}

pub(crate) fn frame_from_columns(
    parser: &'static str,
    columns: Vec<(&'static str, Vec<String>)>,
) -> Result<DataFrame, ParserError> {
    let series: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.into(), values).into())
        .collect();

    DataFrame::new(series).map_err(|err| ParserError::Validation {
        parser,
        message: format!("failed to build raw dataframe: {err}"),
    })
}

fn device_id_from_header(
    parser: &'static str,
    record: &StringRecord,
) -> Result<String, ParserError> {
    let raw = record.get(0).unwrap_or_default().trim();
    if raw.is_empty() {
        return Err(ParserError::FormatMismatch {
            parser,
            reason: "first row does not carry a device identifier".to_string(),
        });
    }
    if raw.contains('/') {
        return Err(ParserError::FormatMismatch {
            parser,
            reason: format!("first row looks like a data row, not a device identifier ('{raw}')"),
        });
    }
    Ok(raw.to_string())
}

/// Shared decode loop for both fixed-station families. The first row names
/// the device, the second is a calibration row that is consumed and
/// discarded, and every later row whose field count does not match the
/// family layout is skipped and counted.
pub(crate) fn parse_fixed_station(
    parser: &'static str,
    family: DeviceFamily,
    field_count: usize,
    content: &str,
) -> Result<ParsedDeviceFile, ParserError> {
    let mut reader = csv_reader(content);
    let mut records = reader.records();

    let header = records
        .next()
        .ok_or(ParserError::FormatMismatch {
            parser,
            reason: "file is empty".to_string(),
        })?
        .map_err(|err| ParserError::Csv { parser, source: err })?;
    let device_id = device_id_from_header(parser, &header)?;

    let mut columns = RawColumns::new();
    let mut skipped_rows = 0usize;
    let mut calibration_consumed = false;

    for record in records {
        let record = record.map_err(|err| ParserError::Csv { parser, source: err })?;
        if is_blank(&record) {
            continue;
        }

        if !calibration_consumed {
            // The first data-shaped row doubles as the format check: a
            // width mismatch here means this is not our family at all.
            if record.len() != field_count {
                return Err(ParserError::FormatMismatch {
                    parser,
                    reason: format!(
                        "expected {field_count} fields per row, found {}",
                        record.len()
                    ),
                });
            }
            calibration_consumed = true;
            continue;
        }

        if record.len() != field_count {
            skipped_rows += 1;
            continue;
        }

        columns.push_row(&record);
    }

    if !calibration_consumed {
        // Without a single data-shaped row the family layout was never
        // confirmed, so let the registry try the next parser.
        return Err(ParserError::FormatMismatch {
            parser,
            reason: "no data rows to confirm the layout".to_string(),
        });
    }

    if columns.len() == 0 {
        return Err(ParserError::EmptyData { parser });
    }

    let df = frame_from_columns(parser, columns.into_columns())?;

    Ok(ParsedDeviceFile {
        device_id,
        family,
        df,
        skipped_rows,
    })
}
