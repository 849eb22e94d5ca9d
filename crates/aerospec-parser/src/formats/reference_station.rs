use std::path::Path;

use crate::errors::ParserError;
use crate::model::{DeviceFamily, FileSource, ParsedDeviceFile};
use crate::registry::DeviceFileParser;

use super::common::{csv_reader, is_blank};
use super::frame_from_columns;
use super::schema::REFERENCE_COLUMNS;

/// Public air-quality monitor export: a fixed preamble followed by
/// two-field rows (raw timestamp, PM2.5). The station is identified by a
/// substring of the file path, not by file content.
pub struct ReferenceStationParser;

impl Default for ReferenceStationParser {
    fn default() -> Self {
        Self
    }
}

impl ReferenceStationParser {
    const NAME: &'static str = "REFERENCE_STATION";
    const PREAMBLE_LINES: usize = 9;
    const FIELD_COUNT: usize = 2;

    const STATIONS: [(&'static str, &'static str); 3] = [
        ("Bellevue", "Bellevue SE 12th"),
        ("LakeForestPark", "Lake Forest Park"),
        ("Weller", "Seattle 10th & Weller"),
    ];

    fn station_for_path(path: &Path) -> Option<&'static str> {
        let path = path.to_string_lossy();
        Self::STATIONS
            .iter()
            .find(|(needle, _)| path.contains(needle))
            .map(|(_, station)| *station)
    }

    fn skip_preamble(content: &str) -> Result<&str, ParserError> {
        let mut rest = content;
        for _ in 0..Self::PREAMBLE_LINES {
            match rest.find('\n') {
                Some(pos) => rest = &rest[pos + 1..],
                None => {
                    return Err(ParserError::FormatMismatch {
                        parser: Self::NAME,
                        reason: format!(
                            "file is shorter than the {}-line preamble",
                            Self::PREAMBLE_LINES
                        ),
                    })
                }
            }
        }
        Ok(rest)
    }
}

impl DeviceFileParser for ReferenceStationParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::ReferenceStation
    }

    fn parse(&self, source: &FileSource<'_>) -> Result<ParsedDeviceFile, ParserError> {
        let station = Self::station_for_path(source.path).ok_or_else(|| {
            ParserError::FormatMismatch {
                parser: Self::NAME,
                reason: format!(
                    "path '{}' does not name a known reference station",
                    source.path.display()
                ),
            }
        })?;

        let body = Self::skip_preamble(source.content)?;
        let mut reader = csv_reader(body);

        let mut date_time = Vec::new();
        let mut pm2_5 = Vec::new();
        let mut skipped_rows = 0usize;
        let mut shape_checked = false;

        for record in reader.records() {
            let record = record.map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;
            if is_blank(&record) {
                continue;
            }

            if record.len() != Self::FIELD_COUNT {
                if !shape_checked {
                    return Err(ParserError::FormatMismatch {
                        parser: Self::NAME,
                        reason: format!(
                            "expected {} fields per row, found {}",
                            Self::FIELD_COUNT,
                            record.len()
                        ),
                    });
                }
                skipped_rows += 1;
                continue;
            }
            shape_checked = true;

            date_time.push(record.get(0).unwrap_or_default().trim().to_string());
            pm2_5.push(record.get(1).unwrap_or_default().trim().to_string());
        }

        if date_time.is_empty() {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        let df = frame_from_columns(
            Self::NAME,
            vec![
                (REFERENCE_COLUMNS[0], date_time),
                (REFERENCE_COLUMNS[1], pm2_5),
            ],
        )?;

        Ok(ParsedDeviceFile {
            device_id: station.to_string(),
            family: DeviceFamily::ReferenceStation,
            df,
            skipped_rows,
        })
    }
}
