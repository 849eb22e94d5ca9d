use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, warn};

use aerospec_core::schema::DEVICE_NAME;
use aerospec_core::{Placement, UserRoster, REFERENCE_STATIONS};
use aerospec_parser::{parse_device_file, Measurement};

use crate::align::{empty_ratio_frame, ratio_table, RatioSpec};
use crate::error::ProcessingError;
use crate::normalize::{normalize, NormalizerOptions};
use crate::resample::{resample, Resolution};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub resolution: Resolution,
    pub normalizer: NormalizerOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::TenMinute,
            normalizer: NormalizerOptions::default(),
        }
    }
}

/// Run one file through parse -> normalize -> resample. `Ok(None)` means
/// the stream had no usable rows, which downstream stages skip.
pub fn process_file(
    path: &Path,
    options: &PipelineOptions,
) -> Result<Option<DataFrame>, ProcessingError> {
    let content = fs::read_to_string(path)?;
    let parsed = parse_device_file(path, &content)?;
    if parsed.skipped_rows > 0 {
        debug!(
            file = %path.display(),
            skipped = parsed.skipped_rows,
            "skipped malformed rows"
        );
    }

    let Some(normalized) = normalize(&parsed, &options.normalizer)? else {
        debug!(device = %parsed.device_id, "stream empty after cleaning");
        return Ok(None);
    };

    resample(&normalized, options.resolution).map(Some)
}

/// Fold per-file aggregated batches into one table with an explicit
/// reducer. Files the registry cannot read are warned about and skipped;
/// only a corpus with no usable file at all is an error.
pub fn process_corpus(
    paths: &[PathBuf],
    options: &PipelineOptions,
) -> Result<DataFrame, ProcessingError> {
    let mut combined: Option<DataFrame> = None;

    for path in paths {
        let batch = match process_file(path, options) {
            Ok(Some(batch)) => batch,
            Ok(None) => continue,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unreadable device file");
                continue;
            }
        };
        combined = Some(match combined {
            Some(acc) => acc.vstack(&batch)?,
            None => batch,
        });
    }

    combined.ok_or_else(|| {
        ProcessingError::Stage("no device files could be processed".to_string())
    })
}

/// Partition a combined table back into per-device streams, first-seen
/// device order.
pub fn split_by_device(frame: &DataFrame) -> Result<Vec<(String, DataFrame)>, ProcessingError> {
    let names = frame.column(DEVICE_NAME)?.as_materialized_series().str()?;

    let mut order: Vec<String> = Vec::new();
    for idx in 0..frame.height() {
        if let Some(name) = names.get(idx) {
            if !order.iter().any(|existing| existing == name) {
                order.push(name.to_string());
            }
        }
    }

    let mut streams = Vec::with_capacity(order.len());
    for name in order {
        let keep: Vec<bool> = (0..frame.height())
            .map(|idx| names.get(idx) == Some(name.as_str()))
            .collect();
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let stream = frame.filter(&mask)?;
        streams.push((name, stream));
    }
    Ok(streams)
}

/// Indoor/outdoor ratio rows for every roster pair whose streams overlap,
/// concatenated into one table. Pairs with a missing stream or an empty
/// join are skipped silently.
pub fn indoor_outdoor_ratios(
    frame: &DataFrame,
    roster: &UserRoster,
    spec: &RatioSpec,
) -> Result<DataFrame, ProcessingError> {
    let streams: HashMap<String, DataFrame> = split_by_device(frame)?.into_iter().collect();

    let mut combined: Option<DataFrame> = None;
    for pair in roster.indoor_outdoor_pairs() {
        let (Some(indoor), Some(outdoor)) =
            (streams.get(&pair.indoor), streams.get(&pair.outdoor))
        else {
            continue;
        };

        let table = ratio_table(indoor, outdoor, spec)?;
        if table.height() == 0 {
            debug!(user = %pair.user, "empty ratio result skipped");
            continue;
        }
        combined = Some(match combined {
            Some(acc) => acc.vstack(&table)?,
            None => table,
        });
    }

    match combined {
        Some(table) => Ok(table),
        None => empty_ratio_frame(),
    }
}

/// Fan-out against the public reference stations: for each station present
/// in the corpus, ratio every roster device of the given placement against
/// it. Stations with no overlapping rows are omitted.
pub fn reference_ratios(
    frame: &DataFrame,
    roster: &UserRoster,
    placement: Placement,
    spec: &RatioSpec,
) -> Result<Vec<(String, DataFrame)>, ProcessingError> {
    let streams: HashMap<String, DataFrame> = split_by_device(frame)?.into_iter().collect();

    // reference streams only report PM2.5; divide by it unless told otherwise
    let spec = RatioSpec {
        denominator_metric: Some(spec.denominator_metric.unwrap_or(Measurement::Pm25Std)),
        ..spec.clone()
    };

    let mut results = Vec::new();
    for station in REFERENCE_STATIONS {
        let Some(reference) = streams.get(station) else {
            continue;
        };

        let mut combined: Option<DataFrame> = None;
        for (user, device) in roster.devices_with(placement) {
            let Some(stream) = streams.get(&device) else {
                continue;
            };
            let table = ratio_table(stream, reference, &spec)?;
            if table.height() == 0 {
                debug!(user = %user, station, "empty ratio result skipped");
                continue;
            }
            combined = Some(match combined {
                Some(acc) => acc.vstack(&table)?,
                None => table,
            });
        }

        if let Some(table) = combined {
            results.push((station.to_string(), table));
        }
    }
    Ok(results)
}
