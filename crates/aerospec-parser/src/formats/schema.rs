use crate::model::Measurement;

/// Leading identity fields shared by both fixed-station layouts.
pub const RAW_IDENTITY_COLUMNS: [&str; 6] =
    ["date", "time", "battery", "fix", "latitude", "longitude"];

/// Raw layout of a reference-station file after its preamble.
pub const REFERENCE_COLUMNS: [&str; 2] = ["date_time", "pm2_5_std"];

pub fn measurement_columns() -> Vec<&'static str> {
    Measurement::ALL
        .iter()
        .map(|metric| metric.canonical_name())
        .collect()
}
