use aerospec_parser::Measurement;
use polars::prelude::*;

/// Local-time format every record is normalized to. Fixed-width and
/// zero-padded so the string doubles as a join key.
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %I:%M %p";

pub const DEVICE_NAME: &str = "device_name";
pub const TIMESTAMP: &str = "timestamp";
/// Epoch microseconds of the parsed local time. Internal ordering/bucketing
/// column; never part of terminal output.
pub const TIMESTAMP_MICROS: &str = "timestamp_micros";
pub const AM_PM: &str = "am_pm";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const PLACEMENT: &str = "placement";

/// Identity columns of an aggregated row, in output order.
pub const IDENTITY_COLUMNS: [&str; 6] = [
    DEVICE_NAME,
    TIMESTAMP,
    AM_PM,
    LATITUDE,
    LONGITUDE,
    PLACEMENT,
];

/// Sentinel value for measurement columns a source family does not report,
/// so concatenation across families never sees mismatched schemas.
pub const MISSING_MEASUREMENT_FILL: &str = "0";

/// Full aggregated-record column list, in the stable output order.
pub fn canonical_columns() -> Vec<&'static str> {
    let mut columns = IDENTITY_COLUMNS.to_vec();
    columns.extend(Measurement::ALL.iter().map(|m| m.canonical_name()));
    columns
}

/// Declarative schema reconciliation: any canonical measurement column the
/// frame lacks is added with the sentinel fill, so every family reaches the
/// resampler with an identical column set.
pub fn reconcile_measurements(df: &mut DataFrame) -> PolarsResult<()> {
    let height = df.height();
    for metric in Measurement::ALL {
        let name = metric.canonical_name();
        if df.column(name).is_err() {
            let filled = vec![MISSING_MEASUREMENT_FILL.to_string(); height];
            df.with_column(Series::new(name.into(), filled))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciliation_backfills_missing_measurements() {
        let mut df = df![
            "pm2_5_std" => ["12.0", "14.0"],
        ]
        .unwrap();

        reconcile_measurements(&mut df).unwrap();

        for metric in Measurement::ALL {
            let column = df
                .column(metric.canonical_name())
                .expect("measurement column missing after reconciliation");
            assert_eq!(column.len(), 2);
        }
        let filled = df.column("pm10_env").unwrap();
        assert_eq!(filled.str().unwrap().get(0), Some("0"));
    }

    #[test]
    fn canonical_order_starts_with_identity() {
        let columns = canonical_columns();
        assert_eq!(&columns[..6], &IDENTITY_COLUMNS);
        assert_eq!(columns.len(), 18);
    }
}
