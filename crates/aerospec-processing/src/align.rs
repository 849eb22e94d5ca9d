use chrono::NaiveDateTime;
use polars::prelude::*;

use aerospec_core::schema::{AM_PM, DEVICE_NAME, TIMESTAMP};
use aerospec_parser::Measurement;

use crate::error::ProcessingError;
use crate::normalize::parse_canonical;

/// Ratio-table columns, in output order.
pub const RATIO_COLUMNS: [&str; 7] = [
    "numerator_device",
    "denominator_device",
    "timestamp",
    "am_pm",
    "numerator_value",
    "denominator_value",
    "ratio",
];

/// Inclusive analysis window applied to every ratio row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl AnalysisWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, stamp: &NaiveDateTime) -> bool {
        *stamp >= self.start && *stamp <= self.end
    }
}

/// How to pair two aggregated streams into ratios.
#[derive(Debug, Clone)]
pub struct RatioSpec {
    pub metric: Measurement,
    /// Denominator column when it differs from the numerator's (reference
    /// streams only report PM2.5).
    pub denominator_metric: Option<Measurement>,
    pub window: AnalysisWindow,
    /// Unit/calibration adjustment applied to the denominator.
    pub scale_factor: f64,
}

impl RatioSpec {
    pub fn new(metric: Measurement, window: AnalysisWindow) -> Self {
        Self {
            metric,
            denominator_metric: None,
            window,
            scale_factor: 1.0,
        }
    }

    pub fn with_denominator_metric(mut self, metric: Measurement) -> Self {
        self.denominator_metric = Some(metric);
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    fn denominator_name(&self) -> &'static str {
        self.denominator_metric
            .unwrap_or(self.metric)
            .canonical_name()
    }
}

/// Inner-join two aggregated streams on the canonical timestamp and divide.
/// Rows with a zero (or missing) denominator are excluded before the
/// division; rows outside the window are excluded after. An empty result is
/// a valid outcome, not an error.
pub fn ratio_table(
    numerator: &DataFrame,
    denominator: &DataFrame,
    spec: &RatioSpec,
) -> Result<DataFrame, ProcessingError> {
    let numerator_side = numerator.clone().lazy().select([
        col(TIMESTAMP),
        col(AM_PM),
        col(DEVICE_NAME).alias("numerator_device"),
        col(spec.metric.canonical_name()).alias("numerator_value"),
    ]);
    let denominator_side = denominator.clone().lazy().select([
        col(TIMESTAMP),
        col(DEVICE_NAME).alias("denominator_device"),
        col(spec.denominator_name()).alias("denominator_value"),
    ]);

    let ordered: Vec<Expr> = RATIO_COLUMNS.iter().map(|name| col(*name)).collect();

    let joined = numerator_side
        .join(
            denominator_side,
            [col(TIMESTAMP)],
            [col(TIMESTAMP)],
            JoinArgs::new(JoinType::Inner),
        )
        .filter(col("denominator_value").neq(lit(0.0)))
        .with_column(
            (col("numerator_value") / (lit(spec.scale_factor) * col("denominator_value")))
                .alias("ratio"),
        )
        .select(ordered)
        .collect()?;

    filter_window(&joined, &spec.window)
}

/// Fan-out form: one ratio table per reference stream.
pub fn reference_ratio_tables(
    numerator: &DataFrame,
    references: &[DataFrame],
    spec: &RatioSpec,
) -> Result<Vec<DataFrame>, ProcessingError> {
    references
        .iter()
        .map(|reference| ratio_table(numerator, reference, spec))
        .collect()
}

/// The empty-but-well-formed ratio table used when every pairing filtered
/// down to nothing.
pub fn empty_ratio_frame() -> Result<DataFrame, ProcessingError> {
    let columns: Vec<Column> = vec![
        Series::new("numerator_device".into(), Vec::<String>::new()).into(),
        Series::new("denominator_device".into(), Vec::<String>::new()).into(),
        Series::new("timestamp".into(), Vec::<String>::new()).into(),
        Series::new("am_pm".into(), Vec::<String>::new()).into(),
        Series::new("numerator_value".into(), Vec::<f64>::new()).into(),
        Series::new("denominator_value".into(), Vec::<f64>::new()).into(),
        Series::new("ratio".into(), Vec::<f64>::new()).into(),
    ];
    DataFrame::new(columns).map_err(ProcessingError::from)
}

fn filter_window(
    frame: &DataFrame,
    window: &AnalysisWindow,
) -> Result<DataFrame, ProcessingError> {
    let stamps = frame.column(TIMESTAMP)?.as_materialized_series().str()?;
    let keep: Vec<bool> = (0..frame.height())
        .map(|idx| {
            stamps
                .get(idx)
                .and_then(parse_canonical)
                .map(|stamp| window.contains(&stamp))
                .unwrap_or(false)
        })
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    frame.filter(&mask).map_err(ProcessingError::from)
}
