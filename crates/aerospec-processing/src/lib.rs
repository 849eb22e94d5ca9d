//! Batch pipeline over a sensor-log corpus: parse -> normalize -> resample
//! -> align -> export.

pub mod align;
pub mod error;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod resample;

pub use align::{
    empty_ratio_frame, ratio_table, reference_ratio_tables, AnalysisWindow, RatioSpec,
    RATIO_COLUMNS,
};
pub use error::ProcessingError;
pub use normalize::{normalize, parse_canonical, render_canonical, NormalizerOptions};
pub use pipeline::{
    indoor_outdoor_ratios, process_corpus, process_file, reference_ratios, split_by_device,
    PipelineOptions,
};
pub use resample::{resample, Resolution};
