use std::fmt;
use std::path::Path;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// The three raw-file layouts the fleet produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFamily {
    /// Fixed station with trailing environmental columns (discarded on read).
    BetaStation,
    /// Fixed station without environmental columns.
    BreakoutStation,
    /// Third-party public monitor: preamble + (timestamp, PM2.5) rows.
    ReferenceStation,
}

impl DeviceFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceFamily::BetaStation => "beta-station",
            DeviceFamily::BreakoutStation => "breakout-station",
            DeviceFamily::ReferenceStation => "reference-station",
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical measurement columns shared by every device family after
/// reformatting. Order here is the output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurement {
    DpAbove0p3,
    DpAbove0p5,
    DpAbove1p0,
    DpAbove2p5,
    DpAbove5p0,
    DpAbove10,
    Pm1Std,
    Pm25Std,
    Pm10Std,
    Pm1Env,
    Pm25Env,
    Pm10Env,
}

impl Measurement {
    pub const ALL: [Measurement; 12] = [
        Measurement::DpAbove0p3,
        Measurement::DpAbove0p5,
        Measurement::DpAbove1p0,
        Measurement::DpAbove2p5,
        Measurement::DpAbove5p0,
        Measurement::DpAbove10,
        Measurement::Pm1Std,
        Measurement::Pm25Std,
        Measurement::Pm10Std,
        Measurement::Pm1Env,
        Measurement::Pm25Env,
        Measurement::Pm10Env,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            Measurement::DpAbove0p3 => "dp_gt_0_3",
            Measurement::DpAbove0p5 => "dp_gt_0_5",
            Measurement::DpAbove1p0 => "dp_gt_1_0",
            Measurement::DpAbove2p5 => "dp_gt_2_5",
            Measurement::DpAbove5p0 => "dp_gt_5_0",
            Measurement::DpAbove10 => "dp_gt_10_0",
            Measurement::Pm1Std => "pm1_std",
            Measurement::Pm25Std => "pm2_5_std",
            Measurement::Pm10Std => "pm10_std",
            Measurement::Pm1Env => "pm1_env",
            Measurement::Pm25Env => "pm2_5_env",
            Measurement::Pm10Env => "pm10_env",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl TryFrom<&str> for Measurement {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dp_gt_0_3" | "dp>0.3" => Ok(Measurement::DpAbove0p3),
            "dp_gt_0_5" | "dp>0.5" => Ok(Measurement::DpAbove0p5),
            "dp_gt_1_0" | "dp>1.0" => Ok(Measurement::DpAbove1p0),
            "dp_gt_2_5" | "dp>2.5" => Ok(Measurement::DpAbove2p5),
            "dp_gt_5_0" | "dp>5.0" => Ok(Measurement::DpAbove5p0),
            "dp_gt_10_0" | "dp>10.0" => Ok(Measurement::DpAbove10),
            "pm1_std" => Ok(Measurement::Pm1Std),
            "pm2_5_std" | "pm2.5_std" => Ok(Measurement::Pm25Std),
            "pm10_std" => Ok(Measurement::Pm10Std),
            "pm1_env" => Ok(Measurement::Pm1Env),
            "pm2_5_env" | "pm2.5_env" => Ok(Measurement::Pm25Env),
            "pm10_env" => Ok(Measurement::Pm10Env),
            other => Err(format!("unknown measurement column '{other}'")),
        }
    }
}

/// A raw file handed to the parser registry. The path matters for
/// reference stations, whose identity is encoded in the file name.
#[derive(Debug, Clone, Copy)]
pub struct FileSource<'a> {
    pub path: &'a Path,
    pub content: &'a str,
}

/// One decoded device file: identity plus a columnar table of
/// whitespace-stripped String fields in the family's raw layout.
#[derive(Debug, Clone)]
pub struct ParsedDeviceFile {
    pub device_id: String,
    pub family: DeviceFamily,
    pub df: DataFrame,
    /// Data-shaped rows dropped for a malformed field count (typically a
    /// truncated tail line written during power loss).
    pub skipped_rows: usize,
}
