use crate::errors::ParserError;
use crate::model::{DeviceFamily, FileSource, ParsedDeviceFile};
use crate::registry::DeviceFileParser;

use super::parse_fixed_station;

/// Fixed station with temperature/humidity/pressure/altitude columns
/// appended to the shared layout. The environmental block is unused
/// downstream, so rows are decoded up to the measurement block and the
/// trailing four fields are dropped on the floor.
pub struct BetaStationParser;

impl Default for BetaStationParser {
    fn default() -> Self {
        Self
    }
}

impl BetaStationParser {
    const NAME: &'static str = "BETA_STATION";
    /// date, time, battery, fix, lat, lon, six count bins, six PM columns,
    /// temp, RH, pressure, altitude.
    const FIELD_COUNT: usize = 22;
}

impl DeviceFileParser for BetaStationParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::BetaStation
    }

    fn parse(&self, source: &FileSource<'_>) -> Result<ParsedDeviceFile, ParserError> {
        parse_fixed_station(
            Self::NAME,
            DeviceFamily::BetaStation,
            Self::FIELD_COUNT,
            source.content,
        )
    }
}
