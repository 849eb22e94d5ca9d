use crate::errors::ParserError;
use crate::model::{DeviceFamily, FileSource, ParsedDeviceFile};
use crate::registry::DeviceFileParser;

use super::parse_fixed_station;

/// Fixed station without the environmental block: the row ends at the last
/// PM column.
pub struct BreakoutStationParser;

impl Default for BreakoutStationParser {
    fn default() -> Self {
        Self
    }
}

impl BreakoutStationParser {
    const NAME: &'static str = "BREAKOUT_STATION";
    const FIELD_COUNT: usize = 18;
}

impl DeviceFileParser for BreakoutStationParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::BreakoutStation
    }

    fn parse(&self, source: &FileSource<'_>) -> Result<ParsedDeviceFile, ParserError> {
        parse_fixed_station(
            Self::NAME,
            DeviceFamily::BreakoutStation,
            Self::FIELD_COUNT,
            source.content,
        )
    }
}
