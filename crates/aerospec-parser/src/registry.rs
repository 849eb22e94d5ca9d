use std::path::Path;

use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{BetaStationParser, BreakoutStationParser, ReferenceStationParser};
use crate::model::{DeviceFamily, FileSource, ParsedDeviceFile};

pub trait DeviceFileParser {
    fn name(&self) -> &'static str;
    fn family(&self) -> DeviceFamily;
    fn parse(&self, source: &FileSource<'_>) -> Result<ParsedDeviceFile, ParserError>;
}

pub fn parse_device_file(path: &Path, content: &str) -> Result<ParsedDeviceFile, ParserError> {
    let beta = BetaStationParser;
    let breakout = BreakoutStationParser;
    let reference = ReferenceStationParser;
    let parsers: [&dyn DeviceFileParser; 3] = [&beta, &breakout, &reference];
    parse_with_parsers(&FileSource { path, content }, &parsers)
}

pub fn parse_with_parsers(
    source: &FileSource<'_>,
    parsers: &[&dyn DeviceFileParser],
) -> Result<ParsedDeviceFile, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(source) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
