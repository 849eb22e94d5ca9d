pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use model::{DeviceFamily, FileSource, Measurement, ParsedDeviceFile};
pub use registry::{parse_device_file, parse_with_parsers, DeviceFileParser};

#[cfg(test)]
mod tests;
