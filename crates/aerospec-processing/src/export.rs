use std::fs::File;
use std::io::Write;
use std::path::Path;

use polars::prelude::*;

use crate::error::ProcessingError;

/// Serialize a table as delimited text, header first, in the table's stable
/// column order.
pub fn write_delimited<W: Write>(frame: &DataFrame, writer: W) -> Result<(), ProcessingError> {
    let mut out = frame.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut out)?;
    Ok(())
}

pub fn write_delimited_path(frame: &DataFrame, path: &Path) -> Result<(), ProcessingError> {
    write_delimited(frame, File::create(path)?)
}
