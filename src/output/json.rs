use std::io::Write;

use crate::error::FiledesError;
use crate::output::DescriptorReport;

/// Write descriptor reports as a JSON array to the given writer.
pub fn write_json(
    reports: &[DescriptorReport],
    writer: &mut impl Write,
) -> Result<(), FiledesError> {
    serde_json::to_writer_pretty(&mut *writer, reports)
        .map_err(|e| FiledesError::Serialization(std::io::Error::other(e.to_string())))?;
    writeln!(writer).map_err(FiledesError::Serialization)
}
