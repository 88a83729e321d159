use std::io::Write;

use crate::error::FiledesError;
use crate::output::DescriptorReport;

/// Write descriptor reports as TSV.
///
/// Output: header row + one row per descriptor, in listing order.
/// Columns are tab-separated: pid, fd, kind.
pub fn write_tsv(
    reports: &[DescriptorReport],
    writer: &mut impl Write,
) -> Result<(), FiledesError> {
    writeln!(writer, "pid\tfd\tkind").map_err(FiledesError::Serialization)?;

    for report in reports {
        writeln!(
            writer,
            "{}\t{}\t{}",
            report.pid,
            report.fd,
            escape_tsv(&report.kind.label()),
        )
        .map_err(FiledesError::Serialization)?;
    }

    Ok(())
}

/// Escape tabs and newlines in a string for TSV output.
fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}
