use std::io::Write;

use crate::error::FiledesError;
use crate::output::{DescriptorReport, ReportKind};

/// Write one human-readable line per descriptor, grouped under a `# pid` header.
pub fn write_pretty(
    reports: &[DescriptorReport],
    writer: &mut impl Write,
) -> Result<(), FiledesError> {
    write_pretty_inner(reports, writer).map_err(FiledesError::Serialization)
}

fn write_pretty_inner(
    reports: &[DescriptorReport],
    w: &mut impl Write,
) -> Result<(), std::io::Error> {
    let mut current_pid = None;
    for report in reports {
        if current_pid != Some(report.pid) {
            writeln!(w, "# pid {}", report.pid)?;
            current_pid = Some(report.pid);
        }
        let locality = if report.local { "local" } else { "remote" };
        match report.kind {
            ReportKind::File(kind) => writeln!(w, "<{locality} {kind} file #{}>", report.fd)?,
            ReportKind::Closed => writeln!(w, "{}: closed", report.fd)?,
            ReportKind::Unchecked => writeln!(w, "{}", report.fd)?,
        }
    }
    Ok(())
}
