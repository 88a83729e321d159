pub mod json;
pub mod pretty;
pub mod tsv;

use std::io::Write;
use std::os::fd::RawFd;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::descriptor::{FileDescriptor, FileKind, fds_of};
use crate::error::FiledesError;

/// What we found out about one listed descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DescriptorReport {
    pub pid: u32,
    pub fd: RawFd,
    pub local: bool,
    pub kind: ReportKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    File(FileKind),
    /// Closed between listing and inspection.
    Closed,
    /// Inspection was not requested.
    Unchecked,
}

impl ReportKind {
    pub fn label(&self) -> String {
        match self {
            Self::File(kind) => kind.to_string(),
            Self::Closed => "closed".to_string(),
            Self::Unchecked => "-".to_string(),
        }
    }
}

impl Serialize for ReportKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::File(kind) => kind.serialize(serializer),
            Self::Closed => serializer.serialize_str("closed"),
            Self::Unchecked => serializer.serialize_none(),
        }
    }
}

/// List and (optionally) inspect the descriptors of one process.
///
/// A descriptor that vanished before it could be stat'ed is reported as
/// `Closed`; any other inspection failure is an error.
pub fn collect_reports(
    pid: Option<u32>,
    inspect: bool,
) -> Result<Vec<DescriptorReport>, FiledesError> {
    fds_of(pid)?
        .into_iter()
        .map(|fd| report_for(&fd, inspect))
        .collect()
}

fn report_for(fd: &FileDescriptor, inspect: bool) -> Result<DescriptorReport, FiledesError> {
    let kind = if !inspect {
        ReportKind::Unchecked
    } else {
        match fd.kind() {
            Ok(kind) => ReportKind::File(kind),
            Err(e) if is_vanished(&e) => {
                log::warn!("pid {} fd {}: closed before inspection", fd.pid(), fd.fd());
                ReportKind::Closed
            }
            Err(e) => return Err(e),
        }
    };
    Ok(DescriptorReport {
        pid: fd.pid(),
        fd: fd.fd(),
        local: fd.is_local(),
        kind,
    })
}

/// `EBADF` for our own descriptors, `ENOENT` for a /proc entry that went away.
fn is_vanished(err: &FiledesError) -> bool {
    matches!(err.raw_os_error(), Some(libc::EBADF) | Some(libc::ENOENT))
}

/// Write descriptor reports in the specified format.
pub fn write_reports(
    reports: &[DescriptorReport],
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<(), FiledesError> {
    match format {
        OutputFormat::Tsv => tsv::write_tsv(reports, writer),
        OutputFormat::Json => json::write_json(reports, writer),
        OutputFormat::Pretty => pretty::write_pretty(reports, writer),
    }
}
