use std::os::fd::RawFd;

#[derive(Debug, thiserror::Error)]
pub enum FiledesError {
    #[error("{context}: {source}")]
    QueryFailed {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("unexpected platform data: {0}")]
    ProtocolViolation(String),
    #[error("{op} failed: {source}")]
    SocketOption {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("fd {fd} is not a socket ({kind})")]
    NotASocket { fd: RawFd, kind: String },
    #[error("serialization error: {0}")]
    Serialization(#[source] std::io::Error),
}

impl FiledesError {
    /// Wrap the current `errno` as a `QueryFailed`.
    pub(crate) fn last_os_query(context: impl Into<String>) -> Self {
        Self::QueryFailed {
            context: context.into(),
            source: std::io::Error::last_os_error(),
        }
    }

    /// The raw OS error code behind this error, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::QueryFailed { source, .. }
            | Self::SocketOption { source, .. }
            | Self::Serialization(source) => source.raw_os_error(),
            _ => None,
        }
    }
}
