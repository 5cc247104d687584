use std::fmt;
use thiserror::Error;

/// The closed set of conditions the client can report.
///
/// Each kind carries a fixed code, a fixed human-readable text and a
/// severity. Only [`Severity::Notice`] kinds are reported without aborting
/// the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ReadTokenMissing,
    WriteTokenMissing,
    UnknownMethod,
    ReadTransactionFailed,
    WriteTransactionFailed,
    IdentifierNotProvided,
    ItemTypeNotSpecified,
    InvalidUploadOption,
    ApiError,
}

/// How a reported [`ErrorKind`] affects the call that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The call fails with a [`MediaError`].
    Warning,
    /// The call proceeds; the condition is recorded as a [`Notice`].
    Notice,
}

impl ErrorKind {
    /// Stable numeric code, shown as `[MEDIACOVE-<code>]` in log output.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::ReadTokenMissing => 1,
            ErrorKind::WriteTokenMissing => 2,
            ErrorKind::UnknownMethod => 3,
            ErrorKind::ReadTransactionFailed => 4,
            ErrorKind::WriteTransactionFailed => 5,
            ErrorKind::IdentifierNotProvided => 8,
            ErrorKind::ItemTypeNotSpecified => 9,
            ErrorKind::InvalidUploadOption => 10,
            ErrorKind::ApiError => 11,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            ErrorKind::ReadTokenMissing => "read token not provided",
            ErrorKind::WriteTokenMissing => "write token not provided",
            ErrorKind::UnknownMethod => "requested method not found",
            ErrorKind::ReadTransactionFailed => "read API transaction failed",
            ErrorKind::WriteTransactionFailed => "write API transaction failed",
            ErrorKind::IdentifierNotProvided => "ID not provided",
            ErrorKind::ItemTypeNotSpecified => "type not specified",
            ErrorKind::InvalidUploadOption => "upload options not supported for this file type",
            ErrorKind::ApiError => "unknown API error",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::InvalidUploadOption => Severity::Notice,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[MEDIACOVE-{:03}] {}", self.code(), self.text())
    }
}

/// A non-fatal condition raised while building a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Notice {
            kind,
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail {
            Some(ref detail) => write!(f, "{}: {}", self.kind, detail),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Main error type for media API operations
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("read token not provided")]
    ReadTokenMissing,

    #[error("write token not provided")]
    WriteTokenMissing,

    /// Verb did not resolve to any known read command
    #[error("requested method not found: {0}")]
    UnknownMethod(String),

    /// GET failed, returned a non-success status, or returned an unusable body
    #[error("read API transaction failed: {detail}")]
    ReadTransactionFailed {
        detail: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// POST failed, returned a non-success status, or returned an unusable body
    #[error("write API transaction failed: {detail}")]
    WriteTransactionFailed {
        detail: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("ID not provided: {0}")]
    IdentifierNotProvided(String),

    #[error("type not specified: {0:?}")]
    ItemTypeNotSpecified(String),

    /// Error reported by the remote service itself
    #[error("API error: {}", .0.as_deref().unwrap_or("unknown API error"))]
    Api(Option<String>),

    /// Base URL could not be built from the configuration
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl MediaError {
    /// Create a read transaction failure carrying the underlying cause
    pub fn read_failed(
        detail: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        MediaError::ReadTransactionFailed {
            detail: detail.into(),
            source,
        }
    }

    /// Create a write transaction failure carrying the underlying cause
    pub fn write_failed(
        detail: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        MediaError::WriteTransactionFailed {
            detail: detail.into(),
            source,
        }
    }

    /// The catalog kind of this error, if it belongs to the catalog.
    pub fn kind(&self) -> Option<ErrorKind> {
        let kind = match self {
            MediaError::ReadTokenMissing => ErrorKind::ReadTokenMissing,
            MediaError::WriteTokenMissing => ErrorKind::WriteTokenMissing,
            MediaError::UnknownMethod(_) => ErrorKind::UnknownMethod,
            MediaError::ReadTransactionFailed { .. } => ErrorKind::ReadTransactionFailed,
            MediaError::WriteTransactionFailed { .. } => ErrorKind::WriteTransactionFailed,
            MediaError::IdentifierNotProvided(_) => ErrorKind::IdentifierNotProvided,
            MediaError::ItemTypeNotSpecified(_) => ErrorKind::ItemTypeNotSpecified,
            MediaError::Api(_) => ErrorKind::ApiError,
            MediaError::UrlParse(_) => return None,
        };
        Some(kind)
    }

    /// The remote service's own error text, if this is an API error
    pub fn api_message(&self) -> Option<&str> {
        match self {
            MediaError::Api(message) => message.as_deref(),
            _ => None,
        }
    }
}

/// Result type for media API operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Log a catalog condition if notice display is enabled.
///
/// Notices go out at `warn`, fatal kinds at `error`.
pub(crate) fn report(show: bool, kind: ErrorKind, detail: &dyn fmt::Display) {
    if !show {
        return;
    }
    match kind.severity() {
        Severity::Notice => log::warn!("{} ({})", kind, detail),
        Severity::Warning => log::error!("{} ({})", kind, detail),
    }
}
