use std::fmt;
use std::io;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SaverError {
    #[error("Refusing to touch '{0}': outside the managed folders")]
    SecurityViolation(String),
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("IO error on '{path}': {source}")]
    IoFailure {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Name '{0}' is already taken and cannot be reused")]
    NameCollision(String),
    #[error("Operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Stable reason code handed to the presentation layer alongside a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    SecurityViolation,
    SourceUnavailable,
    IoFailure,
    NameCollision,
    Timeout,
    NotFound,
}

impl ReasonCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecurityViolation => "security_violation",
            Self::SourceUnavailable => "source_unavailable",
            Self::IoFailure => "io_failure",
            Self::NameCollision => "name_collision",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SaverError {
    pub fn io(path: impl AsRef<std::path::Path>, source: io::Error) -> Self {
        Self::IoFailure {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    #[must_use]
    pub const fn reason(&self) -> ReasonCode {
        match self {
            Self::SecurityViolation(_) => ReasonCode::SecurityViolation,
            Self::SourceUnavailable(_) => ReasonCode::SourceUnavailable,
            Self::IoFailure { .. } => ReasonCode::IoFailure,
            Self::NameCollision(_) => ReasonCode::NameCollision,
            Self::Timeout(_) => ReasonCode::Timeout,
            Self::NotFound(_) => ReasonCode::NotFound,
        }
    }

    /// Security violations and missing targets never touch the filesystem.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::SecurityViolation(_) | Self::NotFound(_))
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<io::Error> for SaverError {
    fn from(err: io::Error) -> Self {
        Self::IoFailure {
            path: String::new(),
            source: err,
        }
    }
}

pub type Result<T> = std::result::Result<T, SaverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_follow_variants() {
        let err = SaverError::SecurityViolation("/etc/passwd".into());
        assert_eq!(err.reason(), ReasonCode::SecurityViolation);
        assert!(err.is_terminal());

        let err = SaverError::io("/tmp/x", io::Error::other("disk full"));
        assert_eq!(err.reason().as_str(), "io_failure");
        assert!(!err.is_terminal());

        let err = SaverError::Timeout(Duration::from_secs(30));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Operation timed out after 30000ms");
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err: SaverError = io::Error::new(io::ErrorKind::PermissionDenied, "EACCES").into();
        match err {
            SaverError::IoFailure { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
