//! Request failures
//!
//! Transport errors from `ureq` are sorted into a few kinds callers can
//! branch on. HTTP status codes are never errors here.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(#[source] ureq::Error),

    #[error("tls failure: {0}")]
    Tls(String),

    #[error("request execution failed: {0}")]
    Network(#[source] ureq::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The request never reached the server
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connect(_))
    }
}

// Only errors that can happen before a byte is written. Reset and abort can
// also arrive after the request went out, so they stay `Network`.
fn is_connect_io(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrNotAvailable
    )
}

impl From<ureq::Error> for HttpError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(t) => Self::Timeout(t.to_string()),
            ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => {
                Self::Timeout(e.to_string())
            }
            ureq::Error::Io(ref e) if is_connect_io(e.kind()) => Self::Connect(err),
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => Self::Connect(err),
            ureq::Error::Tls(msg) => Self::Tls(msg.to_string()),
            ureq::Error::Rustls(e) => Self::Tls(e.to_string()),
            ureq::Error::BadUri(reason) => Self::InvalidUrl {
                url: String::new(),
                reason,
            },
            other => Self::Network(other),
        }
    }
}

/// Turn a failed request into an absent value after logging it.
///
/// Callers that cannot act on the cause get the old "response or nothing"
/// shape without the client swallowing errors for everyone else.
pub trait OrLog<T> {
    fn or_log(self) -> Option<T>;
}

impl<T> OrLog<T> for Result<T> {
    fn or_log(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, "request execution failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_timeout_is_timeout() {
        let err = HttpError::from(ureq::Error::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            "read timed out",
        )));
        assert!(err.is_timeout());
        assert!(!err.is_connection_failure());
    }

    #[test]
    fn test_refused_is_connection_failure() {
        let err = HttpError::from(ureq::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "refused",
        )));
        assert!(err.is_connection_failure());

        assert!(HttpError::from(ureq::Error::ConnectionFailed).is_connection_failure());
        assert!(HttpError::from(ureq::Error::HostNotFound).is_connection_failure());
    }

    #[test]
    fn test_other_io_is_network() {
        let err = HttpError::from(ureq::Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "eof",
        )));
        assert!(matches!(err, HttpError::Network(_)));
    }

    #[test]
    fn test_reset_after_send_is_network() {
        for kind in [io::ErrorKind::ConnectionReset, io::ErrorKind::ConnectionAborted] {
            let err = HttpError::from(ureq::Error::Io(io::Error::new(kind, "reset by peer")));
            assert!(matches!(err, HttpError::Network(_)), "{kind:?} -> {err:?}");
            assert!(!err.is_connection_failure());
        }
    }

    #[test]
    fn test_or_log() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.or_log(), Some(7));

        let failed: Result<u32> = Err(HttpError::Timeout("connect".to_string()));
        assert_eq!(failed.or_log(), None);
    }

    #[test]
    fn test_display() {
        let err = HttpError::InvalidHeader {
            name: "bad name".to_string(),
        };
        assert_eq!(err.to_string(), "invalid header 'bad name'");
    }
}
