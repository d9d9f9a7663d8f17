//! Error classification shared by every layer.

use std::fmt;

/// Classification of a failure, independent of where it originated.
///
/// Store adapters produce `BadRequest`, `NotFound` and `Internal`; the order
/// orchestrator additionally produces `Unprocessable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input syntax, e.g. an identifier that is not 24 hex digits.
    BadRequest,
    /// Well-formed input that violates a business rule.
    Unprocessable,
    /// A single-entity lookup found nothing.
    NotFound,
    /// Infrastructure failure, cancellation or deadline expiry.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::BadRequest => "bad request",
            ErrorKind::Unprocessable => "unprocessable entity",
            ErrorKind::NotFound => "not found",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}
