use crate::Status;
use std::str::Utf8Error;
use thiserror::Error;

/// Concrete errors that occur within lantern's HTTP implementation
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// [`std::io::Error`]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// connection was closed before a request line was received
    #[error("Connection closed by client")]
    Closed,

    /// the request line was missing, had the wrong number of parts, or
    /// contained bytes that could not be interpreted
    #[error("Malformed request line")]
    MalformedRequestLine,

    /// a header line violated an invariant, such as whitespace before
    /// the colon or a control byte in the value
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// a multipart body was missing its boundary, a part header block,
    /// or a content-disposition name
    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    /// a percent- or base64-encoded payload could not be decoded
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// a quality weight parameter was present but not a decimal number
    #[error("Malformed quality weight: {0}")]
    MalformedWeight(String),

    /// the content-length header was present but not a non-negative integer
    #[error("Invalid content-length")]
    InvalidContentLength,

    /// the declared content-length exceeded the configured ceiling
    #[error("Request body too long. Maximum {0} bytes")]
    BodyTooLarge(u64),

    /// the read deadline expired after the request line was received
    #[error("Timed out reading the request")]
    ReadTimeout,

    /// to mitigate against malicious HTTP clients, we do not allow request
    /// heads beyond the configured length
    #[error("Headers were malformed or longer than allowed")]
    HeadersTooLong,

    /// a request body carried a media type with no registered decoder
    #[error("Unsupported media type {0}")]
    UnsupportedMediaType(String),

    /// a cookie name contained bytes outside the RFC 6265 token alphabet
    #[error("Invalid cookie name {0:?}")]
    InvalidCookieName(String),

    /// we expected utf8, but there was an encoding error
    #[error(transparent)]
    EncodingError(#[from] Utf8Error),

    /// an attempt was made to write to or configure a response that has
    /// already been closed
    #[error("Response already closed")]
    ResponseClosed,

    /// an attempt was made to mutate status, headers, or cookies after the
    /// first body byte froze them
    #[error("Headers already sent")]
    HeadersAlreadySent,

    /// an attempt was made to mutate a collection after it was latched
    /// read-only
    #[error("Collection is latched read-only")]
    ReadOnly,

    /// a handler failed in a way that carries no protocol meaning
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The wire status this error reports as, if it is visible on the wire
    /// at all. Connection-level errors (`Io`, `Closed`) return `None` and
    /// tear the connection down silently.
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::MalformedRequestLine
            | Error::MalformedHeader(_)
            | Error::MalformedMultipart(_)
            | Error::MalformedEncoding(_)
            | Error::MalformedWeight(_)
            | Error::InvalidContentLength
            | Error::InvalidCookieName(_)
            | Error::HeadersTooLong
            | Error::EncodingError(_) => Some(Status::BadRequest),

            Error::BodyTooLarge(_) => Some(Status::PayloadTooLarge),

            Error::ReadTimeout => Some(Status::RequestTimeout),

            Error::UnsupportedMediaType(_) => Some(Status::UnsupportedMediaType),

            Error::ResponseClosed
            | Error::HeadersAlreadySent
            | Error::ReadOnly
            | Error::Internal(_) => Some(Status::InternalServerError),

            Error::Io(_) | Error::Closed => None,
        }
    }

    /// true for the kinds that represent misuse of the library rather
    /// than a protocol violation by the peer. These are never described
    /// on the wire; they surface as a bare 500.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Error::ResponseClosed | Error::HeadersAlreadySent | Error::ReadOnly
        )
    }

    /// true for the kinds that describe a protocol violation by the
    /// peer. Only these are safe to describe on the wire; every other
    /// failure is reported as a bare 500 carrying no detail.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedRequestLine
                | Error::MalformedHeader(_)
                | Error::MalformedMultipart(_)
                | Error::MalformedEncoding(_)
                | Error::MalformedWeight(_)
                | Error::InvalidContentLength
                | Error::InvalidCookieName(_)
                | Error::HeadersTooLong
                | Error::EncodingError(_)
                | Error::BodyTooLarge(_)
                | Error::ReadTimeout
                | Error::UnsupportedMediaType(_)
        )
    }
}

/// this crate's result type
pub type Result<T> = std::result::Result<T, Error>;
