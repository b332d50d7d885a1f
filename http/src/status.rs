use crate::Error;
use std::{
    convert::TryFrom,
    fmt::{self, Debug, Display},
};

/// The reason phrase used for status codes outside the registry.
pub const FALLBACK_REASON: &str = "Non-Standard Status Code";

/// HTTP response status codes.
///
/// As defined by [rfc7231 section 6](https://tools.ietf.org/html/rfc7231#section-6).
/// Codes outside this registry are still representable on a response as a
/// bare `u16`; they serialise with [`FALLBACK_REASON`].
#[repr(u16)]
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Status {
    /// 100 Continue
    Continue = 100,

    /// 101 Switching Protocols
    SwitchingProtocols = 101,

    /// 200 Ok
    Ok = 200,

    /// 201 Created
    Created = 201,

    /// 202 Accepted
    Accepted = 202,

    /// 203 Non Authoritative Information
    NonAuthoritativeInformation = 203,

    /// 204 No Content
    NoContent = 204,

    /// 205 Reset Content
    ResetContent = 205,

    /// 206 Partial Content
    PartialContent = 206,

    /// 300 Multiple Choice
    MultipleChoice = 300,

    /// 301 Moved Permanently
    MovedPermanently = 301,

    /// 302 Found
    Found = 302,

    /// 303 See Other
    SeeOther = 303,

    /// 304 Not Modified
    NotModified = 304,

    /// 305 Use Proxy
    UseProxy = 305,

    /// 307 Temporary Redirect
    TemporaryRedirect = 307,

    /// 308 Permanent Redirect
    PermanentRedirect = 308,

    /// 400 Bad Request
    BadRequest = 400,

    /// 401 Unauthorized
    Unauthorized = 401,

    /// 402 Payment Required
    PaymentRequired = 402,

    /// 403 Forbidden
    Forbidden = 403,

    /// 404 Not Found
    NotFound = 404,

    /// 405 Method Not Allowed
    MethodNotAllowed = 405,

    /// 406 Not Acceptable
    NotAcceptable = 406,

    /// 407 Proxy Authentication Required
    ProxyAuthenticationRequired = 407,

    /// 408 Request Timeout
    RequestTimeout = 408,

    /// 409 Conflict
    Conflict = 409,

    /// 410 Gone
    Gone = 410,

    /// 411 Length Required
    LengthRequired = 411,

    /// 412 Precondition Failed
    PreconditionFailed = 412,

    /// 413 Payload Too Large
    PayloadTooLarge = 413,

    /// 414 URI Too Long
    UriTooLong = 414,

    /// 415 Unsupported Media Type
    UnsupportedMediaType = 415,

    /// 416 Requested Range Not Satisfiable
    RequestedRangeNotSatisfiable = 416,

    /// 417 Expectation Failed
    ExpectationFailed = 417,

    /// 418 I'm a teapot
    ImATeapot = 418,

    /// 426 Upgrade Required
    UpgradeRequired = 426,

    /// 429 Too Many Requests
    TooManyRequests = 429,

    /// 431 Request Header Fields Too Large
    RequestHeaderFieldsTooLarge = 431,

    /// 500 Internal Server Error
    InternalServerError = 500,

    /// 501 Not Implemented
    NotImplemented = 501,

    /// 502 Bad Gateway
    BadGateway = 502,

    /// 503 Service Unavailable
    ServiceUnavailable = 503,

    /// 504 Gateway Timeout
    GatewayTimeout = 504,

    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported = 505,
}

impl Status {
    /// Returns `true` if the status code is `1xx` range.
    pub fn is_informational(&self) -> bool {
        let num: u16 = (*self).into();
        (100..200).contains(&num)
    }

    /// Returns `true` if the status code is the `2xx` range.
    pub fn is_success(&self) -> bool {
        let num: u16 = (*self).into();
        (200..300).contains(&num)
    }

    /// Returns `true` if the status code is the `4xx` range.
    pub fn is_client_error(&self) -> bool {
        let num: u16 = (*self).into();
        (400..500).contains(&num)
    }

    /// Returns `true` if the status code is the `5xx` range.
    pub fn is_server_error(&self) -> bool {
        let num: u16 = (*self).into();
        (500..600).contains(&num)
    }

    /// The canonical reason phrase for this status code.
    pub fn canonical_reason(&self) -> &'static str {
        match self {
            Status::Continue => "Continue",
            Status::SwitchingProtocols => "Switching Protocols",
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::Accepted => "Accepted",
            Status::NonAuthoritativeInformation => "Non-Authoritative Information",
            Status::NoContent => "No Content",
            Status::ResetContent => "Reset Content",
            Status::PartialContent => "Partial Content",
            Status::MultipleChoice => "Multiple Choice",
            Status::MovedPermanently => "Moved Permanently",
            Status::Found => "Found",
            Status::SeeOther => "See Other",
            Status::NotModified => "Not Modified",
            Status::UseProxy => "Use Proxy",
            Status::TemporaryRedirect => "Temporary Redirect",
            Status::PermanentRedirect => "Permanent Redirect",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::PaymentRequired => "Payment Required",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::NotAcceptable => "Not Acceptable",
            Status::ProxyAuthenticationRequired => "Proxy Authentication Required",
            Status::RequestTimeout => "Request Timeout",
            Status::Conflict => "Conflict",
            Status::Gone => "Gone",
            Status::LengthRequired => "Length Required",
            Status::PreconditionFailed => "Precondition Failed",
            Status::PayloadTooLarge => "Payload Too Large",
            Status::UriTooLong => "URI Too Long",
            Status::UnsupportedMediaType => "Unsupported Media Type",
            Status::RequestedRangeNotSatisfiable => "Requested Range Not Satisfiable",
            Status::ExpectationFailed => "Expectation Failed",
            Status::ImATeapot => "I'm a teapot",
            Status::UpgradeRequired => "Upgrade Required",
            Status::TooManyRequests => "Too Many Requests",
            Status::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
            Status::BadGateway => "Bad Gateway",
            Status::ServiceUnavailable => "Service Unavailable",
            Status::GatewayTimeout => "Gateway Timeout",
            Status::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

/// Look up the reason phrase for an arbitrary numeric code, falling back
/// to [`FALLBACK_REASON`] for codes outside the registry.
pub fn reason_phrase(code: u16) -> &'static str {
    Status::try_from(code).map_or(FALLBACK_REASON, |status| status.canonical_reason())
}

/// A wire status code: either a registry [`Status`] or a bare `u16`.
/// This is the currency [`Response::set_status`][crate::Response::set_status]
/// accepts, so both spellings work at call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl From<Status> for StatusCode {
    fn from(status: Status) -> Self {
        Self(status as u16)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.0
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", *self as u16, self.canonical_reason())
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u16)
    }
}

impl From<Status> for u16 {
    fn from(code: Status) -> u16 {
        code as u16
    }
}

impl TryFrom<u16> for Status {
    type Error = Error;

    fn try_from(num: u16) -> Result<Self, Self::Error> {
        let status = match num {
            100 => Status::Continue,
            101 => Status::SwitchingProtocols,
            200 => Status::Ok,
            201 => Status::Created,
            202 => Status::Accepted,
            203 => Status::NonAuthoritativeInformation,
            204 => Status::NoContent,
            205 => Status::ResetContent,
            206 => Status::PartialContent,
            300 => Status::MultipleChoice,
            301 => Status::MovedPermanently,
            302 => Status::Found,
            303 => Status::SeeOther,
            304 => Status::NotModified,
            305 => Status::UseProxy,
            307 => Status::TemporaryRedirect,
            308 => Status::PermanentRedirect,
            400 => Status::BadRequest,
            401 => Status::Unauthorized,
            402 => Status::PaymentRequired,
            403 => Status::Forbidden,
            404 => Status::NotFound,
            405 => Status::MethodNotAllowed,
            406 => Status::NotAcceptable,
            407 => Status::ProxyAuthenticationRequired,
            408 => Status::RequestTimeout,
            409 => Status::Conflict,
            410 => Status::Gone,
            411 => Status::LengthRequired,
            412 => Status::PreconditionFailed,
            413 => Status::PayloadTooLarge,
            414 => Status::UriTooLong,
            415 => Status::UnsupportedMediaType,
            416 => Status::RequestedRangeNotSatisfiable,
            417 => Status::ExpectationFailed,
            418 => Status::ImATeapot,
            426 => Status::UpgradeRequired,
            429 => Status::TooManyRequests,
            431 => Status::RequestHeaderFieldsTooLarge,
            500 => Status::InternalServerError,
            501 => Status::NotImplemented,
            502 => Status::BadGateway,
            503 => Status::ServiceUnavailable,
            504 => Status::GatewayTimeout,
            505 => Status::HttpVersionNotSupported,
            _ => return Err(Error::Internal(format!("unrecognized status code {num}"))),
        };

        Ok(status)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_registry() {
        for code in [100u16, 101, 200, 206, 305, 307, 402, 417, 505] {
            let status = Status::try_from(code).unwrap();
            assert_eq!(u16::from(status), code);
        }
    }

    #[test]
    fn fallback_reason() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(402), "Payment Required");
        assert_eq!(reason_phrase(299), FALLBACK_REASON);
        assert_eq!(reason_phrase(999), FALLBACK_REASON);
    }
}
