use super::header_name::{HeaderName, HeaderNameInner};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

impl Display for KnownHeaderName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<KnownHeaderName> for HeaderName<'_> {
    fn from(known: KnownHeaderName) -> Self {
        Self(HeaderNameInner::Known(known))
    }
}

impl PartialEq<HeaderName<'_>> for KnownHeaderName {
    fn eq(&self, other: &HeaderName) -> bool {
        match &other.0 {
            HeaderNameInner::Known(known) => self == known,
            HeaderNameInner::Unknown(_) => false,
        }
    }
}

macro_rules! known_headers {
    (
        $(
            ($capitalized:literal, $variant:tt)
        ),+
    ) => {

        /// Header names the engine can represent without storing a
        /// string. Prefer a `KnownHeaderName` variant over a `&'static
        /// str` wherever possible, as it skips parsing the name entirely.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        #[repr(u8)]
        pub enum KnownHeaderName {
            $(
                #[doc = concat!("The `", $capitalized, "` header.")]
                $variant,
            )+
        }

        impl AsRef<str> for KnownHeaderName {
            fn as_ref(&self) -> &str {
                match self {
                    $( Self::$variant => $capitalized, )+
                }
            }
        }

        impl FromStr for KnownHeaderName {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if !s.is_ascii() { return Err(()); }

                $( if s.eq_ignore_ascii_case($capitalized) { Ok(Self::$variant) } else )+
                { Err(()) }
            }
        }
    }
}

known_headers! {
    ("Host", Host),
    ("Date", Date),

    ("Accept", Accept),
    ("Accept-Charset", AcceptCharset),
    ("Accept-Encoding", AcceptEncoding),
    ("Accept-Language", AcceptLanguage),
    ("Accept-Ranges", AcceptRanges),
    ("Age", Age),
    ("Allow", Allow),
    ("Authorization", Authorization),
    ("Cache-Control", CacheControl),
    ("Connection", Connection),
    ("Content-Disposition", ContentDisposition),
    ("Content-Encoding", ContentEncoding),
    ("Content-Language", ContentLanguage),
    ("Content-Length", ContentLength),
    ("Content-Location", ContentLocation),
    ("Content-Range", ContentRange),
    ("Content-Type", ContentType),
    ("Cookie", Cookie),
    ("ETag", Etag),
    ("Expect", Expect),
    ("Expires", Expires),
    ("From", From),
    ("If-Match", IfMatch),
    ("If-Modified-Since", IfModifiedSince),
    ("If-None-Match", IfNoneMatch),
    ("If-Range", IfRange),
    ("If-Unmodified-Since", IfUnmodifiedSince),
    ("Keep-Alive", KeepAlive),
    ("Last-Modified", LastModified),
    ("Location", Location),
    ("Max-Forwards", MaxForwards),
    ("Origin", Origin),
    ("Pragma", Pragma),
    ("Proxy-Authenticate", ProxyAuthenticate),
    ("Proxy-Authorization", ProxyAuthorization),
    ("Range", Range),
    ("Referer", Referer),
    ("Retry-After", RetryAfter),
    ("Server", Server),
    ("Set-Cookie", SetCookie),
    ("Strict-Transport-Security", StrictTransportSecurity),
    ("TE", Te),
    ("Trailer", Trailer),
    ("Transfer-Encoding", TransferEncoding),
    ("Upgrade", Upgrade),
    ("User-Agent", UserAgent),
    ("Vary", Vary),
    ("Via", Via),
    ("WWW-Authenticate", WwwAuthenticate),
    ("Warning", Warning),
    ("X-Content-Type-Options", XcontentTypeOptions),
    ("X-Forwarded-For", XforwardedFor),
    ("X-Forwarded-Host", XforwardedHost),
    ("X-Forwarded-Proto", XforwardedProto),
    ("X-Frame-Options", XframeOptions),
    ("X-Request-Id", XrequestId),
    ("X-Requested-With", XrequestedWith)
}
