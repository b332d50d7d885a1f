use super::{Csv, MediaType, OrderedCsv, Parameterised};
use crate::{Error, Result};
use smallvec::SmallVec;
use smartcow::SmartCow;
use std::{
    borrow::Cow,
    fmt::{self, Debug, Display, Formatter},
};

/// The right hand side of one `name: value` pair.
///
/// Wire values that are valid utf8 are kept as text; anything else is
/// kept as raw bytes and excluded from the string-typed accessors. The
/// structured readings of the header grammar all hang off this type: a
/// value can be re-read as a parameterised value, a comma-separated
/// list, a quality-weighted list, or a media type.
#[derive(Clone, PartialEq, Eq)]
pub struct HeaderValue {
    repr: Repr,
}

#[derive(Clone, PartialEq, Eq)]
enum Repr {
    Text(SmartCow<'static>),
    Raw(SmallVec<[u8; 32]>),
}

impl HeaderValue {
    /// Build a value from wire bytes, keeping utf8 content as text.
    pub(crate) fn parse(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::text(text.to_owned()),
            Err(_) => Self {
                repr: Repr::Raw(SmallVec::from_slice(bytes)),
            },
        }
    }

    fn text(text: String) -> Self {
        Self {
            repr: Repr::Text(SmartCow::Owned(text.into())),
        }
    }

    /// This value as a `&str`, or `None` when it is not utf8.
    pub fn as_str(&self) -> Option<&str> {
        match &self.repr {
            Repr::Text(text) => Some(text),
            Repr::Raw(_) => None,
        }
    }

    /// This value's bytes, whether or not they are utf8.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Text(text) => text.as_bytes(),
            Repr::Raw(raw) => raw,
        }
    }

    /// determine if this value is safe to put on the wire: free of
    /// \r, \n, and \0
    pub fn is_valid(&self) -> bool {
        memchr::memchr3(b'\r', b'\n', 0, self.as_bytes()).is_none()
    }

    fn require_text(&self) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| Error::MalformedHeader("non-text header value".into()))
    }

    /// Re-read this value as `value; name=param; flag`, the shape of
    /// `Content-Type` and `Content-Disposition`.
    ///
    /// # Errors
    ///
    /// `Error::MalformedHeader` for byte values;
    /// `Error::MalformedEncoding` for a parameter with no name.
    pub fn to_parameterised(&self, case_insensitive: bool) -> Result<Parameterised> {
        Parameterised::parse(self.require_text()?, case_insensitive)
    }

    /// Re-read this value as a comma-separated list.
    ///
    /// # Errors
    ///
    /// `Error::MalformedHeader` for byte values.
    pub fn to_csv(&self) -> Result<Csv> {
        Ok(Csv::parse(self.require_text()?))
    }

    /// Re-read this value as a quality-weighted list, the shape of
    /// `Accept-Encoding` and friends.
    ///
    /// # Errors
    ///
    /// `Error::MalformedHeader` for byte values;
    /// `Error::MalformedWeight` for a `q` parameter that is not a
    /// decimal.
    pub fn to_ordered_csv(&self, drop_unacceptable: bool) -> Result<OrderedCsv> {
        OrderedCsv::parse(self.require_text()?, drop_unacceptable)
    }

    /// Re-read this value as a `type/subtype` media type.
    ///
    /// # Errors
    ///
    /// `Error::MalformedHeader` for byte values or a value with no
    /// `type/subtype` pair.
    pub fn to_media_type(&self) -> Result<MediaType> {
        MediaType::parse(self.require_text()?)
    }
}

impl Debug for HeaderValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Text(text) => write!(f, "{:?}", &**text),
            Repr::Raw(raw) => write!(f, "{:?}", String::from_utf8_lossy(raw)),
        }
    }
}

impl Display for HeaderValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Text(text) => f.write_str(text),
            Repr::Raw(raw) => Display::fmt(&String::from_utf8_lossy(raw), f),
        }
    }
}

impl From<String> for HeaderValue {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<&'static str> for HeaderValue {
    fn from(text: &'static str) -> Self {
        Self {
            repr: Repr::Text(SmartCow::Borrowed(text)),
        }
    }
}

impl From<Cow<'static, str>> for HeaderValue {
    fn from(text: Cow<'static, str>) -> Self {
        match text {
            Cow::Borrowed(text) => text.into(),
            Cow::Owned(text) => Self::text(text),
        }
    }
}

impl From<Vec<u8>> for HeaderValue {
    fn from(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::text(text),
            Err(raw) => Self {
                repr: Repr::Raw(SmallVec::from_vec(raw.into_bytes())),
            },
        }
    }
}

impl From<&'static [u8]> for HeaderValue {
    fn from(bytes: &'static [u8]) -> Self {
        Self::parse(bytes)
    }
}

macro_rules! numeric_values {
    ($($t:ty),+) => {$(
        impl From<$t> for HeaderValue {
            fn from(value: $t) -> Self {
                Self::text(value.to_string())
            }
        }
    )+};
}

numeric_values!(u16, u32, u64, usize, i32, i64);

impl PartialEq<str> for HeaderValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for HeaderValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<[u8]> for HeaderValue {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}
