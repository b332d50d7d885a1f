use super::KnownHeaderName;
use crate::{Error, Result};
use smartcow::SmartCow;
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};
use HeaderNameInner::{Known, Unknown};

/// The name of a http header. This can be either a
/// [`KnownHeaderName`] or a string representation of an unknown header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderName<'a>(pub(super) HeaderNameInner<'a>);

#[derive(Clone, PartialEq, Eq)]
pub(super) enum HeaderNameInner<'a> {
    Known(KnownHeaderName),
    Unknown(SmartCow<'a>),
}

impl Debug for HeaderNameInner<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Known(known) => Debug::fmt(known, f),
            Unknown(name) => Debug::fmt(&**name, f),
        }
    }
}

impl<'a> HeaderName<'a> {
    /// Convert a potentially-borrowed header name to a static header
    /// name _by value_.
    #[must_use]
    pub fn into_owned(self) -> HeaderName<'static> {
        HeaderName(match self.0 {
            Known(known) => Known(known),
            Unknown(name) => Unknown(name.into_owned()),
        })
    }

    /// Convert a potentially-borrowed header name to a static header
    /// name by cloning if needed from a borrow. If you have ownership of
    /// a header name with a non-static lifetime, prefer `into_owned`.
    #[must_use]
    pub fn to_owned(&self) -> HeaderName<'static> {
        self.clone().into_owned()
    }

    /// Determine if this header name contains only legal characters: it
    /// must be non-empty and free of `:`, CR, LF, and surrounding
    /// whitespace.
    pub fn is_valid(&self) -> bool {
        match &self.0 {
            Known(_) => true,
            Unknown(name) => is_valid_name(name),
        }
    }

    /// Compare two header names, ignoring ascii case for unknown names.
    pub fn matches(&self, other: &HeaderName<'_>) -> bool {
        match (&self.0, &other.0) {
            (Known(a), Known(b)) => a == b,
            (Unknown(a), Unknown(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

pub(super) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .bytes()
            .any(|b| matches!(b, b':' | b'\r' | b'\n' | b' ' | b'\t'))
}

impl PartialEq<KnownHeaderName> for HeaderName<'_> {
    fn eq(&self, other: &KnownHeaderName) -> bool {
        match &self.0 {
            Known(known) => known == other,
            Unknown(_) => false,
        }
    }
}

impl From<String> for HeaderName<'static> {
    fn from(s: String) -> Self {
        Self(match s.parse::<KnownHeaderName>() {
            Ok(known) => Known(known),
            Err(()) => Unknown(SmartCow::Owned(s.into())),
        })
    }
}

impl<'a> From<&'a str> for HeaderName<'a> {
    fn from(s: &'a str) -> Self {
        Self(match s.parse::<KnownHeaderName>() {
            Ok(known) => Known(known),
            Err(()) => Unknown(SmartCow::Borrowed(s)),
        })
    }
}

impl FromStr for HeaderName<'static> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(known) = s.parse::<KnownHeaderName>() {
            return Ok(known.into());
        }
        if is_valid_name(s) {
            Ok(HeaderName(Unknown(SmartCow::Owned(s.into()))))
        } else {
            Err(Error::MalformedHeader(s.to_string()))
        }
    }
}

impl AsRef<str> for HeaderName<'_> {
    fn as_ref(&self) -> &str {
        match &self.0 {
            Known(known) => known.as_ref(),
            Unknown(name) => name,
        }
    }
}

impl Display for HeaderName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
