use super::Parameterised;
use crate::{Error, Result};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A `type/subtype` media type with its parameters, as carried by
/// `Content-Type` headers and multipart part headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    subtype: String,
    params: Parameterised,
}

impl MediaType {
    /// Parse a media type such as `text/html; charset=utf-8`. Parameter
    /// names are case-insensitive.
    ///
    /// # Errors
    ///
    /// `Error::MalformedHeader` when the value before the first `;` is
    /// not a `type/subtype` pair.
    pub fn parse(raw: &str) -> Result<Self> {
        let params = Parameterised::parse(raw, true)?;
        let (kind, subtype) = params
            .value()
            .split_once('/')
            .ok_or_else(|| Error::MalformedHeader(format!("media type {raw:?}")))?;

        if kind.is_empty() || subtype.is_empty() {
            return Err(Error::MalformedHeader(format!("media type {raw:?}")));
        }

        Ok(Self {
            kind: kind.to_owned(),
            subtype: subtype.to_owned(),
            params,
        })
    }

    /// The part before the slash.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The part after the slash.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` in lowercase, without parameters.
    pub fn essence(&self) -> String {
        format!(
            "{}/{}",
            self.kind.to_ascii_lowercase(),
            self.subtype.to_ascii_lowercase()
        )
    }

    /// Look up a parameter, case-insensitively by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.param(name)
    }

    /// Two media types are equivalent when both parts match
    /// case-insensitively, treating `*` on either side of either part as
    /// a match. Parameters are not considered.
    pub fn is_equivalent(&self, other: &MediaType) -> bool {
        part_matches(&self.kind, &other.kind) && part_matches(&self.subtype, &other.subtype)
    }
}

fn part_matches(a: &str, b: &str) -> bool {
    a == "*" || b == "*" || a.eq_ignore_ascii_case(b)
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (name, value) in self.params.params() {
            match value {
                Some(value) => write!(f, ";{name}={value}")?,
                None => write!(f, ";{name}")?,
            }
        }
        Ok(())
    }
}
