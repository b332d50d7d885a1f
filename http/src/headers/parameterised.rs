use crate::{codec::QuotedListParser, Error, Result};
use std::fmt::{self, Display, Formatter};

/// A header value of the shape `value; name=param; flag`, such as
/// `Content-Type` or `Content-Disposition`.
///
/// The raw value is split at the first unquoted `;`; the remainder is
/// parsed as name-value pairs. Double-quoted parameter values may span
/// whitespace and delimiters and may contain backslash escape sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameterised {
    value: String,
    params: Vec<(String, Option<String>)>,
    case_insensitive: bool,
}

impl Parameterised {
    /// Parse a raw header value. When `case_insensitive` is set,
    /// parameter names are folded to lowercase and looked up
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// `Error::MalformedEncoding` on a parameter with a zero-length name.
    pub fn parse(raw: &str, case_insensitive: bool) -> Result<Self> {
        let segments = QuotedListParser::new()
            .with_delimiter(b';')
            .with_escapes(true)
            .parse(raw);

        let mut segments = segments.into_iter();
        let value = segments.next().unwrap_or_default();

        let mut params = Vec::new();
        for segment in segments {
            let (name, param) = match segment.split_once('=') {
                Some((name, param)) => (name, Some(param.to_owned())),
                None => (&*segment, None),
            };
            if name.is_empty() {
                return Err(Error::MalformedEncoding(format!(
                    "parameter with empty name in {raw:?}"
                )));
            }
            let name = if case_insensitive {
                name.to_ascii_lowercase()
            } else {
                name.to_owned()
            };
            params.push((name, param));
        }

        Ok(Self {
            value,
            params,
            case_insensitive,
        })
    }

    /// The primary value, before the first unquoted `;`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Look up a parameter value by name. Returns `None` when the
    /// parameter is absent; a parameter present without `=` yields
    /// `Some(None)` from [`Parameterised::param_entry`] and `None` here.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.param_entry(name).and_then(Option::as_deref)
    }

    /// Look up a parameter by name, distinguishing "absent" from
    /// "present without a value".
    pub fn param_entry(&self, name: &str) -> Option<&Option<String>> {
        let needle = if self.case_insensitive {
            name.to_ascii_lowercase()
        } else {
            name.to_owned()
        };
        self.params
            .iter()
            .find(|(n, _)| *n == needle)
            .map(|(_, v)| v)
    }

    /// Whether a parameter with this name is present at all.
    pub fn has_param(&self, name: &str) -> bool {
        self.param_entry(name).is_some()
    }

    /// The parameters in the order they appeared.
    pub fn params(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

impl Display for Parameterised {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)?;
        for (name, value) in &self.params {
            match value {
                Some(value) => write!(f, ";{name}={value}")?,
                None => write!(f, ";{name}")?,
            }
        }
        Ok(())
    }
}
