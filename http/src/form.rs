use std::fmt::{self, Debug, Formatter};

/// A single value in a [`FormMap`]: decoded text when the source
/// declared (or defaulted to) a recognised character encoding, raw bytes
/// otherwise.
#[derive(Clone, PartialEq, Eq)]
pub enum FormValue {
    /// a decoded string value
    Text(String),

    /// an undecoded byte value, such as a binary multipart upload
    Bytes(Vec<u8>),
}

impl FormValue {
    /// Returns the value as a `&str` when it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            FormValue::Bytes(_) => None,
        }
    }

    /// Returns the value's bytes, whether or not it decoded as text.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FormValue::Text(s) => s.as_bytes(),
            FormValue::Bytes(b) => b,
        }
    }

    /// Is this value decoded text?
    pub fn is_text(&self) -> bool {
        matches!(self, FormValue::Text(_))
    }
}

impl Debug for FormValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Text(s) => Debug::fmt(s, f),
            FormValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Text(s)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for FormValue {
    fn from(b: Vec<u8>) -> Self {
        FormValue::Bytes(b)
    }
}

/// The flat name-to-value maps surfaced on a request: query parameters,
/// decoded body fields, and cookies. Names are unique (inserting a name
/// again replaces the earlier value) and iteration follows first
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormMap {
    entries: Vec<(String, FormValue)>,
}

impl FormMap {
    /// Construct a new empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a text value by name. Returns `None` for byte values.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormValue::as_str)
    }

    /// Whether a value with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// How many entries does the map hold?
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Are there zero entries?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a FormMap {
    type Item = &'a (String, FormValue);
    type IntoIter = std::slice::Iter<'a, (String, FormValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Sanitise a wire-derived identifier before using it as a map key:
/// leading decimal digits are trimmed, then everything outside
/// `A-Za-z0-9_` is dropped.
pub(crate) fn sanitise_identifier(raw: &str) -> String {
    raw.chars()
        .skip_while(char::is_ascii_digit)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
