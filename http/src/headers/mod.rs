mod header_name;
mod header_value;
mod header_values;
mod known;
mod list;
mod media_type;
mod parameterised;

pub use header_name::HeaderName;
pub use header_value::HeaderValue;
pub use header_values::HeaderValues;
pub use known::KnownHeaderName;
pub use list::{Csv, OrderedCsv, OrderedCsvItem};
pub use media_type::MediaType;
pub use parameterised::Parameterised;

use crate::{Error, Result};
use std::fmt::{self, Display, Formatter};

/// Lantern's header map type: a multimap keyed by field name, compared
/// ascii-case-insensitively, preserving both the order in which names
/// first appeared and the order of values within a name.
///
/// A `Headers` can be latched read-only with [`Headers::seal`]; the
/// serialiser does this just before emission, and the parser does it
/// before handing request headers to application code. Every mutating
/// operation fails with [`Error::ReadOnly`] once the latch is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct Headers {
    entries: Vec<(HeaderName<'static>, HeaderValues)>,
    sealed: bool,
}

impl Display for Headers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (name, values) in self {
            for value in values {
                f.write_fmt(format_args!("{name}: {value}\r\n"))?;
            }
        }
        Ok(())
    }
}

impl Headers {
    /// Construct a new empty headers map
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch this map read-only. There is deliberately no way back.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Has this map been latched read-only?
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn guard(&self) -> Result<()> {
        if self.sealed {
            Err(Error::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn position(&self, name: &HeaderName<'_>) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n.matches(name))
    }

    /// Are there zero headers?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many distinct field names have been added to this map? Note
    /// that each name may carry more than one value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add the value or values to this map, retaining any values already
    /// present for the same field name. To replace existing values, use
    /// [`Headers::insert`].
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the map has been sealed.
    pub fn append(
        &mut self,
        name: impl Into<HeaderName<'static>>,
        values: impl Into<HeaderValues>,
    ) -> Result<()> {
        self.guard()?;
        let name = name.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1.extend(values.into()),
            None => self.entries.push((name, values.into())),
        }
        Ok(())
    }

    /// Add the value or values to this map, replacing any values already
    /// present for the same field name. The entry keeps its original
    /// position in insertion order.
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the map has been sealed.
    pub fn insert(
        &mut self,
        name: impl Into<HeaderName<'static>>,
        values: impl Into<HeaderValues>,
    ) -> Result<()> {
        self.guard()?;
        let name = name.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1 = values.into(),
            None => self.entries.push((name, values.into())),
        }
        Ok(())
    }

    /// Add the value or values if and only if there is not already an
    /// entry for the same field name.
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the map has been sealed.
    pub fn try_insert(
        &mut self,
        name: impl Into<HeaderName<'static>>,
        values: impl Into<HeaderValues>,
    ) -> Result<()> {
        self.guard()?;
        let name = name.into();
        if self.position(&name).is_none() {
            self.entries.push((name, values.into()));
        }
        Ok(())
    }

    /// If the field name has no entry yet, execute the provided function
    /// and insert its result.
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the map has been sealed.
    pub fn try_insert_with<V>(
        &mut self,
        name: impl Into<HeaderName<'static>>,
        values: impl FnOnce() -> V,
    ) -> Result<()>
    where
        V: Into<HeaderValues>,
    {
        self.guard()?;
        let name = name.into();
        if self.position(&name).is_none() {
            self.entries.push((name, values().into()));
        }
        Ok(())
    }

    /// Remove and return all values for the field name.
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the map has been sealed.
    pub fn remove<'a>(&mut self, name: impl Into<HeaderName<'a>>) -> Result<Option<HeaderValues>> {
        self.guard()?;
        let name = name.into();
        Ok(self.position(&name).map(|index| self.entries.remove(index).1))
    }

    /// Remove every entry.
    ///
    /// # Errors
    ///
    /// `Error::ReadOnly` once the map has been sealed.
    pub fn clear(&mut self) -> Result<()> {
        self.guard()?;
        self.entries.clear();
        Ok(())
    }

    /// Retrieves the ordered values for the field name, or `None` if
    /// there is no entry.
    pub fn get_values<'a>(&self, name: impl Into<HeaderName<'a>>) -> Option<&HeaderValues> {
        let name = name.into();
        self.position(&name).map(|index| &self.entries[index].1)
    }

    /// Retrieves a singular value for the field name. When the name was
    /// sent several times, the last occurrence wins.
    pub fn get<'a>(&self, name: impl Into<HeaderName<'a>>) -> Option<&HeaderValue> {
        self.get_values(name).and_then(HeaderValues::latest)
    }

    /// Retrieves a `&str` value for the field name, following the
    /// last-occurrence-wins behaviour of [`Headers::get`].
    pub fn get_str<'a>(&self, name: impl Into<HeaderName<'a>>) -> Option<&str> {
        self.get_values(name).and_then(HeaderValues::as_str)
    }

    /// Predicate function to check whether this map contains the field
    /// name.
    pub fn has_header<'a>(&self, name: impl Into<HeaderName<'a>>) -> bool {
        let name = name.into();
        self.position(&name).is_some()
    }

    /// Predicate function to check whether this map contains the exact
    /// name-value pair.
    pub fn has_header_value<'a>(
        &self,
        name: impl Into<HeaderName<'a>>,
        value: impl Into<HeaderValue>,
    ) -> bool {
        let value = value.into();
        self.get_values(name)
            .is_some_and(|values| values.iter().any(|v| *v == value))
    }

    /// Convenience function to check whether the latest value for the
    /// field name is ascii-case-insensitively equal to the provided
    /// comparison. Returns false if there is no entry.
    pub fn eq_ignore_ascii_case<'a>(
        &self,
        name: impl Into<HeaderName<'a>>,
        needle: &str,
    ) -> bool {
        self.get_str(name)
            .is_some_and(|value| value.eq_ignore_ascii_case(needle))
    }

    /// Return an iterator over borrowed names and values, in insertion
    /// order of the field names.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Parse a wire header block (everything between the request line and
    /// the terminating blank line).
    ///
    /// Continuation lines (lines beginning with SP or HT) are merged
    /// into their predecessor with a single space. This form is
    /// deprecated by RFC 7230 but tolerated on ingress for robustness; it
    /// is never produced on egress.
    ///
    /// # Errors
    ///
    /// `Error::MalformedHeader` when a line has no colon, whitespace
    /// before its colon, an empty name or value, or a continuation line
    /// has nothing to continue.
    pub(crate) fn parse_block(block: &[u8]) -> Result<Self> {
        let mut merged: Vec<Vec<u8>> = Vec::new();

        for line in split_crlf(block) {
            if line.is_empty() {
                continue;
            }
            if line[0] == b' ' || line[0] == b'\t' {
                let previous = merged.last_mut().ok_or_else(|| {
                    Error::MalformedHeader("continuation line with no predecessor".into())
                })?;
                previous.push(b' ');
                previous.extend_from_slice(trim_sp_ht(line));
            } else {
                merged.push(line.to_vec());
            }
        }

        let mut headers = Headers::new();
        for line in merged {
            let (name, value) = parse_line(&line)?;
            headers.append(name, value)?;
        }
        Ok(headers)
    }
}

/// Parse a single header line into its name and value.
///
/// Leading and trailing SP/HT are trimmed from both parts; whitespace
/// immediately before the colon is rejected per RFC 7230 §3.2.4.
pub(crate) fn parse_line(line: &[u8]) -> Result<(HeaderName<'static>, HeaderValue)> {
    let line = trim_sp_ht(strip_line_ending(line));

    let colon = memchr::memchr(b':', line)
        .ok_or_else(|| Error::MalformedHeader(lossy(line)))?;
    let (name, rest) = line.split_at(colon);

    if name.is_empty() {
        return Err(Error::MalformedHeader(lossy(line)));
    }
    if matches!(name.last(), Some(b' ' | b'\t')) {
        return Err(Error::MalformedHeader(format!(
            "whitespace before colon in {:?}",
            lossy(line)
        )));
    }

    let name = std::str::from_utf8(name)
        .map_err(|_| Error::MalformedHeader(lossy(line)))?
        .parse::<HeaderName<'static>>()?;

    let value = trim_sp_ht(&rest[1..]);
    if value.is_empty() {
        return Err(Error::MalformedHeader(format!("empty value for {name}")));
    }
    let value = HeaderValue::parse(value);
    if !value.is_valid() {
        return Err(Error::MalformedHeader(format!(
            "control bytes in value for {name}"
        )));
    }

    Ok((name, value))
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\r\n").unwrap_or(line);
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn trim_sp_ht(mut bytes: &[u8]) -> &[u8] {
    while let Some((b' ' | b'\t', rest)) = bytes.split_first() {
        bytes = rest;
    }
    while let Some((b' ' | b'\t', rest)) = bytes.split_last() {
        bytes = rest;
    }
    bytes
}

fn split_crlf(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = block;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match memchr::memmem::find(rest, b"\r\n") {
            Some(index) => {
                let line = &rest[..index];
                rest = &rest[index + 2..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

impl<HN, HV> Extend<(HN, HV)> for Headers
where
    HN: Into<HeaderName<'static>>,
    HV: Into<HeaderValues>,
{
    fn extend<T: IntoIterator<Item = (HN, HV)>>(&mut self, iter: T) {
        for (name, values) in iter {
            if self.append(name, values).is_err() {
                log::error!("ignoring extend() of a sealed header map");
                return;
            }
        }
    }
}

impl<HN, HV> FromIterator<(HN, HV)> for Headers
where
    HN: Into<HeaderName<'static>>,
    HV: Into<HeaderValues>,
{
    fn from_iter<T: IntoIterator<Item = (HN, HV)>>(iter: T) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

/// Borrowed iterator over a [`Headers`] in insertion order.
#[derive(Debug)]
pub struct Iter<'a>(std::slice::Iter<'a, (HeaderName<'static>, HeaderValues)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a HeaderName<'static>, &'a HeaderValues);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(name, values)| (name, values))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a HeaderName<'static>, &'a HeaderValues);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(self.entries.iter())
    }
}

/// Owning iterator over a [`Headers`] in insertion order.
#[derive(Debug)]
pub struct IntoIter(std::vec::IntoIter<(HeaderName<'static>, HeaderValues)>);

impl Iterator for IntoIter {
    type Item = (HeaderName<'static>, HeaderValues);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl IntoIterator for Headers {
    type Item = (HeaderName<'static>, HeaderValues);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.entries.into_iter())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut headers = Headers::new();
        headers.append("B-Header", "1").unwrap();
        headers.append("A-Header", "2").unwrap();
        headers.append("b-header", "3").unwrap();
        let names: Vec<_> = headers.iter().map(|(n, _)| n.as_ref().to_owned()).collect();
        assert_eq!(names, ["B-Header", "A-Header"]);
        assert_eq!(&**headers.get_values("B-HEADER").unwrap(), ["1", "3"]);
    }

    #[test]
    fn insert_overwrites_append_accumulates() {
        let mut headers = Headers::new();
        headers.append(KnownHeaderName::Vary, "accept").unwrap();
        headers.append(KnownHeaderName::Vary, "cookie").unwrap();
        assert_eq!(headers.get_values(KnownHeaderName::Vary).unwrap().len(), 2);
        headers.insert(KnownHeaderName::Vary, "origin").unwrap();
        assert_eq!(&**headers.get_values(KnownHeaderName::Vary).unwrap(), ["origin"]);
    }

    #[test]
    fn sealing_blocks_every_mutator() {
        let mut headers = Headers::new();
        headers.append("x-a", "1").unwrap();
        headers.seal();
        assert!(matches!(headers.append("x-b", "2"), Err(Error::ReadOnly)));
        assert!(matches!(headers.insert("x-a", "2"), Err(Error::ReadOnly)));
        assert!(matches!(headers.remove("x-a"), Err(Error::ReadOnly)));
        assert!(matches!(headers.clear(), Err(Error::ReadOnly)));
        assert_eq!(headers.get_str("x-a"), Some("1"));
    }

    #[test]
    fn round_trips_through_display() {
        let mut headers = Headers::new();
        headers.append(KnownHeaderName::ContentType, "text/plain").unwrap();
        headers.append("X-Two", ["a", "b"].to_vec()).unwrap();
        let formatted = headers.to_string();
        assert_eq!(formatted, "Content-Type: text/plain\r\nX-Two: a\r\nX-Two: b\r\n");
        let reparsed = Headers::parse_block(formatted.as_bytes()).unwrap();
        assert_eq!(reparsed, headers);
    }

    #[test]
    fn continuation_lines_merge() {
        let block = b"X-Long: first\r\n  second\r\n\tthird\r\nHost: example\r\n";
        let headers = Headers::parse_block(block).unwrap();
        assert_eq!(headers.get_str("x-long"), Some("first second third"));
        assert_eq!(headers.get_str("host"), Some("example"));
    }

    #[test]
    fn continuation_line_without_predecessor() {
        assert!(Headers::parse_block(b"  floating\r\n").is_err());
    }

    #[test]
    fn whitespace_before_colon_is_rejected() {
        assert!(Headers::parse_block(b"Host : example\r\n").is_err());
        assert!(Headers::parse_block(b"Host: example\r\n").is_ok());
    }

    #[test]
    fn empty_names_and_values_are_rejected() {
        assert!(Headers::parse_block(b": value\r\n").is_err());
        assert!(Headers::parse_block(b"Host:\r\n").is_err());
        assert!(Headers::parse_block(b"Host:   \r\n").is_err());
        assert!(Headers::parse_block(b"no colon here\r\n").is_err());
    }
}
