use super::HeaderValue;
use smallvec::{smallvec, SmallVec};
use std::{
    borrow::Cow,
    fmt::{self, Debug, Formatter},
    ops::{Deref, DerefMut},
};

/// Every value received or set for one field name, in wire order.
///
/// Storage is optimised for the single-value case. Wherever the engine
/// needs one value for a name that occurred several times, the last
/// occurrence wins; [`HeaderValues::latest`] and the string accessor
/// implement that rule.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct HeaderValues {
    values: SmallVec<[HeaderValue; 1]>,
}

impl HeaderValues {
    /// Builds an empty `HeaderValues`. Application code rarely needs
    /// this; the `From` conversions cover the common cases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently added value.
    pub fn latest(&self) -> Option<&HeaderValue> {
        self.values.last()
    }

    /// The most recently added value as a `&str`, when it is utf8.
    pub fn as_str(&self) -> Option<&str> {
        self.latest().and_then(HeaderValue::as_str)
    }

    /// Add another value after the existing ones.
    pub fn append(&mut self, value: impl Into<HeaderValue>) {
        self.values.push(value.into());
    }

    /// Add any number of values after the existing ones.
    pub fn extend(&mut self, values: impl Into<HeaderValues>) {
        self.values.extend(values.into().values);
    }
}

impl Deref for HeaderValues {
    type Target = [HeaderValue];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl DerefMut for HeaderValues {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.values
    }
}

impl Debug for HeaderValues {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let [single] = &*self.values {
            Debug::fmt(single, f)
        } else {
            f.debug_list().entries(&self.values).finish()
        }
    }
}

impl IntoIterator for HeaderValues {
    type Item = HeaderValue;
    type IntoIter = smallvec::IntoIter<[HeaderValue; 1]>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a HeaderValues {
    type Item = &'a HeaderValue;
    type IntoIter = std::slice::Iter<'a, HeaderValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<I> FromIterator<I> for HeaderValues
where
    I: Into<HeaderValue>,
{
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<HeaderValue> for HeaderValues {
    fn from(value: HeaderValue) -> Self {
        Self {
            values: smallvec![value],
        }
    }
}

impl<HV> From<Vec<HV>> for HeaderValues
where
    HV: Into<HeaderValue>,
{
    fn from(values: Vec<HV>) -> Self {
        values.into_iter().collect()
    }
}

macro_rules! single_value_conversions {
    ($($t:ty),+) => {$(
        impl From<$t> for HeaderValues {
            fn from(value: $t) -> Self {
                Self::from(HeaderValue::from(value))
            }
        }
    )+};
}

single_value_conversions!(
    String,
    &'static str,
    Cow<'static, str>,
    Vec<u8>,
    &'static [u8],
    u16,
    u32,
    u64,
    usize,
    i32,
    i64
);

impl PartialEq<str> for HeaderValues {
    fn eq(&self, other: &str) -> bool {
        self.as_str().is_some_and(|value| value == other)
    }
}

impl PartialEq<&str> for HeaderValues {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<[&str]> for HeaderValues {
    fn eq(&self, other: &[&str]) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(mine, theirs)| mine == theirs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn the_last_occurrence_wins() {
        let mut values = HeaderValues::from("first");
        values.append("second");
        values.append("third");
        assert_eq!(values.as_str(), Some("third"));
        assert_eq!(values.len(), 3);
        assert_eq!(&*values, ["first", "second", "third"]);
    }

    #[test]
    fn single_value_debug_is_flat() {
        assert_eq!(format!("{:?}", HeaderValues::from("only")), "\"only\"");
        let mut several = HeaderValues::from("a");
        several.append("b");
        assert_eq!(format!("{several:?}"), "[\"a\", \"b\"]");
    }
}
