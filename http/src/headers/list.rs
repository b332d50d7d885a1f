use super::Parameterised;
use crate::{Error, Result};
use std::ops::Deref;

/// A comma-separated header value, such as `Vary` or `Accept`.
///
/// The delimiter only splits outside double-quoted segments, whitespace
/// outside quoted segments is discarded, and quote characters are kept in
/// the item text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Csv {
    items: Vec<String>,
}

impl Csv {
    /// Split a raw header value into its items.
    pub fn parse(raw: &str) -> Self {
        let mut items = Vec::new();
        let mut item = String::new();
        let mut quoted = false;

        for c in raw.chars() {
            if quoted {
                item.push(c);
                if c == '"' {
                    quoted = false;
                }
            } else if c == '"' {
                quoted = true;
                item.push(c);
            } else if c == ',' {
                if !item.is_empty() {
                    items.push(std::mem::take(&mut item));
                }
            } else if !c.is_ascii_whitespace() {
                item.push(c);
            }
        }

        if !item.is_empty() {
            items.push(item);
        }

        Self { items }
    }
}

impl Deref for Csv {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl IntoIterator for Csv {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// One item of an [`OrderedCsv`]: the item text with its `q` parameter
/// removed, and the weight that parameter expressed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedCsvItem {
    value: String,
    weight: f64,
}

impl OrderedCsvItem {
    /// The item with any `q` parameter stripped.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The quality weight: three decimal places, within [0.000, 1.000],
    /// defaulting to 1.000 when the item carried no `q` parameter.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A comma-separated header value ordered by `q` quality weights, such as
/// `Accept-Encoding`. Items are sorted by descending weight; the sort is
/// stable, so equal weights keep their wire order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedCsv {
    items: Vec<OrderedCsvItem>,
}

impl OrderedCsv {
    /// Parse and sort a weighted list. When `drop_unacceptable` is set,
    /// items with a weight of zero are removed.
    ///
    /// # Errors
    ///
    /// `Error::MalformedWeight` when a `q` parameter is present but not a
    /// decimal number.
    pub fn parse(raw: &str, drop_unacceptable: bool) -> Result<Self> {
        let mut items = Vec::new();

        for item in Csv::parse(raw) {
            let parsed = Parameterised::parse(&item, true)?;

            let weight = match parsed.param_entry("q") {
                None => 1.0,
                Some(value) => {
                    let weight = value
                        .as_deref()
                        .and_then(|v| v.parse::<f64>().ok())
                        .filter(|w| w.is_finite())
                        .ok_or_else(|| Error::MalformedWeight(item.clone()))?;
                    ((weight * 1000.0).round() / 1000.0).clamp(0.0, 1.0)
                }
            };

            items.push(OrderedCsvItem {
                value: strip_q(&parsed),
                weight,
            });
        }

        items.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        if drop_unacceptable {
            items.retain(|item| item.weight > 0.0);
        }

        Ok(Self { items })
    }

    /// Whether any surviving item equals `value`, ascii-case-insensitively.
    pub fn accepts(&self, value: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.value.eq_ignore_ascii_case(value))
    }
}

fn strip_q(parsed: &Parameterised) -> String {
    let mut out = parsed.value().to_owned();
    for (name, value) in parsed.params() {
        if name.eq_ignore_ascii_case("q") {
            continue;
        }
        out.push(';');
        out.push_str(name);
        if let Some(value) = value {
            out.push('=');
            out.push_str(value);
        }
    }
    out
}

impl Deref for OrderedCsv {
    type Target = [OrderedCsvItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a> IntoIterator for &'a OrderedCsv {
    type Item = &'a OrderedCsvItem;
    type IntoIter = std::slice::Iter<'a, OrderedCsvItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn values(list: &OrderedCsv) -> Vec<&str> {
        list.iter().map(OrderedCsvItem::value).collect()
    }

    #[test]
    fn csv_strips_unquoted_whitespace() {
        assert_eq!(*Csv::parse("a, b ,c"), ["a", "b", "c"]);
        assert_eq!(*Csv::parse("text/html ; level=1"), ["text/html;level=1"]);
    }

    #[test]
    fn csv_quotes_guard_delimiters_and_stay_literal() {
        assert_eq!(*Csv::parse(r#"a, "b, c", d"#), ["a", "\"b, c\"", "d"]);
    }

    #[test]
    fn weights_sort_descending_and_stably() {
        let list = OrderedCsv::parse("a;q=0.5, b, c;q=0.5, d;q=0.8", false).unwrap();
        assert_eq!(values(&list), ["b", "d", "a", "c"]);
    }

    #[test]
    fn unacceptable_items_drop_when_asked() {
        let list = OrderedCsv::parse("gzip;q=0.5, identity;q=0, *", true).unwrap();
        assert_eq!(values(&list), ["*", "gzip"]);

        let kept = OrderedCsv::parse("gzip;q=0.5, identity;q=0, *", false).unwrap();
        assert_eq!(values(&kept), ["*", "gzip", "identity"]);
    }

    #[test]
    fn weights_round_and_clamp() {
        let list = OrderedCsv::parse("a;q=0.12345, b;q=7, c;q=-2", false).unwrap();
        let weights: Vec<_> = list.iter().map(OrderedCsvItem::weight).collect();
        assert_eq!(weights, [1.0, 0.123, 0.0]);
    }

    #[test]
    fn bad_weights_fail() {
        assert!(OrderedCsv::parse("a;q=fast", false).is_err());
        assert!(OrderedCsv::parse("a;q", false).is_err());
    }

    #[test]
    fn non_q_params_survive() {
        let list = OrderedCsv::parse("text/html;level=1;q=0.4", false).unwrap();
        assert_eq!(values(&list), ["text/html;level=1"]);
    }

    #[test]
    fn accepts_is_case_insensitive() {
        let list = OrderedCsv::parse("GZip, br", true).unwrap();
        assert!(list.accepts("gzip"));
        assert!(!list.accepts("zstd"));
    }
}
