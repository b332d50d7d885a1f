use crate::{Error, Result};

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Splits a delimited list while honouring quoted segments.
///
/// Outside a quoted segment, whitespace is discarded and the delimiter
/// splits items. Inside a quoted segment every byte is literal (including
/// whitespace and the delimiter), except that when escape recognition is
/// enabled a backslash introduces one of the C escape codes
/// (`\n \r \0 \b \t \v \a \f`), a hex byte (`\xHH`), a three-digit octal
/// byte (`\ooo`), or, for any other character, that character itself.
///
/// The trailing item is yielded if it is non-empty, whether or not a
/// final delimiter was present.
#[derive(Clone, Copy, Debug)]
pub struct QuotedListParser {
    quote: u8,
    delimiter: u8,
    escapes: bool,
}

impl Default for QuotedListParser {
    fn default() -> Self {
        Self {
            quote: b'"',
            delimiter: b',',
            escapes: false,
        }
    }
}

impl QuotedListParser {
    /// Construct a parser with the default quote and delimiter
    pub fn new() -> Self {
        Self::default()
    }

    /// the quote character. Default: `"`
    #[must_use]
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// the item delimiter. Default: `,`
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// whether backslash escape sequences are recognised inside quoted
    /// segments. Default: off
    #[must_use]
    pub fn with_escapes(mut self, escapes: bool) -> Self {
        self.escapes = escapes;
        self
    }

    /// Tokenise `input` into items.
    pub fn parse(&self, input: &str) -> Vec<String> {
        let bytes = input.as_bytes();
        let mut items = Vec::new();
        let mut item = Vec::new();
        let mut quoted = false;
        let mut i = 0;

        while i < bytes.len() {
            let byte = bytes[i];
            i += 1;

            if quoted {
                if byte == self.quote {
                    quoted = false;
                } else if byte == b'\\' && self.escapes {
                    i += self.push_escape(&bytes[i..], &mut item);
                } else {
                    item.push(byte);
                }
            } else if byte == self.quote {
                quoted = true;
            } else if byte == self.delimiter {
                if !item.is_empty() {
                    items.push(take_item(&mut item));
                }
            } else if !byte.is_ascii_whitespace() {
                item.push(byte);
            }
        }

        if !item.is_empty() {
            items.push(take_item(&mut item));
        }

        items
    }

    /// Resolve the escape sequence starting after a backslash; returns the
    /// number of input bytes consumed.
    fn push_escape(&self, rest: &[u8], item: &mut Vec<u8>) -> usize {
        let Some(&code) = rest.first() else {
            item.push(b'\\');
            return 0;
        };

        match code {
            b'n' => item.push(b'\n'),
            b'r' => item.push(b'\r'),
            b'0' if !rest.get(1).is_some_and(|d| (b'0'..=b'7').contains(d)) => item.push(0),
            b'b' => item.push(0x08),
            b't' => item.push(b'\t'),
            b'v' => item.push(0x0b),
            b'a' => item.push(0x07),
            b'f' => item.push(0x0c),
            b'x' => {
                let pair = rest.get(1).zip(rest.get(2));
                match pair.and_then(|(&hi, &lo)| Some(hex_value(hi)? << 4 | hex_value(lo)?)) {
                    Some(byte) => {
                        item.push(byte);
                        return 3;
                    }
                    None => item.push(b'x'),
                }
            }
            b'0'..=b'7' => {
                let octal = rest.get(..3).filter(|digits| {
                    digits.iter().all(|digit| (b'0'..=b'7').contains(digit))
                });
                match octal {
                    Some(digits) => {
                        let value = digits
                            .iter()
                            .fold(0u32, |acc, digit| acc * 8 + u32::from(digit - b'0'));
                        item.push((value & 0xff) as u8);
                        return 3;
                    }
                    None => item.push(code),
                }
            }
            other => item.push(other),
        }

        1
    }
}

fn take_item(item: &mut Vec<u8>) -> String {
    String::from_utf8_lossy(&std::mem::take(item)).into_owned()
}

/// Parses unquoted `key=value` lists, such as `Cookie` header contents.
///
/// Whitespace around keys and values is skipped. A key without a
/// separator yields a `None` value. A zero-length key is a format error.
/// Results preserve insertion order.
#[derive(Clone, Copy, Debug)]
pub struct KeyValueParser {
    delimiter: char,
    separator: char,
    key_chars: Option<&'static str>,
    value_chars: Option<&'static str>,
}

impl Default for KeyValueParser {
    fn default() -> Self {
        Self {
            delimiter: ';',
            separator: '=',
            key_chars: None,
            value_chars: None,
        }
    }
}

impl KeyValueParser {
    /// Construct a parser with the default delimiter and separator
    pub fn new() -> Self {
        Self::default()
    }

    /// the pair delimiter. Default: `;`
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// the key-value separator. Default: `=`
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// restrict keys to this alphabet
    #[must_use]
    pub fn with_key_chars(mut self, key_chars: &'static str) -> Self {
        self.key_chars = Some(key_chars);
        self
    }

    /// restrict values to this alphabet
    #[must_use]
    pub fn with_value_chars(mut self, value_chars: &'static str) -> Self {
        self.value_chars = Some(value_chars);
        self
    }

    /// Parse `input` into an ordered sequence of pairs.
    ///
    /// # Errors
    ///
    /// `Error::MalformedEncoding` on a zero-length key or a character
    /// outside a configured alphabet.
    pub fn parse(&self, input: &str) -> Result<Vec<(String, Option<String>)>> {
        let mut pairs = Vec::new();

        for segment in input.split(self.delimiter) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let (key, value) = match segment.split_once(self.separator) {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (segment, None),
            };

            if key.is_empty() {
                return Err(Error::MalformedEncoding("zero-length key".into()));
            }
            check_alphabet(key, self.key_chars)?;
            if let Some(value) = value {
                check_alphabet(value, self.value_chars)?;
            }

            pairs.push((key.to_owned(), value.map(String::from)));
        }

        Ok(pairs)
    }
}

fn check_alphabet(token: &str, allowed: Option<&str>) -> Result<()> {
    let Some(allowed) = allowed else {
        return Ok(());
    };
    match token.chars().find(|c| !allowed.contains(*c)) {
        Some(c) => Err(Error::MalformedEncoding(format!(
            "character {c:?} outside the permitted alphabet"
        ))),
        None => Ok(()),
    }
}
