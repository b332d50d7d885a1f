//! Byte-level codecs shared by the parser and serialiser: percent
//! encoding, base64, and the two tokenisers (quoted lists and unquoted
//! key-value pairs) that the header and cookie grammars are built from.

mod base64;
mod percent;
mod quoted;

pub use self::base64::{base64_decode, base64_encode};
pub use percent::{percent_decode, percent_encode, Mode, Strictness};
pub use quoted::{KeyValueParser, QuotedListParser};
