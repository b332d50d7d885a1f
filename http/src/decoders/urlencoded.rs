use crate::{
    codec::{percent_decode, Mode, Strictness},
    form::sanitise_identifier,
    FormMap, Result,
};

/// Decode an `application/x-www-form-urlencoded` body (or a query
/// string, which shares the grammar) into a [`FormMap`]. An empty body
/// yields an empty map; a segment without `=` yields an empty-string
/// value.
pub(crate) fn decode(body: &[u8]) -> Result<FormMap> {
    let mut map = FormMap::new();

    for segment in body.split(|&b| b == b'&') {
        if segment.is_empty() {
            continue;
        }

        let (name, value) = match memchr::memchr(b'=', segment) {
            Some(index) => (&segment[..index], &segment[index + 1..]),
            None => (segment, &[][..]),
        };

        let name = decode_component(name)?;
        let name = sanitise_identifier(&name);
        if name.is_empty() {
            continue;
        }

        map.insert(name, decode_component(value)?);
    }

    Ok(map)
}

fn decode_component(raw: &[u8]) -> Result<String> {
    let raw = String::from_utf8_lossy(raw);
    let decoded = percent_decode(&raw, Mode::Form, Strictness::Lenient)?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pairs_and_plus_decoding() {
        let map = decode(b"name=ab&c=d+e").unwrap();
        assert_eq!(map.get_str("name"), Some("ab"));
        assert_eq!(map.get_str("c"), Some("d e"));
    }

    #[test]
    fn segment_without_equals_yields_empty_string() {
        let map = decode(b"flag&x=1").unwrap();
        assert_eq!(map.get_str("flag"), Some(""));
        assert_eq!(map.get_str("x"), Some("1"));
    }

    #[test]
    fn empty_body_yields_empty_map() {
        let map = decode(b"").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn percent_escapes_decode() {
        let map = decode(b"y=%20z&snow=%E2%98%83").unwrap();
        assert_eq!(map.get_str("y"), Some(" z"));
        assert_eq!(map.get_str("snow"), Some("☃"));
    }

    #[test]
    fn keys_are_sanitised() {
        let map = decode(b"9lives=x&dash-key=y").unwrap();
        assert_eq!(map.get_str("lives"), Some("x"));
        assert_eq!(map.get_str("dashkey"), Some("y"));
    }
}
