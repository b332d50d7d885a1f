use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

fn in_alphabet(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'+' || byte == b'/'
}

/// Encode bytes with the standard RFC 2045 alphabet and `=` padding.
pub fn base64_encode(input: &[u8]) -> String {
    STANDARD.encode(input)
}

/// Decode RFC 2045 base64.
///
/// Bytes outside the alphabet (other than `=`) are discarded before
/// decoding, as the RFC permits transports to inject whitespace and line
/// breaks. After filtering, the input length must be a multiple of four,
/// and padding may only appear as the final one or two characters.
///
/// # Errors
///
/// `Error::MalformedEncoding` when the filtered input has a bad length or
/// misplaced padding.
pub fn base64_decode(input: &str) -> Result<Vec<u8>> {
    let filtered: Vec<u8> = input
        .bytes()
        .filter(|&b| in_alphabet(b) || b == b'=')
        .collect();

    if filtered.is_empty() {
        return Ok(Vec::new());
    }

    if filtered.len() % 4 != 0 {
        return Err(Error::MalformedEncoding(format!(
            "base64 length {} is not a multiple of four",
            filtered.len()
        )));
    }

    if let Some(first_pad) = filtered.iter().position(|&b| b == b'=') {
        let misplaced = first_pad < filtered.len() - 2
            || filtered[first_pad..].iter().any(|&b| b != b'=');
        if misplaced {
            return Err(Error::MalformedEncoding(
                "base64 padding before the end of input".into(),
            ));
        }
    }

    STANDARD
        .decode(&filtered)
        .map_err(|e| Error::MalformedEncoding(format!("base64: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        for input in [&b"f"[..], b"fo", b"foo", b"foob", b"fooba", b"foobar"] {
            let encoded = base64_encode(input);
            assert_eq!(encoded.len(), input.len().div_ceil(3) * 4);
            assert_eq!(base64_decode(&encoded).unwrap(), input);
        }
    }

    #[test]
    fn known_vectors() {
        assert_eq!(base64_encode(b"foobar"), "Zm9vYmFy");
        assert_eq!(base64_encode(b"foob"), "Zm9vYg==");
        assert_eq!(base64_decode("Zm9vYmE=").unwrap(), b"fooba");
    }

    #[test]
    fn non_alphabet_bytes_are_filtered() {
        assert_eq!(base64_decode("Zm9v\r\nYmFy").unwrap(), b"foobar");
        assert_eq!(base64_decode(" Z m 9 v ").unwrap(), b"foo");
    }

    #[test]
    fn length_must_be_quartets() {
        assert!(base64_decode("Zm9vY").is_err());
    }

    #[test]
    fn padding_must_be_final() {
        assert!(base64_decode("Zm==9vYg").is_err());
        assert!(base64_decode("Zm9=Yg==").is_err());
        assert!(base64_decode("Z===").is_err());
        assert!(base64_decode("Zm9vYg==").is_ok());
    }

    #[test]
    fn empty_input() {
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_decode("").unwrap(), Vec::<u8>::new());
        assert_eq!(base64_decode("\r\n").unwrap(), Vec::<u8>::new());
    }
}
