use encoding_rs::{Encoding, UTF_8, WINDOWS_1252, WINDOWS_1252_INIT};

/// The closed registry of charsets recognised on multipart text parts.
///
/// Labels are matched case-insensitively. Ascii and latin-1 map onto
/// windows-1252, their ascii-compatible superset in `encoding_rs`.
pub(crate) fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    let label = label.trim().to_ascii_lowercase();
    match label.as_str() {
        "ascii" | "us-ascii" => Some(WINDOWS_1252),
        "utf-8" | "utf8" => Some(UTF_8),
        "iso-8859-1" | "latin-1" => Some(WINDOWS_1252),
        "windows-1252" | "cp-1252" => Some(WINDOWS_1252),
        _ => None,
    }
}

/// The default decode for `text/*` parts that name no charset.
pub(crate) static DEFAULT_TEXT: &Encoding = &WINDOWS_1252_INIT;
