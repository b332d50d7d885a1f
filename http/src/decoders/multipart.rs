use super::charset::{encoding_for_label, DEFAULT_TEXT};
use crate::{
    form::sanitise_identifier,
    headers::Headers,
    Error, FormMap, FormValue, HeaderValue, KnownHeaderName, MediaType, Result,
};
use memchr::memmem::Finder;

/// Decode a `multipart/form-data` body into a [`FormMap`].
///
/// Parts are delimited by the working boundary (`CRLF--boundary`). Each
/// part must carry a `Content-Disposition` header with a `name`
/// parameter; its body is stored under the sanitised name, decoded to
/// text when the part is textual and kept as raw bytes otherwise. A body
/// that stores no entries surfaces as `Ok(None)`.
///
/// # Errors
///
/// `Error::MalformedMultipart` when the boundary parameter is missing,
/// a part is unterminated, or a part lacks a usable disposition.
pub(crate) fn decode(body: &[u8], media_type: &MediaType) -> Result<Option<FormMap>> {
    let boundary = media_type
        .param("boundary")
        .ok_or_else(|| Error::MalformedMultipart("missing boundary parameter".into()))?;

    let opening = format!("--{boundary}");
    let working = format!("\r\n--{boundary}");
    let working_finder = Finder::new(working.as_bytes());

    // everything before the first boundary marker is a preamble to skip
    let mut pos = Finder::new(opening.as_bytes())
        .find(body)
        .map(|index| index + opening.len())
        .ok_or_else(|| Error::MalformedMultipart("opening boundary not found".into()))?;

    let mut map = FormMap::new();

    loop {
        // after a boundary marker: `--` closes the body, CRLF opens a part
        match body.get(pos..pos + 2) {
            Some([b'-', b'-']) => break,
            Some([b'\r', b'\n']) => pos += 2,
            _ => {
                return Err(Error::MalformedMultipart(
                    "boundary not followed by CRLF or terminator".into(),
                ));
            }
        }

        let (headers, after_headers) = read_part_headers(&body[pos..])?;
        pos += after_headers;

        let content_end = working_finder
            .find(&body[pos..])
            .ok_or_else(|| Error::MalformedMultipart("unterminated part".into()))?;
        let content = &body[pos..pos + content_end];
        pos += content_end + working.len();

        let name = part_name(&headers)?;
        let name = sanitise_identifier(&name);
        if !name.is_empty() {
            map.insert(name, part_value(content, &headers));
        }
    }

    if map.is_empty() {
        Ok(None)
    } else {
        Ok(Some(map))
    }
}

/// Read a part's header block, line by line up to the blank line, and
/// return the parsed headers along with the number of bytes consumed.
fn read_part_headers(bytes: &[u8]) -> Result<(Headers, usize)> {
    if bytes.starts_with(b"\r\n") {
        return Ok((Headers::new(), 2));
    }
    match Finder::new(b"\r\n\r\n").find(bytes) {
        Some(index) => {
            let headers = Headers::parse_block(&bytes[..index + 2])?;
            Ok((headers, index + 4))
        }
        None => Err(Error::MalformedMultipart(
            "part headers have no terminating blank line".into(),
        )),
    }
}

fn part_name(headers: &Headers) -> Result<String> {
    let disposition = headers
        .get(KnownHeaderName::ContentDisposition)
        .ok_or_else(|| Error::MalformedMultipart("part without content-disposition".into()))?;

    disposition
        .to_parameterised(true)?
        .param("name")
        .map(String::from)
        .ok_or_else(|| Error::MalformedMultipart("content-disposition without a name".into()))
}

/// Pick the part's representation. Text parts decode through the charset
/// registry, defaulting to ascii; anything else stays raw bytes. A part
/// with no Content-Type is treated as text.
fn part_value(content: &[u8], headers: &Headers) -> FormValue {
    let media_type = headers
        .get(KnownHeaderName::ContentType)
        .map(HeaderValue::to_media_type);

    let encoding = match media_type {
        None => Some(DEFAULT_TEXT),
        Some(Ok(media_type)) if media_type.kind().eq_ignore_ascii_case("text") => Some(
            media_type
                .param("charset")
                .and_then(encoding_for_label)
                .unwrap_or(DEFAULT_TEXT),
        ),
        Some(_) => None,
    };

    match encoding {
        Some(encoding) => {
            let (text, _, _) = encoding.decode(content);
            FormValue::Text(text.into_owned())
        }
        None => FormValue::Bytes(content.to_vec()),
    }
}
