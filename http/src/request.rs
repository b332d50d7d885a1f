use crate::{
    buffer::Buffer,
    codec::{percent_decode, KeyValueParser, Mode, Strictness},
    decoders,
    form::sanitise_identifier,
    headers::Headers,
    Error, FormMap, FormValue, HttpConfig, KnownHeaderName, Result, Transport,
};
use async_io::Timer;
use futures_lite::{future::FutureExt, AsyncReadExt};
use memchr::memmem::Finder;
use std::time::Instant;

/// a fixed-length request body is never preallocated beyond this
const MAX_BODY_PREALLOCATE: usize = 64 * 1024;

/// A fully parsed request: the immutable view a
/// [`Handler`][crate::Handler] receives.
#[derive(Debug)]
pub struct Request {
    method: String,
    path: String,
    version: String,
    headers: Headers,
    query: Option<FormMap>,
    form: Option<FormMap>,
    cookies: FormMap,
    body: Vec<u8>,
}

/// A parse failure, carrying whatever request context had been
/// established by the time it occurred. Failures after the request line
/// surface the method, path and query so that error handlers can observe
/// them; failures before it carry nothing.
#[derive(Debug)]
pub(crate) struct ReceiveFailure {
    pub(crate) error: Error,
    pub(crate) request: Option<Request>,
}

impl Request {
    /// the request method, uppercased
    pub fn method(&self) -> &str {
        &self.method
    }

    /// the percent-decoded request path, with a single trailing `/`
    /// stripped unless the path is `/` itself
    pub fn path(&self) -> &str {
        &self.path
    }

    /// the version token from the request line, verbatim
    pub fn version(&self) -> &str {
        &self.version
    }

    /// the request headers; latched read-only by the parser
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// the query-string parameters, or `None` when the request target
    /// had no query component
    pub fn query(&self) -> Option<&FormMap> {
        self.query.as_ref()
    }

    /// the decoded body fields, or `None` when no registered decoder
    /// matched the request's media type (or the decoder surfaced
    /// nothing)
    pub fn form(&self) -> Option<&FormMap> {
        self.form.as_ref()
    }

    /// the cookies from every `Cookie` header, flattened into one map
    pub fn cookies(&self) -> &FormMap {
        &self.cookies
    }

    /// the raw body bytes, exactly as read from the wire
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Read and parse one request from the transport.
    ///
    /// Reading is bounded by the configured deadline: expiry before the
    /// request line surfaces as `Error::Closed` (the connection is torn
    /// down silently), expiry afterwards as `Error::ReadTimeout`.
    pub(crate) async fn receive<T: Transport>(
        transport: &mut T,
        buffer: &mut Buffer,
        config: &HttpConfig,
    ) -> std::result::Result<Request, ReceiveFailure> {
        let deadline = Instant::now() + config.read_timeout;

        let head_len = match read_head(transport, buffer, config)
            .or(after_deadline(deadline, Error::ReadTimeout))
            .await
        {
            Ok(head_len) => head_len,
            Err(error) => return Err(head_failure(error, buffer)),
        };

        let head = buffer[..head_len].to_vec();
        buffer.ignore_front(head_len);

        let line_end = Finder::new(b"\r\n").find(&head).unwrap_or(head.len());
        let (method, target, version) =
            parse_request_line(&head[..line_end]).map_err(|error| ReceiveFailure {
                error,
                request: None,
            })?;
        let (path, query) = split_target(&target)?;

        log::trace!("received: {method} {target} {version}");

        // from here on, failures still carry the request context
        let fail = |error: Error, headers: Headers| ReceiveFailure {
            error,
            request: Some(Request {
                method: method.clone(),
                path: path.clone(),
                version: version.clone(),
                headers,
                query: query.clone(),
                form: None,
                cookies: FormMap::new(),
                body: Vec::new(),
            }),
        };

        let block_end = head.len().saturating_sub(2).max(line_end);
        let mut headers = match Headers::parse_block(&head[(line_end + 2).min(head.len())..block_end])
        {
            Ok(headers) => headers,
            Err(error) => return Err(fail(error, Headers::new())),
        };
        headers.seal();

        let body = match body_length(&headers, config) {
            Ok(0) => Vec::new(),
            Ok(length) => {
                match read_body(transport, buffer, length)
                    .or(after_deadline(deadline, Error::ReadTimeout))
                    .await
                {
                    Ok(body) => body,
                    Err(error) => return Err(fail(error, headers)),
                }
            }
            Err(error) => return Err(fail(error, headers)),
        };

        let form = match decode_form(&headers, &body) {
            Ok(form) => form,
            Err(error) => return Err(fail(error, headers)),
        };

        let cookies = match parse_cookies(&headers) {
            Ok(cookies) => cookies,
            Err(error) => return Err(fail(error, headers)),
        };

        Ok(Request {
            method,
            path,
            version,
            headers,
            query,
            form,
            cookies,
            body,
        })
    }
}

async fn after_deadline<T>(deadline: Instant, error: Error) -> Result<T> {
    Timer::at(deadline).await;
    Err(error)
}

/// Distinguish a pre-request-line timeout (silent close) from one where
/// the request line had already arrived (408 with partial context).
fn head_failure(error: Error, buffer: &Buffer) -> ReceiveFailure {
    if !matches!(error, Error::ReadTimeout) {
        return ReceiveFailure {
            error,
            request: None,
        };
    }

    let request = Finder::new(b"\r\n")
        .find(buffer)
        .and_then(|line_end| {
            let (method, target, version) = parse_request_line(&buffer[..line_end]).ok()?;
            let (path, query) = split_target(&target).ok()?;
            Some(Request {
                method,
                path,
                version,
                headers: Headers::new(),
                query,
                form: None,
                cookies: FormMap::new(),
                body: Vec::new(),
            })
        });

    match request {
        Some(request) => ReceiveFailure {
            error: Error::ReadTimeout,
            request: Some(request),
        },
        None => ReceiveFailure {
            error: Error::Closed,
            request: None,
        },
    }
}

/// Accumulate transport reads until the head terminator arrives,
/// draining any number of blank lines that precede the request line.
async fn read_head<T: Transport>(
    transport: &mut T,
    buffer: &mut Buffer,
    config: &HttpConfig,
) -> Result<usize> {
    let finder = Finder::new(b"\r\n\r\n");

    loop {
        loop {
            if buffer.starts_with(b"\r\n") {
                buffer.ignore_front(2);
            } else if buffer.starts_with(b"\n") {
                buffer.ignore_front(1);
            } else {
                break;
            }
        }

        if let Some(index) = finder.find(buffer) {
            return Ok(index + 4);
        }

        if buffer.len() >= config.max_head_len {
            return Err(Error::HeadersTooLong);
        }

        let len = buffer.len();
        buffer.expand();
        let bytes = transport.read(&mut buffer[len..]).await?;
        buffer.truncate(len + bytes);

        if bytes == 0 {
            return Err(if len == 0 {
                Error::Closed
            } else {
                Error::MalformedRequestLine
            });
        }
    }
}

/// Split the request line on SP, HT, VT, CR, or 0xFF, discarding empty
/// fragments. Exactly three parts are required: method, request-target,
/// version.
fn parse_request_line(line: &[u8]) -> Result<(String, String, String)> {
    let mut parts = line
        .split(|&b| matches!(b, b' ' | b'\t' | 0x0b | b'\r' | 0xff))
        .filter(|part| !part.is_empty())
        .map(|part| {
            std::str::from_utf8(part)
                .map(str::to_owned)
                .map_err(|_| Error::MalformedRequestLine)
        });

    let method = parts.next().ok_or(Error::MalformedRequestLine)??;
    let target = parts.next().ok_or(Error::MalformedRequestLine)??;
    let version = parts.next().ok_or(Error::MalformedRequestLine)??;

    if parts.next().is_some() {
        return Err(Error::MalformedRequestLine);
    }

    Ok((method.to_ascii_uppercase(), target, version))
}

/// Split the request-target at the first `?`, percent-decode the path,
/// and strip a single trailing slash unless the path is only `/`.
fn split_target(target: &str) -> std::result::Result<(String, Option<FormMap>), ReceiveFailure> {
    let (raw_path, raw_query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let path_bytes =
        percent_decode(raw_path, Mode::Form, Strictness::Lenient).map_err(|error| {
            ReceiveFailure {
                error,
                request: None,
            }
        })?;
    let mut path = String::from_utf8_lossy(&path_bytes).into_owned();
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    let query = match raw_query {
        Some(raw_query) => Some(
            decoders::decode_urlencoded(raw_query.as_bytes()).map_err(|error| ReceiveFailure {
                error,
                request: None,
            })?,
        ),
        None => None,
    };

    Ok((path, query))
}

/// The number of body bytes to read: zero without a `Content-Length`
/// header, its validated value otherwise.
fn body_length(headers: &Headers, config: &HttpConfig) -> Result<u64> {
    if !headers.has_header(KnownHeaderName::ContentLength) {
        return Ok(0);
    }

    let length = headers
        .get_str(KnownHeaderName::ContentLength)
        .ok_or(Error::InvalidContentLength)?
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::InvalidContentLength)?;

    if length > config.max_body_len {
        return Err(Error::BodyTooLarge(config.max_body_len));
    }

    Ok(length)
}

/// Read exactly `length` body bytes, starting with whatever the head
/// read left in the buffer, looping over partial transport reads.
async fn read_body<T: Transport>(
    transport: &mut T,
    buffer: &mut Buffer,
    length: u64,
) -> Result<Vec<u8>> {
    let length = usize::try_from(length).map_err(|_| Error::InvalidContentLength)?;
    let mut body = Vec::with_capacity(length.min(MAX_BODY_PREALLOCATE));

    let buffered = buffer.len().min(length);
    body.extend_from_slice(&buffer[..buffered]);
    buffer.ignore_front(buffered);

    let mut chunk = [0u8; 8 * 1024];
    while body.len() < length {
        let want = chunk.len().min(length - body.len());
        let bytes = transport.read(&mut chunk[..want]).await?;
        if bytes == 0 {
            return Err(Error::Closed);
        }
        body.extend_from_slice(&chunk[..bytes]);
    }

    Ok(body)
}

/// Dispatch the body through the decoder registry, keyed on the last
/// `Content-Type` header. An unparseable or unregistered media type
/// surfaces no form map rather than an error.
fn decode_form(headers: &Headers, body: &[u8]) -> Result<Option<FormMap>> {
    let Some(content_type) = headers.get(KnownHeaderName::ContentType) else {
        return Ok(None);
    };
    let Ok(media_type) = content_type.to_media_type() else {
        return Ok(None);
    };
    decoders::decode(&media_type, body)
}

/// Flatten every `Cookie` header into one map, percent-decoding values
/// and sanitising names.
fn parse_cookies(headers: &Headers) -> Result<FormMap> {
    let mut cookies = FormMap::new();
    let parser = KeyValueParser::new();

    let Some(values) = headers.get_values(KnownHeaderName::Cookie) else {
        return Ok(cookies);
    };

    for value in values {
        let Some(value) = value.as_str() else {
            continue;
        };
        for (name, cookie_value) in parser.parse(value)? {
            let name = sanitise_identifier(&name);
            if name.is_empty() {
                continue;
            }
            let decoded = match cookie_value {
                Some(cookie_value) => {
                    let bytes =
                        percent_decode(&cookie_value, Mode::Url, Strictness::Lenient)?;
                    String::from_utf8_lossy(&bytes).into_owned()
                }
                None => String::new(),
            };
            cookies.insert(name, FormValue::Text(decoded));
        }
    }

    Ok(cookies)
}
