use crate::{
    bufwriter::BufWriter,
    cookies::CookieJar,
    headers::Headers,
    status::{reason_phrase, StatusCode},
    Error, HttpConfig, KnownHeaderName, Result, Transport,
};
use encoding_rs::{Encoding, UTF_8};
use flate2::{write::GzEncoder, Compression};
use std::{
    fmt::{self, Debug, Formatter},
    io::Write,
    time::SystemTime,
};

/// Where the response is in its lifecycle. The first body write (or
/// close) freezes status, headers, and cookies; close freezes
/// everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    HeadersSent,
    Closed,
}

/// How the body is framed on the wire.
#[derive(Debug, Clone, Copy)]
enum Framing {
    Chunked,
    ContentLength(u64),
    /// 1xx responses carry neither framing header nor body
    None,
}

/// The writable half of a connection: status, headers, cookies, and the
/// body serialiser.
///
/// Framing is selected at header-send time from the buffering toggle:
/// with buffering disabled every `write` goes to the wire immediately as
/// one chunk of a chunked-encoded body, and with buffering enabled
/// (the default) the body accumulates in memory and is sent at
/// [`Response::close`] with an exact `Content-Length`.
pub struct Response<T> {
    writer: BufWriter<T>,
    config: HttpConfig,
    state: State,
    status: u16,
    headers: Headers,
    cookies: CookieJar,
    encoding: &'static Encoding,
    buffered: bool,
    compress: bool,
    accepts_gzip: bool,
    head_mode: bool,
    body_buffer: Vec<u8>,
    body_len: u64,
}

impl<T> Debug for Response<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("state", &self.state)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("cookies", &self.cookies)
            .field("buffered", &self.buffered)
            .field("compress", &self.compress)
            .field("head_mode", &self.head_mode)
            .field("body_len", &self.body_len)
            .finish()
    }
}

impl<T: Transport> Response<T> {
    pub(crate) fn new(transport: T, config: HttpConfig) -> Self {
        let writer = BufWriter::new(transport, config.write_buffer_len);
        Self {
            writer,
            config,
            state: State::Open,
            status: 200,
            headers: Headers::new(),
            cookies: CookieJar::new(),
            encoding: UTF_8,
            buffered: true,
            compress: false,
            accepts_gzip: false,
            head_mode: false,
            body_buffer: Vec::new(),
            body_len: 0,
        }
    }

    fn open_guard(&self) -> Result<()> {
        match self.state {
            State::Open => Ok(()),
            State::HeadersSent => Err(Error::HeadersAlreadySent),
            State::Closed => Err(Error::ResponseClosed),
        }
    }

    fn writable_guard(&self) -> Result<()> {
        match self.state {
            State::Closed => Err(Error::ResponseClosed),
            _ => Ok(()),
        }
    }

    /// the numeric response status. Defaults to 200.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the response status, either from a [`Status`][crate::Status]
    /// or a bare code. Codes outside the registry serialise with the
    /// fallback reason phrase.
    ///
    /// # Errors
    ///
    /// `Error::HeadersAlreadySent` after the first body write,
    /// `Error::ResponseClosed` after close.
    pub fn set_status(&mut self, status: impl Into<StatusCode>) -> Result<()> {
        self.open_guard()?;
        self.status = status.into().0;
        Ok(())
    }

    /// the response headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the response headers.
    ///
    /// # Errors
    ///
    /// `Error::HeadersAlreadySent` after the first body write,
    /// `Error::ResponseClosed` after close.
    pub fn headers_mut(&mut self) -> Result<&mut Headers> {
        self.open_guard()?;
        Ok(&mut self.headers)
    }

    /// the response cookies
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Mutable access to the response cookies. Each cookie becomes one
    /// `Set-Cookie` header at emission.
    ///
    /// # Errors
    ///
    /// `Error::HeadersAlreadySent` after the first body write,
    /// `Error::ResponseClosed` after close.
    pub fn cookies_mut(&mut self) -> Result<&mut CookieJar> {
        self.open_guard()?;
        Ok(&mut self.cookies)
    }

    /// is output buffering enabled?
    pub fn buffered(&self) -> bool {
        self.buffered
    }

    /// Toggle output buffering, which selects the framing: buffered
    /// responses are sent at close with a `Content-Length`, unbuffered
    /// responses stream each write as a chunk. Defaults to buffered.
    ///
    /// # Errors
    ///
    /// `Error::HeadersAlreadySent` after the first body write,
    /// `Error::ResponseClosed` after close.
    pub fn set_buffered(&mut self, buffered: bool) -> Result<()> {
        self.open_guard()?;
        self.buffered = buffered;
        Ok(())
    }

    /// Toggle gzip compression of the buffered body. Compression only
    /// applies when buffering is enabled and the request advertised
    /// support for it.
    ///
    /// # Errors
    ///
    /// `Error::HeadersAlreadySent` after the first body write,
    /// `Error::ResponseClosed` after close.
    pub fn set_compression(&mut self, compress: bool) -> Result<()> {
        self.open_guard()?;
        self.compress = compress;
        Ok(())
    }

    /// the text encoding applied by [`Response::write_str`]. Defaults to
    /// utf-8.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Set the text encoding applied by [`Response::write_str`].
    ///
    /// # Errors
    ///
    /// `Error::ResponseClosed` after close.
    pub fn set_encoding(&mut self, encoding: &'static Encoding) -> Result<()> {
        self.writable_guard()?;
        self.encoding = encoding;
        Ok(())
    }

    /// have the status and headers been frozen by a write or close?
    pub fn headers_sent(&self) -> bool {
        self.state != State::Open
    }

    /// has this response been closed?
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub(crate) fn set_accepts_gzip(&mut self, accepts_gzip: bool) {
        self.accepts_gzip = accepts_gzip;
    }

    /// Switch this response into HEAD mode: headers are retained in
    /// memory, body writes are counted but discarded, and only the
    /// status line and headers reach the wire.
    pub(crate) fn enable_head_mode(&mut self) {
        self.head_mode = true;
    }

    /// Write body bytes.
    ///
    /// The first write freezes status, headers, and cookies. Unbuffered
    /// responses emit the head (chunked framing) at that point and then
    /// each write as one atomic chunk; buffered responses accumulate in
    /// memory until close.
    ///
    /// # Errors
    ///
    /// `Error::ResponseClosed` after close, or any transport error.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writable_guard()?;

        if self.state == State::Open {
            if !self.buffered && !self.head_mode {
                let head = self.render_head(Framing::Chunked)?;
                self.writer.write_all(&head).await?;
            }
            self.state = State::HeadersSent;
        }

        self.body_len += bytes.len() as u64;

        if self.head_mode {
            return Ok(());
        }

        if self.buffered {
            self.body_buffer.extend_from_slice(bytes);
            return Ok(());
        }

        // a zero-length chunk would terminate the stream
        if bytes.is_empty() {
            return Ok(());
        }

        // one chunk per write, framed as a unit so that concurrent
        // observers never see interleaved framing
        let mut chunk = Vec::with_capacity(bytes.len() + 16);
        write!(chunk, "{:X}\r\n", bytes.len())?;
        chunk.extend_from_slice(bytes);
        chunk.extend_from_slice(b"\r\n");
        self.writer.write_all(&chunk).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Write text in the response's configured encoding.
    ///
    /// # Errors
    ///
    /// As [`Response::write`].
    pub async fn write_str(&mut self, text: &str) -> Result<()> {
        let (bytes, _, _) = self.encoding.encode(text);
        self.write(&bytes).await
    }

    /// Write text followed by CRLF.
    ///
    /// # Errors
    ///
    /// As [`Response::write`].
    pub async fn write_line(&mut self, text: &str) -> Result<()> {
        self.write_str(text).await?;
        self.write(b"\r\n").await
    }

    /// Finish the response: emit whatever framing is still owed
    /// (headers and body in buffered mode, the terminating zero-length
    /// chunk in unbuffered mode), flush the transport, and freeze the
    /// response for good.
    ///
    /// # Errors
    ///
    /// `Error::ResponseClosed` if already closed, or any transport
    /// error.
    pub async fn close(&mut self) -> Result<()> {
        self.writable_guard()?;
        let never_written = self.state == State::Open;
        self.state = State::Closed;

        log::trace!(
            "sending: HTTP/1.1 {} {}",
            self.status,
            reason_phrase(self.status)
        );

        if self.head_mode {
            let framing = if self.buffered {
                Framing::ContentLength(self.body_len)
            } else {
                Framing::Chunked
            };
            let head = self.render_head(framing)?;
            self.writer.write_all(&head).await?;
        } else if self.buffered {
            let mut body = std::mem::take(&mut self.body_buffer);
            if self.compress && self.accepts_gzip && !body.is_empty() {
                body = gzip(&body)?;
                self.headers
                    .insert(KnownHeaderName::ContentEncoding, "gzip")?;
            }
            let head = self.render_head(Framing::ContentLength(body.len() as u64))?;
            self.writer.write_all(&head).await?;
            if self.status >= 200 {
                self.writer.write_all(&body).await?;
            }
        } else {
            if never_written {
                let head = self.render_head(Framing::Chunked)?;
                self.writer.write_all(&head).await?;
            }
            if self.status >= 200 {
                self.writer.write_all(b"0\r\n\r\n").await?;
            }
        }

        self.writer.flush().await?;
        Ok(())
    }

    /// Finalise default headers, latch the cookies and then the headers,
    /// and render the status line and header block.
    fn render_head(&mut self, framing: Framing) -> Result<Vec<u8>> {
        let framing = if self.status < 200 {
            Framing::None
        } else {
            framing
        };

        match framing {
            Framing::Chunked => {
                self.headers
                    .insert(KnownHeaderName::TransferEncoding, "chunked")?;
                self.headers.remove(KnownHeaderName::ContentLength)?;
            }
            Framing::ContentLength(len) => {
                self.headers.insert(KnownHeaderName::ContentLength, len)?;
                self.headers.remove(KnownHeaderName::TransferEncoding)?;
            }
            Framing::None => {
                self.headers.remove(KnownHeaderName::TransferEncoding)?;
                self.headers.remove(KnownHeaderName::ContentLength)?;
            }
        }

        self.headers.insert(
            KnownHeaderName::Date,
            httpdate::fmt_http_date(SystemTime::now()),
        )?;
        self.headers
            .insert(KnownHeaderName::Server, self.config.server_id.clone())?;
        if !matches!(framing, Framing::None) {
            self.headers.try_insert(
                KnownHeaderName::ContentType,
                self.config.default_content_type.clone(),
            )?;
        }

        self.cookies.seal();
        for cookie in &self.cookies {
            self.headers
                .append(KnownHeaderName::SetCookie, cookie.to_string())?;
        }
        self.headers.seal();

        let mut head = Vec::with_capacity(256);
        write!(
            head,
            "HTTP/1.1 {} {}\r\n",
            self.status,
            reason_phrase(self.status)
        )?;

        for (name, values) in &self.headers {
            if !name.is_valid() {
                log::error!("skipping invalid header name {name:?}");
                continue;
            }
            for value in values {
                if value.is_valid() {
                    write!(head, "{name}: ")?;
                    head.extend_from_slice(value.as_bytes());
                    head.extend_from_slice(b"\r\n");
                } else {
                    log::error!("skipping invalid header value {value:?} for header {name}");
                }
            }
        }

        head.extend_from_slice(b"\r\n");
        Ok(head)
    }
}

fn gzip(body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body).map_err(Error::Io)?;
    encoder.finish().map_err(Error::Io)
}
