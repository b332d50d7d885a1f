//! End-to-end exchanges over a synthetic transport, asserting on the
//! exact bytes the engine puts on the wire.

use futures_lite::future::block_on;
use lantern_http::{
    Conn, Cookie, Error, Handler, HttpConfig, Request, Response, Result, Status, Synthetic,
    Transport,
};
use std::io::Read;

fn run<H: Handler<Synthetic>>(wire: impl Into<Vec<u8>>, handler: &H) -> Vec<u8> {
    run_with(wire, handler, HttpConfig::default(), false)
}

fn run_with<H: Handler<Synthetic>>(
    wire: impl Into<Vec<u8>>,
    handler: &H,
    config: HttpConfig,
    stay_open: bool,
) -> Vec<u8> {
    let mut transport = Synthetic::new(wire);
    if stay_open {
        transport = transport.stay_open();
    }
    let output = transport.output();
    block_on(Conn::new(transport).with_config(config).run(handler)).unwrap();
    output.bytes()
}

fn text(wire: &[u8]) -> String {
    String::from_utf8_lossy(wire).into_owned()
}

/// the bytes after the header terminator
fn body_of(wire: &[u8]) -> Vec<u8> {
    let index = wire
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .expect("response should have a header terminator");
    wire[index + 4..].to_vec()
}

struct Echo;

impl<T: Transport> Handler<T> for Echo {
    async fn handle(&self, request: &Request, response: &mut Response<T>) -> Result<()> {
        let greeting = format!("{} {}", request.method(), request.path());
        response.write_str(&greeting).await
    }
}

struct Streaming(&'static [&'static str]);

impl<T: Transport> Handler<T> for Streaming {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.set_buffered(false)?;
        for piece in self.0 {
            response.write_str(piece).await?;
        }
        Ok(())
    }
}

struct WriteHi;

impl<T: Transport> Handler<T> for WriteHi {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.write_str("hi").await
    }
}

#[test]
fn buffered_response_has_exact_content_length() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &WriteHi);
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("Content-Length: 2\r\n"), "{response}");
    assert!(!response.contains("Transfer-Encoding"), "{response}");
    assert_eq!(body_of(&wire), b"hi");
}

#[test]
fn unbuffered_response_is_chunked() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &Streaming(&["hi"]));
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("Transfer-Encoding: chunked\r\n"), "{response}");
    assert!(!response.contains("Content-Length"), "{response}");
    assert_eq!(body_of(&wire), b"2\r\nhi\r\n0\r\n\r\n");
}

#[test]
fn chunk_payloads_concatenate_to_the_written_bytes() {
    let wire = run(
        "GET / HTTP/1.1\r\nHost: ex\r\n\r\n",
        &Streaming(&["alpha", "b", "gamma"]),
    );
    assert_eq!(
        body_of(&wire),
        b"5\r\nalpha\r\n1\r\nb\r\n5\r\ngamma\r\n0\r\n\r\n"
    );
}

#[test]
fn default_headers_are_applied() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &WriteHi);
    let response = text(&wire);
    assert!(response.contains("\r\nDate: "), "{response}");
    assert!(
        response.contains(&format!("\r\nServer: {}\r\n", lantern_http::SERVER)),
        "{response}"
    );
    assert!(response.contains("\r\nContent-Type: text/html\r\n"), "{response}");
}

struct PlainText;

impl<T: Transport> Handler<T> for PlainText {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response
            .headers_mut()?
            .insert("content-type", "text/plain; charset=utf-8")?;
        response.write_str("ok").await
    }
}

#[test]
fn content_type_default_yields_to_the_handler() {
    let response = text(&run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &PlainText));
    assert!(
        response.contains("\r\nContent-Type: text/plain; charset=utf-8\r\n"),
        "{response}"
    );
    assert!(!response.contains("text/html"), "{response}");
}

#[test]
fn head_requests_suppress_the_body() {
    let wire = run("HEAD /foo HTTP/1.1\r\nHost: ex\r\n\r\n", &Echo);
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    // the discarded body was "HEAD /foo", 9 bytes
    assert!(response.contains("Content-Length: 9\r\n"), "{response}");
    assert!(body_of(&wire).is_empty(), "{response}");
}

struct SetCookies;

impl<T: Transport> Handler<T> for SetCookies {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.cookies_mut()?.add(Cookie::new("sid", "abc")?)?;
        response
            .cookies_mut()?
            .add(Cookie::new("theme", "dark")?.with_path("/").with_http_only(true))?;
        response.write_str("ok").await
    }
}

#[test]
fn one_set_cookie_header_per_cookie() {
    let response = text(&run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &SetCookies));
    assert!(response.contains("\r\nSet-Cookie: sid=abc\r\n"), "{response}");
    assert!(
        response.contains("\r\nSet-Cookie: theme=dark; Path=/; HttpOnly\r\n"),
        "{response}"
    );
}

struct Teapot;

impl<T: Transport> Handler<T> for Teapot {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.set_status(Status::ImATeapot)?;
        Ok(())
    }
}

#[test]
fn status_reasons_come_from_the_registry() {
    let response = text(&run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &Teapot));
    assert!(response.starts_with("HTTP/1.1 418 I'm a teapot\r\n"), "{response}");
}

struct NonStandard;

impl<T: Transport> Handler<T> for NonStandard {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.set_status(299u16)?;
        Ok(())
    }
}

#[test]
fn unknown_codes_use_the_fallback_reason() {
    let response = text(&run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &NonStandard));
    assert!(
        response.starts_with("HTTP/1.1 299 Non-Standard Status Code\r\n"),
        "{response}"
    );
}

struct SwitchingProtocols;

impl<T: Transport> Handler<T> for SwitchingProtocols {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.set_status(Status::SwitchingProtocols)?;
        response.headers_mut()?.insert("Upgrade", "websocket")?;
        Ok(())
    }
}

#[test]
fn informational_statuses_carry_no_framing() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &SwitchingProtocols);
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 101 Switching Protocols\r\n"), "{response}");
    assert!(response.contains("\r\nUpgrade: websocket\r\n"), "{response}");
    assert!(!response.contains("Content-Length"), "{response}");
    assert!(!response.contains("Transfer-Encoding"), "{response}");
    assert!(body_of(&wire).is_empty());
}

struct Compressed;

impl<T: Transport> Handler<T> for Compressed {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.set_compression(true)?;
        response.write_str(&"squeeze me ".repeat(64)).await
    }
}

#[test]
fn gzip_when_the_request_accepts_it() {
    let wire = run(
        "GET / HTTP/1.1\r\nHost: ex\r\nAccept-Encoding: gzip;q=0.5, identity;q=0\r\n\r\n",
        &Compressed,
    );
    let response = text(&wire);
    assert!(response.contains("\r\nContent-Encoding: gzip\r\n"), "{response}");

    let body = body_of(&wire);
    let declared: usize = response
        .split("Content-Length: ")
        .nth(1)
        .and_then(|rest| rest.split("\r\n").next())
        .and_then(|len| len.parse().ok())
        .expect("content-length header");
    assert_eq!(body.len(), declared);

    let mut inflated = String::new();
    flate2::read::GzDecoder::new(&body[..])
        .read_to_string(&mut inflated)
        .unwrap();
    assert_eq!(inflated, "squeeze me ".repeat(64));
}

#[test]
fn no_gzip_without_accept_encoding() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &Compressed);
    let response = text(&wire);
    assert!(!response.contains("Content-Encoding"), "{response}");
    assert_eq!(body_of(&wire), "squeeze me ".repeat(64).into_bytes());
}

#[test]
fn no_gzip_when_every_coding_is_unacceptable() {
    let wire = run(
        "GET / HTTP/1.1\r\nHost: ex\r\nAccept-Encoding: gzip;q=0\r\n\r\n",
        &Compressed,
    );
    assert!(!text(&wire).contains("Content-Encoding"));
}

#[test]
fn malformed_request_line_gets_a_generic_400() {
    let response = text(&run("GARBAGE\r\n\r\n", &WriteHi));
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
    assert!(response.contains("\r\nContent-Type: text/plain\r\n"), "{response}");
    assert!(response.contains("400 Bad Request"), "{response}");
}

#[test]
fn invalid_content_length_reaches_the_error_handler() {
    let response = text(&run(
        "POST / HTTP/1.1\r\nContent-Length: banana\r\n\r\n",
        &WriteHi,
    ));
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
    assert!(response.contains("Invalid content-length"), "{response}");
}

#[test]
fn oversized_body_gets_a_413() {
    let response = text(&run_with(
        "POST / HTTP/1.1\r\nContent-Length: 1000\r\n\r\n",
        &WriteHi,
        HttpConfig::default().with_max_body_len(100),
        false,
    ));
    assert!(response.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "{response}");
}

struct CustomErrors;

impl<T: Transport> Handler<T> for CustomErrors {
    async fn handle(&self, _request: &Request, _response: &mut Response<T>) -> Result<()> {
        Err(Error::MalformedEncoding("handler rejected the payload".into()))
    }

    async fn handle_error(&self, error: Error, response: &mut Response<T>) -> Result<()> {
        response.set_status(error.status().map_or(500, u16::from))?;
        response.write_str("custom error page").await
    }
}

#[test]
fn the_error_handler_is_overridable() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &CustomErrors);
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
    assert_eq!(body_of(&wire), b"custom error page");
}

struct FailsInternally;

impl<T: Transport> Handler<T> for FailsInternally {
    async fn handle(&self, _request: &Request, _response: &mut Response<T>) -> Result<()> {
        Err(Error::Internal("secret diagnostic".into()))
    }
}

#[test]
fn internal_errors_surface_as_a_bare_500() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &FailsInternally);
    let response = text(&wire);
    assert!(
        response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"),
        "{response}"
    );
    assert!(!response.contains("secret diagnostic"), "{response}");
    assert_eq!(body_of(&wire), b"500 Internal Server Error");
}

struct LatchViolation;

impl<T: Transport> Handler<T> for LatchViolation {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.write_str("partial").await?;
        response.set_status(201)?;
        Ok(())
    }
}

#[test]
fn latch_violations_never_leak_detail() {
    // the handler trips over the frozen status mid-response; whatever was
    // already written goes out, but the error text never does
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &LatchViolation);
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(!response.contains("Headers already sent"), "{response}");
    assert_eq!(body_of(&wire), b"partial");
}

struct LatchAssertions;

impl<T: Transport> Handler<T> for LatchAssertions {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.set_status(200)?;
        response.write_str("body").await?;
        assert!(matches!(
            response.set_status(201),
            Err(Error::HeadersAlreadySent)
        ));
        assert!(matches!(
            response.headers_mut(),
            Err(Error::HeadersAlreadySent)
        ));
        assert!(matches!(
            response.cookies_mut(),
            Err(Error::HeadersAlreadySent)
        ));
        assert!(matches!(
            response.set_buffered(false),
            Err(Error::HeadersAlreadySent)
        ));
        assert!(matches!(
            response.set_compression(true),
            Err(Error::HeadersAlreadySent)
        ));
        Ok(())
    }
}

#[test]
fn the_first_write_freezes_the_response() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &LatchAssertions);
    assert_eq!(body_of(&wire), b"body");
}

struct ClosesItself;

impl<T: Transport> Handler<T> for ClosesItself {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.write_str("done").await?;
        response.close().await?;
        assert!(matches!(
            response.write(b"late").await,
            Err(Error::ResponseClosed)
        ));
        assert!(matches!(response.close().await, Err(Error::ResponseClosed)));
        Ok(())
    }
}

#[test]
fn a_closed_response_refuses_everything() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &ClosesItself);
    assert_eq!(body_of(&wire), b"done");
}

struct ObservesRequest;

impl<T: Transport> Handler<T> for ObservesRequest {
    async fn handle(&self, request: &Request, response: &mut Response<T>) -> Result<()> {
        assert_eq!(request.method(), "POST");
        assert_eq!(request.path(), "/submit");
        assert_eq!(request.query().unwrap().get_str("v"), Some("2"));
        assert_eq!(request.form().unwrap().get_str("name"), Some("ab"));
        assert_eq!(request.cookies().get_str("sid"), Some("xyz"));
        assert_eq!(
            request.headers().get_str("content-type"),
            request.headers().get_str("Content-Type"),
        );
        response.write_str("seen").await
    }
}

#[test]
fn the_handler_sees_the_parsed_request() {
    let wire = run(
        "POST /submit/?v=2 HTTP/1.1\r\n\
         Host: ex\r\n\
         Cookie: sid=xyz\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 7\r\n\r\n\
         name=ab",
        &ObservesRequest,
    );
    assert_eq!(body_of(&wire), b"seen");
}

#[test]
fn leading_blank_lines_are_tolerated() {
    let wire = run("\r\n\r\n\r\nGET /late HTTP/1.1\r\nHost: ex\r\n\r\n", &Echo);
    assert_eq!(body_of(&wire), b"GET /late");
}

#[test]
fn a_stalled_body_times_out_with_408() {
    let config = HttpConfig::default().with_read_timeout(std::time::Duration::from_millis(50));
    let wire = run_with(
        "POST /slow HTTP/1.1\r\nContent-Length: 10\r\n\r\nab",
        &WriteHi,
        config,
        true,
    );
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 408 Request Timeout\r\n"), "{response}");
}

#[test]
fn a_connection_that_never_speaks_closes_silently() {
    let config = HttpConfig::default().with_read_timeout(std::time::Duration::from_millis(50));
    let wire = run_with(Vec::new(), &WriteHi, config, true);
    assert!(wire.is_empty());
}

struct Lines;

impl<T: Transport> Handler<T> for Lines {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.write_line("first").await?;
        response.write_line("second").await
    }
}

#[test]
fn write_line_appends_crlf() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &Lines);
    assert_eq!(body_of(&wire), b"first\r\nsecond\r\n");
    assert!(text(&wire).contains("Content-Length: 15\r\n"));
}

struct Latin1;

impl<T: Transport> Handler<T> for Latin1 {
    async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
        response.set_encoding(encoding_rs::WINDOWS_1252)?;
        response.write_str("café").await
    }
}

#[test]
fn the_encoding_property_governs_text_writes() {
    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &Latin1);
    assert_eq!(body_of(&wire), [b'c', b'a', b'f', 0xe9]);
    assert!(text(&wire).contains("Content-Length: 4\r\n"));
}

#[test]
fn an_untouched_response_is_an_empty_200() {
    struct Nothing;
    impl<T: Transport> Handler<T> for Nothing {
        async fn handle(&self, _request: &Request, _response: &mut Response<T>) -> Result<()> {
            Ok(())
        }
    }

    let wire = run("GET / HTTP/1.1\r\nHost: ex\r\n\r\n", &Nothing);
    let response = text(&wire);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("Content-Length: 0\r\n"), "{response}");
    assert!(body_of(&wire).is_empty());
}
