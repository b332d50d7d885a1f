use crate::{
    buffer::Buffer, request::ReceiveFailure, status::reason_phrase, Error, HttpConfig,
    KnownHeaderName, Request, Response, Result, Transport,
};
use std::future::Future;

/// The capability a connection hands its embedder: respond to one
/// parsed request.
///
/// `handle` receives the request and the response writer for exactly one
/// exchange. Returning a protocol [`Error`] (one that describes a
/// violation by the peer) routes through [`Handler::handle_error`],
/// whose default writes `status reason` and the error text as
/// `text/plain`. Any other failure, [`Error::Internal`] included,
/// becomes a bare `500` with no detail.
pub trait Handler<T: Transport>: Send + Sync {
    /// Respond to a request. The response may be left untouched (it
    /// defaults to an empty `200`), written incrementally, or configured
    /// and written all at once; the connection closes it afterwards
    /// either way.
    fn handle(
        &self,
        request: &Request,
        response: &mut Response<T>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Describe a protocol error to the client. The default
    /// implementation writes the status line content and the error text
    /// as `text/plain`.
    fn handle_error(
        &self,
        error: Error,
        response: &mut Response<T>,
    ) -> impl Future<Output = Result<()>> + Send {
        default_error_response(error, response)
    }
}

/// The default error body: `<code> <reason>` and the error's own text,
/// as `text/plain`.
///
/// # Errors
///
/// Fails if the response has already sent its headers or closed, or on
/// transport errors.
pub async fn default_error_response<T: Transport>(
    error: Error,
    response: &mut Response<T>,
) -> Result<()> {
    let status = error.status().map_or(500, u16::from);
    response.set_status(status)?;
    response
        .headers_mut()?
        .insert(KnownHeaderName::ContentType, "text/plain")?;
    response
        .write_str(&format!("{} {}\r\n{}", status, reason_phrase(status), error))
        .await
}

/// One accepted connection: a transport plus the engine that speaks
/// HTTP/1.1 over it.
///
/// ```
/// # use lantern_http::{Conn, Handler, Request, Response, Result, Synthetic, Transport};
/// struct Hello;
///
/// impl<T: Transport> Handler<T> for Hello {
///     async fn handle(&self, _request: &Request, response: &mut Response<T>) -> Result<()> {
///         response.write_str("hello").await
///     }
/// }
///
/// # futures_lite::future::block_on(async {
/// let transport = Synthetic::new(&b"GET / HTTP/1.1\r\nHost: ex\r\n\r\n"[..]);
/// let output = transport.output();
/// Conn::new(transport).run(&Hello).await?;
/// assert!(output.to_utf8().starts_with("HTTP/1.1 200 OK\r\n"));
/// # lantern_http::Result::Ok(()) }).unwrap();
/// ```
#[derive(Debug)]
pub struct Conn<T> {
    transport: T,
    config: HttpConfig,
}

impl<T: Transport> Conn<T> {
    /// Wrap an accepted transport with the default [`HttpConfig`].
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: HttpConfig::default(),
        }
    }

    /// chainable setter for this connection's configuration
    #[must_use]
    pub fn with_config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Serve one request/response exchange and close the connection.
    ///
    /// The request is parsed under the configured read deadline, the
    /// handler is invoked, handler and parse errors are translated into
    /// error responses, and the response is closed along every path. A
    /// request whose request line never parsed is answered with a
    /// generic `400`; a connection that closes (or stalls) before
    /// sending a request line is torn down silently.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that could not be described to
    /// the client, such as transport io errors.
    pub async fn run<H: Handler<T>>(self, handler: &H) -> Result<()> {
        let Self {
            mut transport,
            config,
        } = self;
        let mut buffer = Buffer::with_capacity(config.request_buffer_initial_len);

        match Request::receive(&mut transport, &mut buffer, &config).await {
            Ok(request) => {
                log::trace!("handling: {} {}", request.method(), request.path());
                let mut response = prepare_response(transport, config, &request);
                if let Err(error) = handler.handle(&request, &mut response).await {
                    dispatch_error(handler, error, &mut response).await;
                }
                finish(&mut response).await
            }

            // the request failed but we know what was asked: let the
            // error handler see the partial request context
            Err(ReceiveFailure {
                error,
                request: Some(request),
            }) => {
                if matches!(error, Error::Closed) {
                    log::trace!("connection closed mid-request");
                    return Ok(());
                }
                let mut response = prepare_response(transport, config, &request);
                dispatch_error(handler, error, &mut response).await;
                finish(&mut response).await
            }

            Err(ReceiveFailure {
                error: Error::Closed,
                request: None,
            }) => {
                log::trace!("connection closed before a request line");
                Ok(())
            }

            // no request context at all: a generic reply, no handler
            // involvement
            Err(ReceiveFailure {
                error,
                request: None,
            }) => {
                if !error.is_protocol_error() {
                    return Err(error);
                }
                let mut response = Response::new(transport, config);
                if let Err(residual) = default_error_response(error, &mut response).await {
                    log::error!("failed to describe request error: {residual}");
                }
                finish(&mut response).await
            }
        }
    }
}

/// Close the response unless the handler already did.
async fn finish<T: Transport>(response: &mut Response<T>) -> Result<()> {
    if response.is_closed() {
        Ok(())
    } else {
        response.close().await
    }
}

fn prepare_response<T: Transport>(
    transport: T,
    config: HttpConfig,
    request: &Request,
) -> Response<T> {
    let mut response = Response::new(transport, config);
    if request.method() == "HEAD" {
        response.enable_head_mode();
    }
    response.set_accepts_gzip(accepts_gzip(request));
    response
}

/// Route a failure to the right description: protocol errors go through
/// the handler's error hook, everything else becomes a bare `500` with
/// no detail.
async fn dispatch_error<T: Transport, H: Handler<T>>(
    handler: &H,
    error: Error,
    response: &mut Response<T>,
) {
    log::error!("handler error: {error}");

    let outcome = if error.is_protocol_error() {
        handler.handle_error(error, response).await
    } else {
        internal_server_error(response).await
    };

    if let Err(residual) = outcome {
        log::error!("error handler failed: {residual}");
    }
}

async fn internal_server_error<T: Transport>(response: &mut Response<T>) -> Result<()> {
    response.set_status(500)?;
    response
        .headers_mut()?
        .insert(KnownHeaderName::ContentType, "text/plain")?;
    response.write_str("500 Internal Server Error").await
}

fn accepts_gzip(request: &Request) -> bool {
    let Some(values) = request
        .headers()
        .get_values(KnownHeaderName::AcceptEncoding)
    else {
        return false;
    };

    values
        .iter()
        .any(|value| match value.to_ordered_csv(true) {
            Ok(list) => list.accepts("gzip") || list.accepts("*"),
            Err(_) => false,
        })
}
