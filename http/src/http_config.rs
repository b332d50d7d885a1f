use std::borrow::Cow;
use std::time::Duration;

/// Default Server header value
pub const SERVER: &str = concat!("lantern/", env!("CARGO_PKG_VERSION"));

/// Performance and protocol tuning for the engine.
///
/// All of these knobs have sensible defaults; construct one with
/// [`HttpConfig::default`] and override what you need with the chainable
/// setters.
#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub(crate) max_body_len: u64,
    pub(crate) read_timeout: Duration,
    pub(crate) write_buffer_len: usize,
    pub(crate) max_head_len: usize,
    pub(crate) request_buffer_initial_len: usize,
    pub(crate) server_id: Cow<'static, str>,
    pub(crate) default_content_type: Cow<'static, str>,
}

impl HttpConfig {
    /// the maximum accepted `Content-Length`; larger declared bodies are
    /// refused with a 413. Default: 32 MiB
    #[must_use]
    pub fn with_max_body_len(mut self, max_body_len: u64) -> Self {
        self.max_body_len = max_body_len;
        self
    }

    /// the deadline for reading a full request, from request start to the
    /// end of the body. Default: 60s
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// the largest slice handed to the transport in a single write.
    /// Default: 8kb
    #[must_use]
    pub fn with_write_buffer_len(mut self, write_buffer_len: usize) -> Self {
        self.write_buffer_len = write_buffer_len;
        self
    }

    /// the maximum length of the request line and headers, combined.
    /// Default: 8kb
    #[must_use]
    pub fn with_max_head_len(mut self, max_head_len: usize) -> Self {
        self.max_head_len = max_head_len;
        self
    }

    /// initial allocation for the request read buffer. Default: 128 bytes
    #[must_use]
    pub fn with_request_buffer_initial_len(mut self, len: usize) -> Self {
        self.request_buffer_initial_len = len;
        self
    }

    /// the value emitted as the `Server` response header.
    /// Default: `lantern/<version>`
    #[must_use]
    pub fn with_server_id(mut self, server_id: impl Into<Cow<'static, str>>) -> Self {
        self.server_id = server_id.into();
        self
    }

    /// the `Content-Type` applied to responses that do not set one.
    /// Default: `text/html`
    #[must_use]
    pub fn with_default_content_type(
        mut self,
        content_type: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.default_content_type = content_type.into();
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

pub(crate) const DEFAULT_CONFIG: HttpConfig = HttpConfig {
    max_body_len: 32 * 1024 * 1024,
    read_timeout: Duration::from_secs(60),
    write_buffer_len: 8 * 1024,
    max_head_len: 8 * 1024,
    request_buffer_initial_len: 128,
    server_id: Cow::Borrowed(SERVER),
    default_content_type: Cow::Borrowed("text/html"),
};
