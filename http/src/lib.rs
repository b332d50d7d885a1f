//! # An embeddable HTTP/1.1 origin engine
//!
//! `lantern-http` is the protocol core of the lantern toolkit: it speaks
//! HTTP/1.1 over any duplex byte stream, parses one request into a typed
//! [`Request`], hands it to a [`Handler`] along with a [`Response`]
//! writer, and serialises a conformant response: chunked when the
//! handler streams, `Content-Length`-framed when it buffers.
//!
//! The engine deliberately ends at the byte stream: accepting tcp
//! connections, routing, tls, and configuration files belong to the
//! embedding server. See [`Conn`] for the way in.
#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    nonstandard_style,
    unused_qualifications
)]
#![warn(missing_docs)]

pub mod codec;

mod buffer;
mod bufwriter;
mod decoders;

mod error;
pub use error::{Error, Result};

mod status;
pub use status::{reason_phrase, Status, StatusCode, FALLBACK_REASON};

mod http_config;
pub use http_config::{HttpConfig, SERVER};

mod headers;
pub use headers::{
    Csv, HeaderName, HeaderValue, HeaderValues, Headers, KnownHeaderName, MediaType, OrderedCsv,
    OrderedCsvItem, Parameterised,
};

mod cookies;
pub use cookies::{Cookie, CookieJar};

mod form;
pub use form::{FormMap, FormValue};

mod request;
pub use request::Request;

mod response;
pub use response::Response;

mod conn;
pub use conn::{default_error_response, Conn, Handler};

mod transport;
pub use transport::Transport;

mod synthetic;
pub use synthetic::{Synthetic, SyntheticOutput};
