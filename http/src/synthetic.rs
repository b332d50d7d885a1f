use crate::Transport;
use futures_lite::io::{AsyncRead, AsyncWrite, Cursor};
use std::{
    io::Result,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};

/// An in-memory transport with fixed request content.
///
/// This is useful for testing and for embeddings that are not read from
/// an io connection, such as a faas invocation where the entire request
/// is available up front. Everything the engine writes is captured and
/// can be inspected through the [`SyntheticOutput`] handle, which stays
/// valid after the engine has consumed the transport.
///
/// By default the input behaves like a half-closed connection: once it
/// is exhausted, reads return end-of-file. [`Synthetic::stay_open`]
/// switches exhausted reads to pending instead, which is how a real
/// client that simply stops sending looks to the engine.
#[derive(Debug)]
pub struct Synthetic {
    input: Cursor<Vec<u8>>,
    output: SyntheticOutput,
    stay_open: bool,
}

/// A cloneable handle onto the bytes a [`Synthetic`] transport has been
/// sent.
#[derive(Clone, Debug, Default)]
pub struct SyntheticOutput(Arc<Mutex<Vec<u8>>>);

impl SyntheticOutput {
    /// A snapshot of the bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The written bytes as a string, with any non-utf8 sequences
    /// replaced.
    pub fn to_utf8(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }
}

impl Synthetic {
    /// Construct a synthetic transport that will serve the given bytes
    /// as its request content.
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: Cursor::new(input.into()),
            output: SyntheticOutput::default(),
            stay_open: false,
        }
    }

    /// Keep the read side open after the input is exhausted, so further
    /// reads pend instead of signalling end-of-file.
    #[must_use]
    pub fn stay_open(mut self) -> Self {
        self.stay_open = true;
        self
    }

    /// A handle onto everything the engine writes to this transport.
    pub fn output(&self) -> SyntheticOutput {
        self.output.clone()
    }

    /// the length of this transport's input
    pub fn len(&self) -> usize {
        self.input.get_ref().len()
    }

    /// predicate to determine if this transport has no input content
    pub fn is_empty(&self) -> bool {
        self.input.get_ref().is_empty()
    }
}

impl From<&str> for Synthetic {
    fn from(input: &str) -> Self {
        Self::new(input.as_bytes().to_vec())
    }
}

impl From<String> for Synthetic {
    fn from(input: String) -> Self {
        Self::new(input.into_bytes())
    }
}

impl From<Vec<u8>> for Synthetic {
    fn from(input: Vec<u8>) -> Self {
        Self::new(input)
    }
}

impl From<()> for Synthetic {
    fn from((): ()) -> Self {
        Self::new(Vec::new())
    }
}

impl AsyncRead for Synthetic {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<Result<usize>> {
        let Synthetic {
            input, stay_open, ..
        } = &mut *self;
        match Pin::new(input).poll_read(cx, buf) {
            Poll::Ready(Ok(0)) if *stay_open => Poll::Pending,
            other => other,
        }
    }
}

impl AsyncWrite for Synthetic {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize>> {
        self.output
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl Transport for Synthetic {}
