use futures_lite::{AsyncRead, AsyncWrite};
use std::{io::Result, net::SocketAddr};

/// The byte stream the engine speaks HTTP over.
///
/// One request is read from the transport, one response is written back,
/// and the transport is then dropped; the engine never shares a transport
/// between connections. Any duplex stream can implement this: a tcp
/// stream accepted by the embedding server, a unix socket, or an
/// in-memory [`Synthetic`][crate::Synthetic] stream for tests. Both trait
/// methods are optional to implement.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static {
    /// Sets the value of the `TCP_NODELAY` option on this transport, if
    /// it is socket-backed.
    ///
    /// # Errors
    ///
    /// Return an error if this transport supports setting nodelay and
    /// attempting to do so is unsuccessful.
    fn set_nodelay(&mut self, nodelay: bool) -> Result<()> {
        let _ = nodelay;
        Ok(())
    }

    /// Returns the socket address of the remote peer of this transport,
    /// if there is one.
    ///
    /// # Errors
    ///
    /// Return an error if this transport supports retrieving the remote
    /// peer but attempting to do so is unsuccessful.
    fn peer_addr(&self) -> Result<Option<SocketAddr>> {
        Ok(None)
    }
}
