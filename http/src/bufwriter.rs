use futures_lite::{io::AsyncWriteExt, AsyncWrite};
use std::io::{Error, ErrorKind, Result};

/// Writes to the transport in slices of at most `capacity` bytes,
/// coalescing small writes into full slabs along the way.
pub(crate) struct BufWriter<W> {
    inner: W,
    slab: Vec<u8>,
    capacity: usize,
}

impl<W: AsyncWrite + Unpin> BufWriter<W> {
    pub(crate) fn new(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            slab: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Buffer `bytes`, flushing full slabs to the transport as they fill.
    pub(crate) async fn write_all(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let room = self.capacity - self.slab.len();
            if room == 0 {
                self.flush_slab().await?;
                continue;
            }
            let take = room.min(bytes.len());
            self.slab.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
        }
        Ok(())
    }

    /// Push the pending slab and anything the transport itself buffers.
    pub(crate) async fn flush(&mut self) -> Result<()> {
        self.flush_slab().await?;
        self.inner.flush().await
    }

    async fn flush_slab(&mut self) -> Result<()> {
        let mut written = 0;
        while written < self.slab.len() {
            match self.inner.write(&self.slab[written..]).await {
                Ok(0) => {
                    return Err(Error::new(
                        ErrorKind::WriteZero,
                        "transport refused buffered data",
                    ));
                }
                Ok(n) => written += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        self.slab.clear();
        Ok(())
    }
}

impl<W> std::fmt::Debug for BufWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufWriter")
            .field("pending", &self.slab.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
