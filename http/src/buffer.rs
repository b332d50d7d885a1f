/// A read buffer with a consumed-bytes front offset, so the head parser
/// can hand leftover bytes to the body reader without copying.
#[derive(Debug, Default)]
#[doc(hidden)]
pub struct Buffer {
    offset: usize,
    bytes: Vec<u8>,
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { offset: 0, bytes }
    }
}

impl std::ops::Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes[self.offset..]
    }
}

impl std::ops::DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bytes[self.offset..]
    }
}

#[doc(hidden)]
impl Buffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            offset: 0,
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Discard `n` bytes from the front of the buffer.
    pub fn ignore_front(&mut self, n: usize) {
        self.offset += n;
        if self.offset >= self.bytes.len() {
            self.bytes.truncate(0);
            self.offset = 0;
        }
    }

    /// Keep only the first `n` unconsumed bytes.
    pub fn truncate(&mut self, n: usize) {
        if n == 0 {
            self.offset = 0;
            self.bytes.truncate(0);
        } else {
            self.bytes.truncate(self.offset + n);
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Grow the backing storage and zero-fill it so that reads can land
    /// past the current length.
    pub fn expand(&mut self) {
        if self.bytes.len() == self.bytes.capacity() {
            self.bytes.reserve(32);
        }
        self.bytes.resize(self.bytes.capacity(), 0);
    }
}
