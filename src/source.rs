use futures::io::{AllowStdIo, AsyncRead, AsyncReadExt};

use crate::errors::cursor::CursorError;

pub const DEFAULT_BUFFER_LEN: usize = 1024 * 64;

/// Smallest buffer a [`BufferedSource`] will use: room for an id and a size vint.
const MIN_BUFFER_LEN: usize = 16;

///
/// A forward-only byte supplier with a lookahead window.
///
/// This is the only abstraction an [`ElementCursor`](crate::ElementCursor) needs from its environment.  The two `async` methods are the only places a parse can suspend.
///
#[allow(async_fn_in_trait)]
pub trait ByteSource {
    ///
    /// Bytes available without suspending.
    ///
    fn buffered(&self) -> &[u8];

    ///
    /// Number of bytes consumed since the source was created.
    ///
    fn position(&self) -> u64;

    ///
    /// Guarantees that at least `len` bytes are buffered.
    ///
    /// Returns `Ok(false)` if the underlying transport ended before `len` bytes arrived.  Whatever did arrive stays buffered.
    ///
    async fn ensure(&mut self, len: usize) -> Result<bool, CursorError>;

    ///
    /// Drops `len` already buffered bytes.
    ///
    fn consume(&mut self, len: usize);

    ///
    /// Discards `len` bytes, buffered or not, without ever holding more than the current window in memory.
    ///
    /// Returns how many bytes were actually discarded; this is less than `len` only when the transport ended.
    ///
    async fn skip(&mut self, len: u64) -> Result<u64, CursorError>;
}

///
/// Provides a [`ByteSource`] over any source implementing [`futures::AsyncRead`].
///
/// Blocking [`std::io::Read`] sources can be used through [`Self::from_read()`].
///
/// Note: The [`Self::with_capacity()`] method can be used to construct a `BufferedSource` with a specified default buffer size.  The buffer only reallocates when a single value that has to be materialised (e.g. an attachment payload that is retained) is larger than the current capacity, and then at most doubles per read that fills it; skipped data never causes a reallocation.
///
/// ## Example
///
/// ```no_run
/// use ebml_cursor::{BufferedSource, ElementCursor};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let file = std::fs::File::open("my_ebml_file.mkv")?;
/// let mut source = BufferedSource::from_read(file);
/// futures::executor::block_on(async {
///     let mut cursor = ElementCursor::new(&mut source);
///     while let Some(element) = cursor.advance().await? {
///         println!("{:x} {:?}", element.id, element.size);
///     }
///     Ok::<_, ebml_cursor::error::CursorError>(())
/// })?;
/// # Ok(())
/// # }
/// ```
///
pub struct BufferedSource<R: AsyncRead + Unpin> {
    source: R,
    buffer: Box<[u8]>,
    internal_buffer_position: usize,
    buffered_byte_length: usize,
    position: u64,
    reached_eof: bool,
}

impl<R: AsyncRead + Unpin> BufferedSource<R> {
    ///
    /// Returns a new `BufferedSource` with the default buffer capacity.
    ///
    pub fn new(source: R) -> Self {
        BufferedSource::with_capacity(source, DEFAULT_BUFFER_LEN)
    }

    ///
    /// Returns a new `BufferedSource` instance with the specified internal buffer capacity.
    ///
    pub fn with_capacity(source: R, capacity: usize) -> Self {
        let buffer = vec![0; capacity.max(MIN_BUFFER_LEN)];

        BufferedSource {
            source,
            buffer: buffer.into_boxed_slice(),
            internal_buffer_position: 0,
            buffered_byte_length: 0,
            position: 0,
            reached_eof: false,
        }
    }

    ///
    /// Current size of the internal buffer.
    ///
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn available(&self) -> usize {
        self.buffered_byte_length - self.internal_buffer_position
    }

    async fn private_read(&mut self) -> Result<usize, CursorError> {
        let bytes_read = loop {
            match self.source.read(&mut self.buffer[self.buffered_byte_length..]).await {
                Ok(read) => break read,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(CursorError::ReadError { source }),
            }
        };
        if bytes_read == 0 {
            self.reached_eof = true;
        }
        self.buffered_byte_length += bytes_read;
        Ok(bytes_read)
    }

    fn compact(&mut self) {
        self.buffer.copy_within(self.internal_buffer_position..self.buffered_byte_length, 0);
        self.buffered_byte_length -= self.internal_buffer_position;
        self.internal_buffer_position = 0;
    }

    fn ensure_capacity(&mut self, required_capacity: usize) {
        if required_capacity > self.buffer.len() {
            tracing::trace!(from = self.buffer.len(), to = required_capacity, "growing source buffer");
            let mut new_buffer = Vec::from(&self.buffer[..]);
            new_buffer.resize(required_capacity, 0);
            self.buffer = new_buffer.into_boxed_slice();
        }
    }
}

impl<R: std::io::Read> BufferedSource<AllowStdIo<R>> {
    ///
    /// Returns a new `BufferedSource` reading from a blocking [`std::io::Read`] source.
    ///
    pub fn from_read(source: R) -> Self {
        BufferedSource::new(AllowStdIo::new(source))
    }
}

impl<R: AsyncRead + Unpin> ByteSource for BufferedSource<R> {
    fn buffered(&self) -> &[u8] {
        &self.buffer[self.internal_buffer_position..self.buffered_byte_length]
    }

    fn position(&self) -> u64 {
        self.position
    }

    async fn ensure(&mut self, len: usize) -> Result<bool, CursorError> {
        while self.available() < len {
            if self.reached_eof {
                return Ok(false);
            }
            if self.internal_buffer_position > 0 && self.internal_buffer_position + len > self.buffer.len() {
                self.compact();
            }
            // Grows only when full of received data, at most doubling.
            if self.buffered_byte_length == self.buffer.len() {
                self.ensure_capacity(len.min(self.buffer.len().saturating_mul(2)));
            }
            self.private_read().await?;
        }
        Ok(true)
    }

    fn consume(&mut self, len: usize) {
        let len = len.min(self.available());
        self.internal_buffer_position += len;
        self.position += len as u64;
        if self.internal_buffer_position == self.buffered_byte_length {
            self.internal_buffer_position = 0;
            self.buffered_byte_length = 0;
        }
    }

    async fn skip(&mut self, len: u64) -> Result<u64, CursorError> {
        let mut remaining = len;
        loop {
            let step = remaining.min(self.available() as u64);
            self.consume(step as usize);
            remaining -= step;
            if remaining == 0 || self.reached_eof {
                break;
            }
            // The window is empty here, so the read refills it from the start.
            self.private_read().await?;
        }
        Ok(len - remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Hands out at most one byte per read.
    struct Trickle(Vec<u8>, usize);

    impl AsyncRead for Trickle {
        fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
            if self.1 >= self.0.len() || buf.is_empty() {
                return Poll::Ready(Ok(0));
            }
            buf[0] = self.0[self.1];
            self.1 += 1;
            Poll::Ready(Ok(1))
        }
    }

    #[test]
    fn ensure_reports_end_of_data() {
        let mut source = BufferedSource::new(Cursor::new(vec![1, 2, 3]));
        assert!(block_on(source.ensure(3)).unwrap());
        assert_eq!(&[1, 2, 3], source.buffered());
        assert!(!block_on(source.ensure(4)).unwrap());
        assert_eq!(3, source.buffered().len());
    }

    #[test]
    fn ensure_gathers_across_reads() {
        let mut source = BufferedSource::new(Trickle((0..10).collect(), 0));
        assert!(block_on(source.ensure(8)).unwrap());
        assert_eq!(&[0, 1, 2, 3, 4, 5, 6, 7], &source.buffered()[..8]);
        source.consume(8);
        assert_eq!(8, source.position());
        assert!(block_on(source.ensure(2)).unwrap());
        assert_eq!(&[8, 9], source.buffered());
    }

    #[test]
    fn ensure_grows_for_large_values() {
        let mut source = BufferedSource::with_capacity(Cursor::new(vec![7u8; 100]), 16);
        assert!(block_on(source.ensure(100)).unwrap());
        assert_eq!(100, source.capacity());
    }

    #[test]
    fn growth_follows_received_data() {
        let mut source = BufferedSource::with_capacity(Trickle(vec![1u8; 40], 0), 16);
        assert!(!block_on(source.ensure(1 << 49)).unwrap());
        assert_eq!(40, source.buffered().len());
        assert_eq!(64, source.capacity());
    }

    #[test]
    fn skip_never_grows_buffer() {
        let mut source = BufferedSource::with_capacity(Cursor::new(vec![0u8; 10_000]), 16);
        assert!(block_on(source.ensure(4)).unwrap());
        assert_eq!(9_990, block_on(source.skip(9_990)).unwrap());
        assert_eq!(16, source.capacity());
        assert_eq!(9_990, source.position());
        assert!(block_on(source.ensure(10)).unwrap());
        assert!(!block_on(source.ensure(11)).unwrap());
    }

    #[test]
    fn skip_stops_at_end_of_data() {
        let mut source = BufferedSource::with_capacity(Cursor::new(vec![0u8; 40]), 16);
        assert_eq!(40, block_on(source.skip(100)).unwrap());
        assert_eq!(40, source.position());
    }
}
