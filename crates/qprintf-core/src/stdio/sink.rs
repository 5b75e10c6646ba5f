//! Output sinks.
//!
//! The engine hands rendered bytes to a [`Sink`] as soon as each segment is
//! ready; it never buffers a whole call. Bytes accepted before a failure stay
//! written.

use crate::error::FormatError;

/// Destination for rendered output.
pub trait Sink {
    /// Accept all of `bytes` or fail.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        (**self).write_bytes(bytes)
    }
}

#[cfg(feature = "alloc")]
impl Sink for alloc::vec::Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Writes into a caller-provided slice and fails once it is full.
///
/// A chunk that does not fit is rejected whole; the slice keeps what was
/// accepted before it.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    #[must_use]
    pub fn written(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Sink for SliceSink<'_> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        let end = self
            .len
            .checked_add(bytes.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or(FormatError::SinkFull)?;
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}

/// `snprintf` semantics: keep what fits, count everything.
///
/// One byte of the slice is reserved for the terminating NUL written by
/// [`TruncatingSink::terminate`]. An empty slice stores nothing at all.
#[derive(Debug)]
pub struct TruncatingSink<'a> {
    buf: &'a mut [u8],
    stored: usize,
    total: usize,
}

impl<'a> TruncatingSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            stored: 0,
            total: 0,
        }
    }

    /// Bytes offered so far, stored or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Bytes actually kept in the slice.
    #[must_use]
    pub fn stored(&self) -> usize {
        self.stored
    }

    #[must_use]
    pub fn truncated(&self) -> bool {
        self.total > self.stored
    }

    /// NUL-terminate the stored prefix, if the slice has any room.
    pub fn terminate(&mut self) {
        if let Some(slot) = self.buf.get_mut(self.stored) {
            *slot = 0;
        }
    }

    fn capacity(&self) -> usize {
        self.buf.len().saturating_sub(1)
    }
}

impl Sink for TruncatingSink<'_> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        let room = self.capacity() - self.stored;
        let take = room.min(bytes.len());
        self.buf[self.stored..self.stored + take].copy_from_slice(&bytes[..take]);
        self.stored += take;
        self.total = self.total.saturating_add(bytes.len());
        Ok(())
    }
}

/// Discards output, counting bytes. Used to size a buffer before rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingSink {
    count: usize,
}

impl CountingSink {
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

impl Sink for CountingSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.count = self.count.saturating_add(bytes.len());
        Ok(())
    }
}

/// Raw file descriptor, written through the `write` syscall.
///
/// Short writes are resumed and `EINTR` is retried; any other errno fails the
/// call with [`FormatError::Sink`].
#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdSink {
    fd: i32,
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
impl FdSink {
    pub const STDOUT: Self = Self { fd: 1 };
    pub const STDERR: Self = Self { fd: 2 };

    #[must_use]
    pub const fn new(fd: i32) -> Self {
        Self { fd }
    }

    #[must_use]
    pub const fn fd(&self) -> i32 {
        self.fd
    }
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
impl Sink for FdSink {
    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<(), FormatError> {
        use crate::syscall::{EINTR, EIO, sys_write};

        while !bytes.is_empty() {
            match sys_write(self.fd, bytes) {
                // A zero-length write on a non-empty buffer would spin forever.
                Ok(0) => return Err(FormatError::Sink(EIO)),
                Ok(n) => bytes = &bytes[n.min(bytes.len())..],
                Err(EINTR) => continue,
                Err(errno) => return Err(FormatError::Sink(errno)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_sink_rejects_overflowing_chunk() {
        let mut buf = [0u8; 6];
        let mut sink = SliceSink::new(&mut buf);
        sink.write_bytes(b"love").unwrap();
        assert_eq!(sink.write_bytes(b"!!!"), Err(FormatError::SinkFull));
        assert_eq!(sink.as_bytes(), b"love");
        sink.write_bytes(b"!!").unwrap();
        assert_eq!(sink.written(), 6);
    }

    #[test]
    fn truncating_sink_counts_past_capacity() {
        let mut buf = [0xffu8; 5];
        let mut sink = TruncatingSink::new(&mut buf);
        sink.write_bytes(b"hello").unwrap();
        sink.write_bytes(b" world").unwrap();
        assert_eq!(sink.total(), 11);
        assert_eq!(sink.stored(), 4);
        assert!(sink.truncated());
        sink.terminate();
        assert_eq!(&buf, b"hell\0");
    }

    #[test]
    fn truncating_sink_with_empty_slice() {
        let mut buf = [0u8; 0];
        let mut sink = TruncatingSink::new(&mut buf);
        sink.write_bytes(b"abc").unwrap();
        sink.terminate();
        assert_eq!(sink.total(), 3);
        assert_eq!(sink.stored(), 0);
    }

    #[test]
    fn truncating_sink_exact_fit() {
        let mut buf = [0xffu8; 4];
        let mut sink = TruncatingSink::new(&mut buf);
        sink.write_bytes(b"abc").unwrap();
        assert!(!sink.truncated());
        sink.terminate();
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn counting_sink_counts() {
        let mut sink = CountingSink::new();
        sink.write_bytes(b"abc").unwrap();
        sink.write_bytes(b"").unwrap();
        sink.write_bytes(b"de").unwrap();
        assert_eq!(sink.count(), 5);
    }

    #[cfg(all(
        target_os = "linux",
        any(target_arch = "x86_64", target_arch = "aarch64")
    ))]
    #[test]
    fn fd_sink_writes_through_pipe() {
        use crate::syscall::{EBADF, sys_close, sys_pipe2, sys_read};

        let [rd, wr] = sys_pipe2(0).unwrap();
        let mut sink = FdSink::new(wr);
        sink.write_bytes(b"-1 love ").unwrap();
        sink.write_bytes(b"eda\n").unwrap();
        let mut buf = [0u8; 32];
        let n = sys_read(rd, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"-1 love eda\n");
        sys_close(rd).unwrap();
        sys_close(wr).unwrap();

        assert_eq!(
            FdSink::new(-1).write_bytes(b"x"),
            Err(FormatError::Sink(EBADF))
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn vec_sink_appends() {
        let mut out = alloc::vec::Vec::new();
        out.write_bytes(b"ab").unwrap();
        (&mut out).write_bytes(b"cd").unwrap();
        assert_eq!(out, b"abcd");
    }
}
