//! Descriptor output for the stdout/stderr entry points.

use parking_lot::Mutex;
use qprintf_core::Sink;

pub const STDOUT_FD: i32 = 1;
pub const STDERR_FD: i32 = 2;

/// Held for the whole of one stdout call so concurrent calls never
/// interleave their bytes.
pub static STDOUT_LOCK: Mutex<()> = parking_lot::const_mutex(());

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
pub type FdOut = qprintf_core::stdio::FdSink;

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
pub fn fd_out(fd: i32) -> FdOut {
    FdOut::new(fd)
}

/// `write(2)` through the host libc where there is no raw syscall path.
#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
#[derive(Debug, Clone, Copy)]
pub struct FdOut {
    fd: i32,
}

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
pub fn fd_out(fd: i32) -> FdOut {
    FdOut { fd }
}

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
impl Sink for FdOut {
    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<(), qprintf_core::FormatError> {
        use qprintf_core::FormatError;

        while !bytes.is_empty() {
            // SAFETY: bytes is valid for reads of bytes.len().
            let n = unsafe { libc::write(self.fd, bytes.as_ptr().cast(), bytes.len()) };
            if n < 0 {
                let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO);
                if errno == libc::EINTR {
                    continue;
                }
                return Err(FormatError::Sink(errno));
            }
            if n == 0 {
                return Err(FormatError::Sink(libc::EIO));
            }
            bytes = &bytes[(n as usize).min(bytes.len())..];
        }
        Ok(())
    }
}

/// Write `bytes` to `fd`, ignoring failure. Used for diagnostics only.
pub fn write_best_effort(fd: i32, bytes: &[u8]) {
    let _ = fd_out(fd).write_bytes(bytes);
}
