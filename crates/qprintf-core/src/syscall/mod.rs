//! Linux syscall veneer for the output path.
//!
//! The engine only ever needs to write bytes to a descriptor and, for the
//! color policy, ask whether that descriptor is a terminal. Both go straight
//! to the kernel so the core crate stays free of libc.

mod raw;

// -------------------------------------------------------------------------
// Syscall numbers
// -------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
mod nr {
    pub const SYS_READ: usize = 0;
    pub const SYS_WRITE: usize = 1;
    pub const SYS_CLOSE: usize = 3;
    pub const SYS_IOCTL: usize = 16;
    pub const SYS_PIPE2: usize = 293;
}

#[cfg(target_arch = "aarch64")]
mod nr {
    pub const SYS_READ: usize = 63;
    pub const SYS_WRITE: usize = 64;
    pub const SYS_CLOSE: usize = 57;
    pub const SYS_IOCTL: usize = 29;
    pub const SYS_PIPE2: usize = 59;
}

pub use nr::*;

/// `ioctl` request that fills a `struct termios`; fails with `ENOTTY` on
/// anything that is not a terminal.
pub const TCGETS: usize = 0x5401;

pub const EINTR: i32 = 4;
pub const EIO: i32 = 5;
pub const EBADF: i32 = 9;
pub const ENOTTY: i32 = 25;

// -------------------------------------------------------------------------
// Error handling
// -------------------------------------------------------------------------

const MAX_ERRNO: usize = 4095;

/// Convert a raw syscall return value to `Result<usize, errno>`.
#[inline]
pub fn syscall_result(ret: usize) -> Result<usize, i32> {
    if ret > usize::MAX - MAX_ERRNO {
        Err(-(ret as isize) as i32)
    } else {
        Ok(ret)
    }
}

// -------------------------------------------------------------------------
// Typed wrappers
// -------------------------------------------------------------------------

/// `write(fd, bytes)`. Returns the number of bytes the kernel accepted.
#[inline]
pub fn sys_write(fd: i32, bytes: &[u8]) -> Result<usize, i32> {
    // SAFETY: the slice is valid for reads of its full length.
    let ret = unsafe { raw::syscall3(SYS_WRITE, fd as usize, bytes.as_ptr() as usize, bytes.len()) };
    syscall_result(ret)
}

/// `read(fd, buf)`.
#[inline]
pub fn sys_read(fd: i32, buf: &mut [u8]) -> Result<usize, i32> {
    // SAFETY: the slice is valid for writes of its full length.
    let ret = unsafe { raw::syscall3(SYS_READ, fd as usize, buf.as_mut_ptr() as usize, buf.len()) };
    syscall_result(ret)
}

/// `close(fd)`.
#[inline]
pub fn sys_close(fd: i32) -> Result<(), i32> {
    // SAFETY: close on any fd value is memory-safe; a bad fd is EBADF.
    let ret = unsafe { raw::syscall3(SYS_CLOSE, fd as usize, 0, 0) };
    syscall_result(ret).map(|_| ())
}

/// `pipe2(fds, flags)`. Returns `[read_end, write_end]`.
#[inline]
pub fn sys_pipe2(flags: i32) -> Result<[i32; 2], i32> {
    let mut fds = [0i32; 2];
    // SAFETY: fds is a writable [i32; 2], exactly what the kernel fills.
    let ret = unsafe { raw::syscall3(SYS_PIPE2, fds.as_mut_ptr() as usize, flags as usize, 0) };
    syscall_result(ret).map(|_| fds)
}

/// Whether `fd` refers to a terminal.
///
/// Any failure (bad descriptor, `ENOTTY`) answers `false`.
pub fn sys_isatty(fd: i32) -> bool {
    // Larger than any architecture's struct termios.
    let mut termios = [0u8; 64];
    // SAFETY: TCGETS writes at most sizeof(struct termios) bytes into termios.
    let ret = unsafe {
        raw::syscall3(
            SYS_IOCTL,
            fd as usize,
            TCGETS,
            termios.as_mut_ptr() as usize,
        )
    };
    syscall_result(ret).is_ok()
}

// -------------------------------------------------------------------------
// Unit tests
// -------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_range_maps_to_errno() {
        assert_eq!(syscall_result(0), Ok(0));
        assert_eq!(syscall_result(17), Ok(17));
        assert_eq!(syscall_result(usize::MAX), Err(1));
        assert_eq!(syscall_result((-(EBADF as isize)) as usize), Err(EBADF));
        assert_eq!(syscall_result(usize::MAX - 4095), Ok(usize::MAX - 4095));
    }

    #[test]
    fn empty_write_succeeds() {
        assert_eq!(sys_write(1, b""), Ok(0));
    }

    #[test]
    fn bad_fd_is_ebadf() {
        assert_eq!(sys_write(-1, b"x"), Err(EBADF));
        assert!(!sys_isatty(-1));
    }

    #[test]
    fn pipe_round_trip() {
        let [rd, wr] = sys_pipe2(0).unwrap();
        assert_eq!(sys_write(wr, b"hello veneer"), Ok(12));
        let mut buf = [0u8; 32];
        assert_eq!(sys_read(rd, &mut buf), Ok(12));
        assert_eq!(&buf[..12], b"hello veneer");
        assert!(!sys_isatty(rd), "a pipe is not a terminal");
        sys_close(rd).unwrap();
        sys_close(wr).unwrap();
    }
}
