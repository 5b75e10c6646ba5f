//! # qprintf-core
//!
//! Freestanding implementation of a small `printf` dialect.
//!
//! The engine scans a format string once, pulls one argument per conversion
//! from an [`ArgCursor`](stdio::ArgCursor) and streams the rendered bytes into
//! a [`Sink`](stdio::Sink). Nothing here allocates: digit generation happens in
//! fixed-size stack scratch buffers and overflow is reported, never written.
//!
//! Supported conversions: `%d %o %x %b %c %s %f %q %%`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod error;
pub mod stdio;
#[allow(unsafe_code)]
#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
pub mod syscall;

pub use error::{ErrorKind, FormatError};
pub use stdio::{
    Arg, ArgClass, ArgCursor, ArgList, Color, ColorPolicy, Conversion, FormatSegment, RenderOptions,
    Sink, count_conversions, format, format_with, formatted_write, parse_format_string,
};
