//! Formatted output.
//!
//! The scanner lives in [`printf`]; the per-conversion renderers are split
//! across [`render`] (integers), [`float`] (fixed notation) and [`color`]
//! (`%q` escapes). [`args`] and [`sink`] are the two collaborator seams.

pub mod args;
pub mod color;
pub mod float;
pub mod printf;
pub mod render;
pub mod sink;

pub use args::{Arg, ArgCursor, ArgList};
pub use color::{Color, ColorPolicy};
pub use printf::{
    ArgClass, Conversion, FormatSegment, RenderOptions, Segments, conversions, count_conversions,
    format, format_with, formatted_write, parse_format_string,
};
pub use sink::{CountingSink, Sink, SliceSink, TruncatingSink};

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
pub use sink::FdSink;
