#![cfg_attr(feature = "c-variadic", feature(c_variadic))]
//! # qprintf-abi
//!
//! extern "C" boundary for the qprintf engine. Builds `libqprintf.so` and
//! `libqprintf.a` exporting:
//!
//! - `my_printf(fmt, ...)` and `my_snprintf(buf, size, fmt, ...)`, with the
//!   `c-variadic` feature (nightly);
//! - `my_printf_slots` and `my_snprintf_slots`, which take arguments already
//!   packed into 64-bit slots and build on stable;
//! - the color codes `QPRINTF_RESET` .. `QPRINTF_LIGHT_BLUE` for `%q`.
//!
//! ```text
//! C caller -> entry point (this crate) -> slot cursor -> qprintf-core -> fd / buffer
//! ```
//!
//! All entry points return the number of bytes produced (color escapes
//! excluded) or `-1`.

pub mod config;
pub mod diagnostics;
pub mod output;
pub mod printf_abi;

pub use printf_abi::{MAX_VA_ARGS, SlotCursor, my_printf_slots, my_snprintf_slots};

#[cfg(feature = "c-variadic")]
pub use printf_abi::{my_printf, my_snprintf};
