//! Runtime configuration for the C entry points.
//!
//! Read from the environment on first use and cached for the life of the
//! process:
//! - `QPRINTF_COLOR`: `always` (default), `never` or `auto`. Controls whether
//!   `%q` writes escape sequences. `auto` emits only when the destination is
//!   a terminal; buffers are never terminals.
//! - `QPRINTF_TRACE`: `1` writes one diagnostic line to stderr per failed call.

use std::sync::OnceLock;

use qprintf_core::{ColorPolicy, RenderOptions};

/// How `%q` behaves, before the destination is known.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    #[default]
    Always,
    Never,
    Auto,
}

impl ColorMode {
    /// Parse from string (case-insensitive). Unknown values mean `Always`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" | "off" | "none" | "0" | "false" => Self::Never,
            "auto" | "tty" => Self::Auto,
            _ => Self::Always,
        }
    }

    /// Resolve against a destination. `fd` is `None` for memory buffers.
    #[must_use]
    pub fn policy_for(self, fd: Option<i32>) -> ColorPolicy {
        match self {
            Self::Always => ColorPolicy::Always,
            Self::Never => ColorPolicy::Never,
            Self::Auto => match fd {
                Some(fd) if fd_is_terminal(fd) => ColorPolicy::Always,
                _ => ColorPolicy::Never,
            },
        }
    }
}

/// Process-wide settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AbiConfig {
    pub color: ColorMode,
    pub trace: bool,
}

impl AbiConfig {
    /// Build from a variable lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            color: lookup("QPRINTF_COLOR")
                .map(|v| ColorMode::from_str_loose(&v))
                .unwrap_or_default(),
            trace: lookup("QPRINTF_TRACE").is_some_and(|v| parse_flag(&v)),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Render options for output going to `fd` (`None` for a buffer).
    #[must_use]
    pub fn render_options(&self, fd: Option<i32>) -> RenderOptions {
        RenderOptions::new().with_color(self.color.policy_for(fd))
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

static GLOBAL_CONFIG: OnceLock<AbiConfig> = OnceLock::new();

/// Get the configuration (reads env vars on first call, caches thereafter).
pub fn config() -> &'static AbiConfig {
    GLOBAL_CONFIG.get_or_init(AbiConfig::from_env)
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
))]
fn fd_is_terminal(fd: i32) -> bool {
    qprintf_core::syscall::sys_isatty(fd)
}

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
fn fd_is_terminal(fd: i32) -> bool {
    // SAFETY: isatty accepts any descriptor value.
    unsafe { libc::isatty(fd) == 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_modes() {
        assert_eq!(ColorMode::from_str_loose("always"), ColorMode::Always);
        assert_eq!(ColorMode::from_str_loose("NEVER"), ColorMode::Never);
        assert_eq!(ColorMode::from_str_loose("off"), ColorMode::Never);
        assert_eq!(ColorMode::from_str_loose(" auto "), ColorMode::Auto);
        assert_eq!(ColorMode::from_str_loose("bogus"), ColorMode::Always);
    }

    #[test]
    fn default_is_always_without_trace() {
        let cfg = AbiConfig::from_lookup(|_| None);
        assert_eq!(cfg, AbiConfig::default());
        assert_eq!(cfg.color, ColorMode::Always);
        assert!(!cfg.trace);
    }

    #[test]
    fn lookup_drives_both_knobs() {
        let cfg = AbiConfig::from_lookup(|key| match key {
            "QPRINTF_COLOR" => Some("never".to_string()),
            "QPRINTF_TRACE" => Some("1".to_string()),
            _ => None,
        });
        assert_eq!(cfg.color, ColorMode::Never);
        assert!(cfg.trace);
        assert_eq!(cfg.render_options(Some(1)).color, ColorPolicy::Never);
    }

    #[test]
    fn trace_flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn auto_never_colors_buffers() {
        assert_eq!(ColorMode::Auto.policy_for(None), ColorPolicy::Never);
        assert_eq!(ColorMode::Always.policy_for(None), ColorPolicy::Always);
        // A bad descriptor is not a terminal.
        assert_eq!(ColorMode::Auto.policy_for(Some(-1)), ColorPolicy::Never);
    }

    #[test]
    fn cached_config_is_stable() {
        assert!(std::ptr::eq(config(), config()));
    }
}
