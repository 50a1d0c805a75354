//! # Output Configuration
//!
//! This module controls how errors are rendered on stderr. Error lines carry
//! an `ERROR:` prefix, styled red when the terminal supports color and the
//! user has not opted out.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cpzip::output::OutputConfig;
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! config.report_error("Entry outer.zip/a/ not found. Check target path.");
//! ```

use std::env;
use std::fmt::Display;

use console::style;

/// Plain prefix for error lines.
pub const ERROR_PREFIX: &str = "ERROR:";

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stderr is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stderr().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Render an error line, including the prefix.
    pub fn error_line(&self, message: impl Display) -> String {
        if self.use_color {
            format!("{} {}", style(ERROR_PREFIX).red().bold().force_styling(true), message)
        } else {
            format!("{} {}", ERROR_PREFIX, message)
        }
    }

    /// Write an error line to stderr.
    pub fn report_error(&self, message: impl Display) {
        eprintln!("{}", self.error_line(message));
    }
}
