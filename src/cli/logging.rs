// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console logging for the CLI and library.
//!
//! The HTTP service logs through `tracing` instead and silences these.

use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable that disables verbose output when set to `0` or `false`.
pub const VERBOSE_ENV: &str = "SIGNSPEAK_VERBOSE";

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Apply [`VERBOSE_ENV`] if it is set.
pub fn init_from_env() {
    if let Ok(value) = std::env::var(VERBOSE_ENV) {
        set_verbose(parse_flag(&value));
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        println!("{}", format!($($arg)*));
    }}
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }}
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {{
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }}
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_toggle() {
        // Default is true
        set_verbose(true);
        assert!(is_verbose());

        set_verbose(false);
        assert!(!is_verbose());

        set_verbose(true);
        assert!(is_verbose());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(" False "));
    }

    #[test]
    fn test_macros_in_expression_position() {
        let outcome: Result<(), &str> = Err("disk full");
        match outcome {
            Ok(()) => crate::info!("saved"),
            Err(e) => crate::error!("Failed to save: {e}"),
        }
        let (): () = if outcome.is_err() { crate::warn!("retrying") } else { crate::verbose!("ok") };
        assert!(outcome.is_err());
    }
}
