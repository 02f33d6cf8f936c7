//! Terminal capabilities and tracing setup.

use crate::app_config::VerbositySetting;

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_use_progress_bar(
    stderr_is_terminal: bool,
    quiet: bool,
    dumb_terminal: bool,
) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Log level and whether it beats `RUST_LOG`.
///
/// Priority: explicit `-v`/`-q` flag > `RUST_LOG` > config verbosity > `info`.
pub(crate) fn resolve_log_level(
    verbose: u8,
    quiet: bool,
    config_verbosity: Option<VerbositySetting>,
) -> (&'static str, bool) {
    if quiet {
        return ("error", true);
    }
    match verbose {
        0 => {}
        1 => return ("debug", true),
        _ => return ("trace", true),
    }
    let level = match config_verbosity {
        Some(VerbositySetting::Quiet) => "error",
        Some(VerbositySetting::Verbose | VerbositySetting::Debug) => "debug",
        Some(VerbositySetting::Default) | None => "info",
    };
    (level, false)
}

pub(crate) fn init_tracing(default_level: &str, force_cli_level: bool, no_color: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_only_on_interactive_stderr() {
        assert!(should_use_progress_bar(true, false, false));
        assert!(!should_use_progress_bar(false, false, false));
        assert!(!should_use_progress_bar(true, true, false));
        assert!(!should_use_progress_bar(true, false, true));
    }

    #[test]
    fn test_cli_flags_force_level() {
        assert_eq!(resolve_log_level(0, true, None), ("error", true));
        assert_eq!(resolve_log_level(1, false, None), ("debug", true));
        assert_eq!(resolve_log_level(3, false, None), ("trace", true));
    }

    #[test]
    fn test_config_verbosity_is_overridable_default() {
        assert_eq!(
            resolve_log_level(0, false, Some(VerbositySetting::Quiet)),
            ("error", false)
        );
        assert_eq!(
            resolve_log_level(0, false, Some(VerbositySetting::Debug)),
            ("debug", false)
        );
        assert_eq!(resolve_log_level(0, false, None), ("info", false));
    }
}
