//! Merging CLI flags, config file values and built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use profile_finder_core::report::DEFAULT_OUTPUT_DIR;
use profile_finder_core::{FetchConfig, OutputFormat, RetryPolicy, ScanOptions, SearchFallback};

use crate::app_config::FileConfig;
use crate::cli::Cli;

const DEFAULT_THROTTLE_MIN_MS: u64 = 1000;
const DEFAULT_THROTTLE_MAX_MS: u64 = 2500;

/// Which options were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) concurrency: bool,
    pub(crate) max_retries: bool,
    pub(crate) format: bool,
    pub(crate) timeout: bool,
    pub(crate) no_fallback: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Cli, CliValueSources) {
    let command = Cli::command();
    let matches = command.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let sources = CliValueSources {
        concurrency: is_commandline_value(&matches, "concurrency"),
        max_retries: is_commandline_value(&matches, "max_retries"),
        format: is_commandline_value(&matches, "format"),
        timeout: is_commandline_value(&matches, "timeout"),
        no_fallback: is_commandline_value(&matches, "no_fallback"),
    };
    (cli, sources)
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Effective settings for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSettings {
    pub(crate) output_dir: PathBuf,
    pub(crate) format: OutputFormat,
    pub(crate) concurrency: usize,
    pub(crate) max_retries: u32,
    pub(crate) request_timeout: Duration,
    pub(crate) search_fallback: bool,
    pub(crate) throttle_min: Duration,
    pub(crate) throttle_max: Duration,
}

impl RunSettings {
    /// Command line wins over the config file, which wins over defaults.
    pub(crate) fn resolve(
        cli: &Cli,
        sources: &CliValueSources,
        file_config: Option<&FileConfig>,
    ) -> Result<Self> {
        let file = file_config.cloned().unwrap_or_default();

        let output_dir = cli
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let format = match file.output_format {
            Some(format) if !sources.format => format,
            _ => cli.format,
        };
        let concurrency = match file.concurrency {
            Some(concurrency) if !sources.concurrency => concurrency,
            _ => cli.concurrency,
        };
        let max_retries = match file.max_retries {
            Some(max_retries) if !sources.max_retries => max_retries,
            _ => cli.max_retries,
        };
        let timeout_secs = match file.request_timeout_secs {
            Some(timeout) if !sources.timeout => timeout,
            _ => cli.timeout,
        };
        let search_fallback = match file.search_fallback {
            Some(enabled) if !sources.no_fallback => enabled,
            _ => !cli.no_fallback,
        };

        let throttle_min_ms = file.throttle_min_ms.unwrap_or_else(|| {
            DEFAULT_THROTTLE_MIN_MS.min(file.throttle_max_ms.unwrap_or(u64::MAX))
        });
        let throttle_max_ms = file
            .throttle_max_ms
            .unwrap_or(DEFAULT_THROTTLE_MAX_MS.max(throttle_min_ms));
        if throttle_min_ms > throttle_max_ms {
            bail!(
                "Invalid throttle range: {throttle_min_ms}ms is greater than {throttle_max_ms}ms"
            );
        }

        Ok(Self {
            output_dir,
            format,
            concurrency: usize::from(concurrency),
            max_retries: u32::from(max_retries),
            request_timeout: Duration::from_secs(timeout_secs),
            search_fallback,
            throttle_min: Duration::from_millis(throttle_min_ms),
            throttle_max: Duration::from_millis(throttle_max_ms),
        })
    }

    pub(crate) fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            retry_policy: RetryPolicy::with_max_attempts(self.max_retries),
            request_timeout: self.request_timeout,
            search_fallback: self.search_fallback.then(SearchFallback::default),
        }
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            throttle_min: self.throttle_min,
            throttle_max: self.throttle_max,
            ..ScanOptions::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["profile-finder"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_config() {
        let settings =
            RunSettings::resolve(&cli(&[]), &CliValueSources::default(), None).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.concurrency, 6);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert!(settings.search_fallback);
        assert_eq!(settings.throttle_min, Duration::from_millis(1000));
        assert_eq!(settings.throttle_max, Duration::from_millis(2500));
    }

    #[test]
    fn test_config_overrides_defaults() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("/tmp/r")),
            output_format: Some(OutputFormat::Csv),
            concurrency: Some(9),
            search_fallback: Some(false),
            throttle_min_ms: Some(0),
            throttle_max_ms: Some(0),
            ..FileConfig::default()
        };
        let settings =
            RunSettings::resolve(&cli(&[]), &CliValueSources::default(), Some(&file)).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/r"));
        assert_eq!(settings.format, OutputFormat::Csv);
        assert_eq!(settings.concurrency, 9);
        assert!(!settings.search_fallback);
        assert_eq!(settings.throttle_max, Duration::ZERO);
    }

    #[test]
    fn test_command_line_overrides_config() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("/tmp/r")),
            concurrency: Some(9),
            output_format: Some(OutputFormat::Csv),
            ..FileConfig::default()
        };
        let sources = CliValueSources {
            concurrency: true,
            format: true,
            ..CliValueSources::default()
        };
        let settings = RunSettings::resolve(
            &cli(&["-c", "2", "-f", "json", "-o", "mine"]),
            &sources,
            Some(&file),
        )
        .unwrap();
        assert_eq!(settings.concurrency, 2);
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.output_dir, PathBuf::from("mine"));
    }

    #[test]
    fn test_min_only_throttle_raises_default_max() {
        let file = FileConfig {
            throttle_min_ms: Some(4000),
            ..FileConfig::default()
        };
        let settings =
            RunSettings::resolve(&cli(&[]), &CliValueSources::default(), Some(&file)).unwrap();
        assert_eq!(settings.throttle_max, Duration::from_millis(4000));
    }

    #[test]
    fn test_fetch_config_follows_settings() {
        let settings = RunSettings::resolve(
            &cli(&["--no-fallback", "-r", "5", "--timeout", "7"]),
            &CliValueSources {
                no_fallback: true,
                ..CliValueSources::default()
            },
            None,
        )
        .unwrap();
        let config = settings.fetch_config();
        assert!(config.search_fallback.is_none());
        assert_eq!(config.retry_policy.max_attempts(), 5);
        assert_eq!(config.request_timeout, Duration::from_secs(7));
    }
}
