//! Optional config file with defaults for the CLI.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use profile_finder_core::OutputFormat;

/// Values read from `config.toml`; every key is optional.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Folder reports are written to.
    pub output_dir: Option<PathBuf>,
    /// Report format for scans.
    pub output_format: Option<OutputFormat>,
    /// Scan concurrency (1..=100).
    pub concurrency: Option<u8>,
    /// Attempts per URL (1..=10).
    pub max_retries: Option<u8>,
    /// Per-request timeout in seconds (1..=300).
    pub request_timeout_secs: Option<u64>,
    /// Whether blocked pages fall back to a web search.
    pub search_fallback: Option<bool>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Lower bound of the pause between consumed results, in milliseconds.
    pub throttle_min_ms: Option<u64>,
    /// Upper bound of the pause between consumed results, in milliseconds.
    pub throttle_max_ms: Option<u64>,
}

impl FileConfig {
    /// Validates config values against the CLI ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(1..=100).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=100");
        }
        if let Some(max_retries) = self.max_retries
            && !(1..=10).contains(&max_retries)
        {
            bail!("Invalid config value for `max_retries`: {max_retries}. Expected range: 1..=10");
        }
        if let Some(timeout) = self.request_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            bail!(
                "Invalid config value for `request_timeout_secs`: {timeout}. Expected range: 1..=300"
            );
        }
        validate_throttle_ms("throttle_min_ms", self.throttle_min_ms)?;
        validate_throttle_ms("throttle_max_ms", self.throttle_max_ms)?;
        if let (Some(min), Some(max)) = (self.throttle_min_ms, self.throttle_max_ms)
            && min > max
        {
            bail!("Invalid config: `throttle_min_ms` ({min}) is greater than `throttle_max_ms` ({max})");
        }
        Ok(())
    }
}

fn validate_throttle_ms(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if value > 60_000 {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 0..=60000");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/profile-finder/config.toml`
/// 2. `$HOME/.config/profile-finder/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("profile-finder")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("profile-finder")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "output_format" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.output_format = Some(parsed.parse().with_context(invalid)?);
            }
            "concurrency" => {
                cfg.concurrency = Some(parse_integer_u8(value).with_context(invalid)?);
            }
            "max_retries" => {
                cfg.max_retries = Some(parse_integer_u8(value).with_context(invalid)?);
            }
            "request_timeout_secs" => {
                cfg.request_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "search_fallback" => {
                cfg.search_fallback = Some(parse_boolean(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            "throttle_min_ms" => {
                cfg.throttle_min_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "throttle_max_ms" => {
                cfg.throttle_max_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<u16>()?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
# profile-finder defaults
output_dir = "/tmp/reports"
output_format = "csv"
concurrency = 12
max_retries = 5 # inline comment
request_timeout_secs = 20
search_fallback = false
verbosity = "quiet"
throttle_min_ms = 0
throttle_max_ms = 500
"#,
        )
        .unwrap();

        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/reports")));
        assert_eq!(cfg.output_format, Some(OutputFormat::Csv));
        assert_eq!(cfg.concurrency, Some(12));
        assert_eq!(cfg.max_retries, Some(5));
        assert_eq!(cfg.request_timeout_secs, Some(20));
        assert_eq!(cfg.search_fallback, Some(false));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
        assert_eq!(cfg.throttle_min_ms, Some(0));
        assert_eq!(cfg.throttle_max_ms, Some(500));
    }

    #[test]
    fn test_parse_config_empty_is_default() {
        let cfg = parse_config_str("\n# nothing here\n").unwrap();
        assert!(cfg.concurrency.is_none());
        assert!(cfg.output_format.is_none());
    }

    #[test]
    fn test_parse_config_rejects_unknown_key() {
        let err = parse_config_str("threads = 4").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_concurrency() {
        let err = parse_config_str("concurrency = 0").unwrap_err();
        assert!(err.to_string().contains("concurrency"));
        assert!(parse_config_str("concurrency = 101").is_err());
    }

    #[test]
    fn test_parse_config_rejects_bad_format() {
        assert!(parse_config_str("output_format = \"xml\"").is_err());
        assert!(parse_config_str("output_format = json").is_err());
    }

    #[test]
    fn test_parse_config_rejects_inverted_throttle() {
        let err = parse_config_str("throttle_min_ms = 900\nthrottle_max_ms = 100").unwrap_err();
        assert!(err.to_string().contains("throttle_min_ms"));
    }

    #[test]
    fn test_parse_config_missing_equals() {
        let err = parse_config_str("concurrency 4").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let cfg = parse_config_str(r#"output_dir = "out#1""#).unwrap();
        assert_eq!(cfg.output_dir, Some(PathBuf::from("out#1")));
    }
}
