//! Runtime configuration from the environment and command line.

use std::env;
use std::path::PathBuf;

use journey_core::storage::DEFAULT_QUOTA_BYTES;

/// Default storage file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "journey-stories.json";
/// Default log file name, placed next to the storage file.
pub const DEFAULT_LOG_FILE: &str = "journey.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    /// Byte limit for the storage file; `None` is unlimited.
    pub storage_quota: Option<usize>,
    pub headless: bool,
    /// Keep stories in memory only.
    pub ephemeral: bool,
    pub show_help: bool,
}

impl AppConfig {
    /// Build the configuration from environment variables, then let
    /// command line flags override them.
    pub fn load(args: &[String]) -> Result<Self, String> {
        let data_file = env::var("JOURNEY_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE));
        let storage_quota = match env::var("JOURNEY_STORAGE_QUOTA") {
            Ok(raw) => parse_quota(&raw)?,
            Err(_) => Some(DEFAULT_QUOTA_BYTES),
        };
        let log_file = env::var("JOURNEY_LOG_FILE").ok().map(PathBuf::from);

        let mut config = Self {
            data_file,
            log_file: PathBuf::new(),
            storage_quota,
            headless: false,
            ephemeral: false,
            show_help: false,
        };
        config.apply_args(args)?;

        config.log_file = log_file.unwrap_or_else(|| default_log_file(&config.data_file));
        Ok(config)
    }

    fn apply_args(&mut self, args: &[String]) -> Result<(), String> {
        // Skip the program name
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => self.show_help = true,
                "--headless" => self.headless = true,
                "--ephemeral" => self.ephemeral = true,
                "--data" => {
                    let path = args
                        .get(i + 1)
                        .ok_or_else(|| "--data requires a path".to_string())?;
                    self.data_file = PathBuf::from(path);
                    i += 1;
                }
                other => return Err(format!("Unknown argument: {other}")),
            }
            i += 1;
        }
        Ok(())
    }
}

/// Parse a quota in bytes; `0` disables the limit.
fn parse_quota(raw: &str) -> Result<Option<usize>, String> {
    let bytes: usize = raw
        .trim()
        .parse()
        .map_err(|e| format!("Invalid JOURNEY_STORAGE_QUOTA value {raw:?}: {e}"))?;
    Ok((bytes > 0).then_some(bytes))
}

fn default_log_file(data_file: &std::path::Path) -> PathBuf {
    match data_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(DEFAULT_LOG_FILE),
        _ => PathBuf::from(DEFAULT_LOG_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("journey")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn base() -> AppConfig {
        AppConfig {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            storage_quota: Some(DEFAULT_QUOTA_BYTES),
            headless: false,
            ephemeral: false,
            show_help: false,
        }
    }

    #[test]
    fn test_flags() {
        let mut config = base();
        config
            .apply_args(&args(&["--headless", "--data", "/tmp/wall.json", "--ephemeral"]))
            .unwrap();
        assert!(config.headless);
        assert!(config.ephemeral);
        assert_eq!(config.data_file, PathBuf::from("/tmp/wall.json"));
    }

    #[test]
    fn test_bad_flags() {
        assert!(base().apply_args(&args(&["--data"])).is_err());
        assert!(base().apply_args(&args(&["--wat"])).is_err());
    }

    #[test]
    fn test_parse_quota() {
        assert_eq!(parse_quota("1024"), Ok(Some(1024)));
        assert_eq!(parse_quota("0"), Ok(None));
        assert!(parse_quota("lots").is_err());
    }

    #[test]
    fn test_log_file_follows_data_dir() {
        assert_eq!(
            default_log_file(std::path::Path::new("/var/lib/journey/stories.json")),
            PathBuf::from("/var/lib/journey/journey.log")
        );
        assert_eq!(
            default_log_file(std::path::Path::new("stories.json")),
            PathBuf::from(DEFAULT_LOG_FILE)
        );
    }
}
