//! Configuration loading and parsing.
//!
//! Parses `quill.toml` (or an override path provided by the binary). Only
//! the `[input]` table exists today: the worker poll interval and the
//! quit-forwarding policy. Unknown fields are ignored so the file format
//! can evolve without breaking older binaries.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use std::fs;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputSection {
    /// Worker idle sleep between channel polls, in milliseconds.
    #[serde(default = "InputSection::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Deliver the quit gesture to the editor before stopping. Off by
    /// default: the gesture never leaves the input boundary.
    #[serde(default)]
    pub forward_quit: bool,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::default_poll_interval_ms(),
            forward_quit: false,
        }
    }
}

impl InputSection {
    const fn default_poll_interval_ms() -> u64 {
        5
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.file.input.poll_interval_ms)
    }

    pub fn forward_quit(&self) -> bool {
        self.file.input.forward_quit
    }
}

/// Best-effort config path: prefer `quill.toml` in the working directory,
/// then the platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("quill.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("quill").join("quill.toml");
    }
    PathBuf::from("quill.toml")
}

/// Load configuration. An explicitly supplied path must exist and parse; a
/// discovered file is tolerant (missing or malformed falls back to
/// defaults so a stray file never blocks startup).
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let file: ConfigFile = toml::from_str(&content)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config { file })
        }
        None => {
            let path = discover();
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                    Ok(file) => {
                        info!(target: "config", path = %path.display(), "config_loaded");
                        Ok(Config { file })
                    }
                    Err(err) => {
                        warn!(target: "config", path = %path.display(), error = %err, "config_parse_failed_using_defaults");
                        Ok(Config::default())
                    }
                },
                Err(_) => Ok(Config::default()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_nothing_is_configured() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(5));
        assert!(!config.forward_quit());
    }

    #[test]
    fn parses_the_input_table() {
        let file: ConfigFile = toml::from_str(
            "[input]\npoll_interval_ms = 20\nforward_quit = true\n",
        )
        .expect("valid toml");
        let config = Config { file };
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert!(config.forward_quit());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let file: ConfigFile =
            toml::from_str("[input]\npoll_interval_ms = 7\n[future]\nknob = 1\n")
                .expect("valid toml");
        assert_eq!(file.input.poll_interval_ms, 7);
    }

    #[test]
    fn explicit_path_loads_the_file() {
        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(tmp, "[input]\npoll_interval_ms = 9").expect("write config");
        let config = load_from(Some(tmp.path().to_path_buf())).expect("load succeeds");
        assert_eq!(config.poll_interval(), Duration::from_millis(9));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = load_from(Some(PathBuf::from("/nonexistent/quill.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn explicit_malformed_file_is_an_error() {
        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(tmp, "not toml at all [").expect("write config");
        assert!(load_from(Some(tmp.path().to_path_buf())).is_err());
    }
}
