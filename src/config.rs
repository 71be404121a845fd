//! Startup configuration.
//!
//! The only inputs are an optional positional file path and the
//! `SENSORGRID_CHUNK_ROWS` environment variable.

use std::path::PathBuf;

use crate::loader::{LoadMode, DEFAULT_CHUNK_ROWS};

/// Environment variable selecting the batch size (`0` loads the whole file at once)
pub const CHUNK_ROWS_ENV: &str = "SENSORGRID_CHUNK_ROWS";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// File loaded as soon as the window opens
    pub startup_path: Option<PathBuf>,
    pub load_mode: LoadMode,
}

impl AppConfig {
    /// Read the process arguments and environment
    pub fn from_env() -> Self {
        Self::from_sources(std::env::args().skip(1), std::env::var(CHUNK_ROWS_ENV).ok())
    }

    pub fn from_sources(
        mut args: impl Iterator<Item = String>,
        chunk_rows: Option<String>,
    ) -> Self {
        let startup_path = args
            .next()
            .filter(|a| !a.trim().is_empty())
            .map(PathBuf::from);

        let load_mode = match chunk_rows.as_deref().map(str::trim) {
            None => LoadMode::default(),
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => LoadMode::WholeFile,
                Ok(rows) => LoadMode::Chunked { rows },
                Err(_) => {
                    tracing::warn!(
                        "Ignoring {}={:?}, using {} rows per batch",
                        CHUNK_ROWS_ENV,
                        raw,
                        DEFAULT_CHUNK_ROWS
                    );
                    LoadMode::default()
                }
            },
        };

        Self {
            startup_path,
            load_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_sources(args(&[]), None);
        assert_eq!(config.startup_path, None);
        assert_eq!(
            config.load_mode,
            LoadMode::Chunked {
                rows: DEFAULT_CHUNK_ROWS
            }
        );
    }

    #[test]
    fn test_startup_path_and_chunk_size() {
        let config = AppConfig::from_sources(args(&["data/run1.csv"]), Some("1000".into()));
        assert_eq!(config.startup_path, Some(PathBuf::from("data/run1.csv")));
        assert_eq!(config.load_mode, LoadMode::Chunked { rows: 1000 });
    }

    #[test]
    fn test_whole_file_and_invalid_values() {
        let whole = AppConfig::from_sources(args(&[]), Some("0".into()));
        assert_eq!(whole.load_mode, LoadMode::WholeFile);

        let invalid = AppConfig::from_sources(args(&[""]), Some("lots".into()));
        assert_eq!(invalid.load_mode, LoadMode::default());
        assert_eq!(invalid.startup_path, None);
    }
}
