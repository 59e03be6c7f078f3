//! Tunables threaded through every component as an immutable value, built
//! either from CLI flags or parsed from a `key: value` settings file (the
//! layout mirrors the original `Settings` class: `#` starts a comment line,
//! keys are lowercased, split on the first `:`, whitespace trimmed).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RaocError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reads_min_len: u32,
    pub read_len_threshold: u32,
    pub max_reads_in_tip: u32,
    pub max_depth_without_extra_fork: u32,
    pub max_nodes: usize,
    pub max_difference: f64,
    pub max_branches: usize,
    pub max_start_nodes: usize,
    pub length_threshold: f64,
    pub quality_threshold: f64,
    pub overlap_max_abs_errate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reads_min_len: 3000,
            read_len_threshold: 100_000,
            max_reads_in_tip: 2,
            max_depth_without_extra_fork: 5,
            max_nodes: 160,
            max_difference: 0.25,
            max_branches: 18,
            max_start_nodes: 100,
            length_threshold: 0.05,
            quality_threshold: 0.2,
            overlap_max_abs_errate: 0.4,
        }
    }
}

impl Config {
    /// Parses a settings file in the `key: value` form used throughout this
    /// toolchain. Unknown keys are ignored (logged at `warn!`); malformed
    /// numeric values reject the whole file with `InvalidInput`.
    pub fn from_settings_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_settings_str(&text)
    }

    pub fn from_settings_str(text: &str) -> Result<Self> {
        let mut cfg = Config::default();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                tracing::warn!(line = raw_line, "settings line has no ':', skipping");
                continue;
            };

            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            macro_rules! parse_into {
                ($field:ident) => {
                    cfg.$field = value.parse().map_err(|_| {
                        RaocError::invalid_input(
                            "config",
                            format!("bad value for {key}: {value:?}"),
                        )
                    })?
                };
            }

            match key.as_str() {
                "reads_min_len" => parse_into!(reads_min_len),
                "read_len_threshold" => parse_into!(read_len_threshold),
                "max_reads_in_tip" => parse_into!(max_reads_in_tip),
                "max_depth_without_extra_fork" => parse_into!(max_depth_without_extra_fork),
                "max_nodes" => parse_into!(max_nodes),
                "max_difference" => parse_into!(max_difference),
                "max_branches" => parse_into!(max_branches),
                "max_start_nodes" => parse_into!(max_start_nodes),
                "length_threshold" => parse_into!(length_threshold),
                "quality_threshold" => parse_into!(quality_threshold),
                "overlap.max_abs_errate" => parse_into!(overlap_max_abs_errate),
                other => tracing::warn!(key = other, "unrecognized settings key, ignoring"),
            }
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.reads_min_len, 3000);
        assert_eq!(cfg.max_nodes, 160);
        assert!((cfg.max_difference - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_settings_text() {
        let text = "# comment\nREADS_MIN_LEN: 500\noverlap.max_abs_errate: 0.3\n";
        let cfg = Config::from_settings_str(text).unwrap();
        assert_eq!(cfg.reads_min_len, 500);
        assert!((cfg.overlap_max_abs_errate - 0.3).abs() < 1e-9);
        // untouched fields keep their defaults
        assert_eq!(cfg.max_nodes, 160);
    }

    #[test]
    fn rejects_malformed_value() {
        let text = "max_nodes: not-a-number\n";
        assert!(Config::from_settings_str(text).is_err());
    }
}
