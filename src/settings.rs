use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::parser::canto::BlockSettings;

pub const ENV_PREFIX: &str = "COMMEDIA";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub block_size: usize,
    pub block_overlap: usize,
    /// Extra whole-line noise patterns, appended after the built-in table.
    #[serde(default)]
    pub extra_noise_patterns: Vec<String>,
}

/// Values given on the command line; `None` leaves lower layers in charge.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub block_size: Option<usize>,
    pub block_overlap: Option<usize>,
}

impl Settings {
    /// defaults → optional TOML file → `COMMEDIA_*` env → CLI flags.
    pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<Self> {
        Self::load_with_env(file, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(file: Option<&Path>, overrides: Overrides, env: Environment) -> Result<Self> {
        let defaults = BlockSettings::default();
        let mut builder = Config::builder()
            .set_default("block_size", defaults.size as u64)?
            .set_default("block_overlap", defaults.overlap as u64)?;
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                env.try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extra_noise_patterns"),
            )
            .set_override_option("block_size", overrides.block_size.map(|v| v as u64))?
            .set_override_option("block_overlap", overrides.block_overlap.map(|v| v as u64))?
            .build()
            .context("Failed to build settings")?
            .try_deserialize::<Settings>()
            .context("Invalid settings")?;
        Ok(settings)
    }

    pub fn blocks(&self) -> BlockSettings {
        BlockSettings {
            size: self.block_size,
            overlap: self.block_overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn defaults() {
        let s = Settings::load_with_env(None, Overrides::default(), env(&[])).unwrap();
        assert_eq!(s.block_size, 12);
        assert_eq!(s.block_overlap, 0);
        assert!(s.extra_noise_patterns.is_empty());
    }

    #[test]
    fn env_then_cli_precedence() {
        let vars = [
            ("COMMEDIA_BLOCK_SIZE", "6"),
            ("COMMEDIA_BLOCK_OVERLAP", "2"),
            ("COMMEDIA_EXTRA_NOISE_PATTERNS", "Tavola \\d+,FINE"),
        ];
        let overrides = Overrides {
            block_size: None,
            block_overlap: Some(1),
        };
        let s = Settings::load_with_env(None, overrides, env(&vars)).unwrap();
        assert_eq!(s.block_size, 6);
        assert_eq!(s.block_overlap, 1);
        assert_eq!(s.extra_noise_patterns, vec!["Tavola \\d+", "FINE"]);
    }

    #[test]
    fn toml_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commedia.toml");
        std::fs::write(
            &path,
            "block_size = 9\nextra_noise_patterns = [\"Tavola [IVX]+\"]\n",
        )
        .unwrap();
        let s = Settings::load_with_env(Some(&path), Overrides::default(), env(&[])).unwrap();
        assert_eq!(s.block_size, 9);
        assert_eq!(s.block_overlap, 0);
        assert_eq!(s.extra_noise_patterns, vec!["Tavola [IVX]+"]);
        assert_eq!(s.blocks(), BlockSettings { size: 9, overlap: 0 });
    }

    #[test]
    fn missing_file_is_error() {
        let missing = Path::new("does/not/exist.toml");
        assert!(Settings::load_with_env(Some(missing), Overrides::default(), env(&[])).is_err());
    }
}
