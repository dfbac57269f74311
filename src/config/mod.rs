use anyhow::{bail, Context, Result};
use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub io: IoConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IoConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl IoConfig {
    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ if self.delimiter == "\\t" => Ok(b'\t'),
            _ => bail!("Delimiter must be a single byte, got '{}'", self.delimiter),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Starting index level for VAMI
    pub starting_value: f64,
    /// Observations per year used to annualize returns
    pub periods_per_year: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            starting_value: 1000.0,
            periods_per_year: 252.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: String,
    pub height: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: "800px".to_string(),
            height: "600px".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let settings = ConfigLoader::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Self::environment())
            .build()
            .context("Failed to build configuration")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// `OPAT_<SECTION>__<KEY>` overrides, e.g. `OPAT_IO__DELIMITER=';'`
    fn environment() -> Environment {
        Environment::with_prefix("OPAT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn config_path() -> PathBuf {
        // Try local config first, then next to the executable
        let local_config = PathBuf::from("config/default.toml");
        if local_config.exists() {
            return local_config;
        }

        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let exe_config = exe_dir.join("config/default.toml");
                if exe_config.exists() {
                    return exe_config;
                }
            }
        }

        local_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.io.delimiter_byte().unwrap(), b',');
        assert_eq!(config.stats.starting_value, 1000.0);
        assert_eq!(config.stats.periods_per_year, 252.0);
        assert_eq!(config.plot.width, "800px");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = ConfigLoader::builder()
            .add_source(config::File::from_str(
                "[stats]\nperiods_per_year = 12.0\n\n[plot]\nwidth = \"100%\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.stats.starting_value, 1000.0);
        assert_eq!(config.stats.periods_per_year, 12.0);
        assert_eq!(config.io.delimiter, ",");
        assert_eq!(config.plot.width, "100%");
        assert_eq!(config.plot.height, "600px");
    }

    #[test]
    fn test_env_overrides_file() {
        let vars = HashMap::from([
            ("OPAT_IO__DELIMITER".to_string(), ";".to_string()),
            ("OPAT_STATS__STARTING_VALUE".to_string(), "100".to_string()),
            ("OPAT_PLOT__HEIGHT".to_string(), "400px".to_string()),
        ]);

        let settings = ConfigLoader::builder()
            .add_source(config::File::from_str(
                "[stats]\nstarting_value = 500.0\nperiods_per_year = 12.0\n",
                config::FileFormat::Toml,
            ))
            .add_source(Config::environment().source(Some(vars)))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.io.delimiter_byte().unwrap(), b';');
        assert_eq!(config.stats.starting_value, 100.0);
        assert_eq!(config.stats.periods_per_year, 12.0);
        assert_eq!(config.plot.height, "400px");
        assert_eq!(config.plot.width, "800px");
    }

    #[test]
    fn test_delimiter_validation() {
        let tab = IoConfig {
            delimiter: "\\t".to_string(),
        };
        assert_eq!(tab.delimiter_byte().unwrap(), b'\t');

        let bad = IoConfig {
            delimiter: ";;".to_string(),
        };
        assert!(bad.delimiter_byte().is_err());
    }
}
