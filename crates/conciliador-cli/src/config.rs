use anyhow::{Context, Result};
use conciliador::{Decimal, ReconcileConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLedgers {
    pub internal: Option<PathBuf>,
    pub bank: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawConfigMatching")]
pub struct ConfigMatching(pub ReconcileConfig);

impl Default for ConfigMatching {
    fn default() -> Self {
        ConfigMatching(ReconcileConfig::default())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigMatching {
    amount_tolerance: Option<Decimal>,
    date_window_hours: Option<u32>,
}

impl TryFrom<RawConfigMatching> for ConfigMatching {
    type Error = String;

    fn try_from(raw: RawConfigMatching) -> Result<Self, Self::Error> {
        let mut config = ReconcileConfig::default();
        if let Some(tolerance) = raw.amount_tolerance {
            if tolerance.is_sign_negative() {
                return Err(format!("amount_tolerance must not be negative, got {tolerance}"));
            }
            config.amount_tolerance = tolerance;
        }
        if let Some(hours) = raw.date_window_hours {
            config.date_window = chrono::TimeDelta::hours(i64::from(hours));
        }
        Ok(ConfigMatching(config))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub ledgers: ConfigLedgers,
    #[serde(default)]
    pub matching: ConfigMatching,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<(PathBuf, Self)> {
        let base_dir = path.parent().map(ToOwned::to_owned).unwrap_or_default();

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok((base_dir, config))
    }

    pub fn find_and_load() -> Result<Option<(PathBuf, Self)>> {
        let config_locations = [
            Path::new("conciliador.toml"),
            Path::new(".conciliador.toml"),
        ];

        for location in &config_locations {
            if location.exists() {
                return Self::load_from_file(location).map(Some);
            }
        }

        Ok(None)
    }
}
