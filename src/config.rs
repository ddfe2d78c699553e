use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::domain::{
    BatchConfig, ScoringWeights, DEFAULT_BASE_FARE, DEFAULT_CAPACITY_MAX, DEFAULT_EPSILON_KM,
    DEFAULT_MARKUP_PERCENT, DEFAULT_RADIUS_KM,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_capacity_max")]
    pub capacity_max: u8,
    #[serde(default = "default_epsilon_km")]
    pub epsilon_km: f64,
    /// Include per-passenger rejection analysis in the report
    #[serde(default)]
    pub explain_rejections: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            capacity_max: default_capacity_max(),
            epsilon_km: default_epsilon_km(),
            explain_rejections: false,
        }
    }
}

fn default_radius_km() -> f64 { DEFAULT_RADIUS_KM }
fn default_capacity_max() -> u8 { DEFAULT_CAPACITY_MAX }
fn default_epsilon_km() -> f64 { DEFAULT_EPSILON_KM }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_origin_weight")]
    pub origin: f64,
    #[serde(default = "default_destination_weight")]
    pub destination: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            origin: default_origin_weight(),
            destination: default_destination_weight(),
        }
    }
}

fn default_origin_weight() -> f64 { 1.0 }
fn default_destination_weight() -> f64 { 1.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_base_fare")]
    pub base_fare: f64,
    #[serde(default = "default_markup_percent")]
    pub markup_percent: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            base_fare: default_base_fare(),
            markup_percent: default_markup_percent(),
        }
    }
}

fn default_base_fare() -> f64 { DEFAULT_BASE_FARE }
fn default_markup_percent() -> f64 { DEFAULT_MARKUP_PERCENT }

/// Synthetic pool used when no input file is given
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,
    #[serde(default = "default_area_km")]
    pub area_km: f64,
    #[serde(default = "default_min_drivers")]
    pub min_drivers: usize,
    #[serde(default = "default_max_drivers")]
    pub max_drivers: usize,
    #[serde(default = "default_min_passengers")]
    pub min_passengers: usize,
    #[serde(default = "default_max_passengers")]
    pub max_passengers: usize,
    #[serde(default = "default_neighborhoods")]
    pub neighborhoods: usize,
    #[serde(default = "default_work_areas")]
    pub work_areas: usize,
    #[serde(default = "default_cluster_radius_km")]
    pub cluster_radius_km: f64,
    #[serde(default = "default_weekend_share")]
    pub weekend_share: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            area_km: default_area_km(),
            min_drivers: default_min_drivers(),
            max_drivers: default_max_drivers(),
            min_passengers: default_min_passengers(),
            max_passengers: default_max_passengers(),
            neighborhoods: default_neighborhoods(),
            work_areas: default_work_areas(),
            cluster_radius_km: default_cluster_radius_km(),
            weekend_share: default_weekend_share(),
        }
    }
}

fn default_seed() -> u64 { 42 }
fn default_center_lat() -> f64 { 35.6892 }
fn default_center_lon() -> f64 { 51.3890 }
fn default_area_km() -> f64 { 5.0 }
fn default_min_drivers() -> usize { 10 }
fn default_max_drivers() -> usize { 30 }
fn default_min_passengers() -> usize { 50 }
fn default_max_passengers() -> usize { 150 }
fn default_neighborhoods() -> usize { 5 }
fn default_work_areas() -> usize { 3 }
fn default_cluster_radius_km() -> f64 { 1.5 }
fn default_weekend_share() -> f64 { 0.1 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CARPOOL)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CARPOOL__MATCHING__RADIUS_KM -> matching.radius_km
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Engine parameters for one batch
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            radius_km: self.matching.radius_km,
            capacity_max: self.matching.capacity_max,
            weights: ScoringWeights {
                origin: self.scoring.weights.origin,
                destination: self.scoring.weights.destination,
            },
            base_fare: self.pricing.base_fare,
            markup_percent: self.pricing.markup_percent,
            epsilon_km: self.matching.epsilon_km,
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("CARPOOL")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.origin, 1.0);
        assert_eq!(weights.destination, 1.0);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }

    #[test]
    fn test_defaults_project_to_default_batch_config() {
        assert_eq!(Settings::default().batch_config(), BatchConfig::default());
    }

    #[test]
    fn test_load_from_file_with_partial_sections() {
        let path = std::env::temp_dir().join(format!("carpool-settings-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[matching]\nradius_km = 1.5\n\n[pricing]\nmarkup_percent = 10.0").unwrap();
        drop(file);

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let config = settings.batch_config();
        assert_eq!(config.radius_km, 1.5);
        assert_eq!(config.markup_percent, 10.0);
        assert_eq!(config.capacity_max, DEFAULT_CAPACITY_MAX);
        assert_eq!(config.base_fare, DEFAULT_BASE_FARE);
    }
}
