use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Environment variable that overrides `storage.data_dir`.
pub const DATA_DIR_ENV: &str = "HOTEL_DATA_DIR";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub reservations: ReservationConfig,
}

/// Where the three snapshot files live.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_customers_file")]
    pub customers_file: String,
    #[serde(default = "default_hotels_file")]
    pub hotels_file: String,
    #[serde(default = "default_reservations_file")]
    pub reservations_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            customers_file: default_customers_file(),
            hotels_file: default_hotels_file(),
            reservations_file: default_reservations_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReservationConfig {
    /// Length of generated reservation ids.
    #[serde(default = "default_id_length")]
    pub id_length: usize,
    /// How many fresh ids to try before giving up on a collision.
    #[serde(default = "default_id_max_attempts")]
    pub id_max_attempts: u32,
    /// Parse check-in/check-out as `YYYY-MM-DD` and require check-in < check-out.
    #[serde(default)]
    pub validate_stay_dates: bool,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            id_length: default_id_length(),
            id_max_attempts: default_id_max_attempts(),
            validate_stay_dates: false,
        }
    }
}

fn default_data_dir() -> String { "data".into() }
fn default_customers_file() -> String { "customers.json".into() }
fn default_hotels_file() -> String { "hotels.json".into() }
fn default_reservations_file() -> String { "reservations.json".into() }
fn default_id_length() -> usize { 8 }
fn default_id_max_attempts() -> u32 { 5 }

/// Hyphen-free uuid v4 text has 32 characters; ids are a prefix of it.
const ID_LENGTH_MAX: usize = 32;

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH`/`config.toml`, falling back to defaults when
    /// no file is present, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.reservations.validate()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = dir;
            }
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let files = [
            ("storage.customers_file", &self.customers_file),
            ("storage.hotels_file", &self.hotels_file),
            ("storage.reservations_file", &self.reservations_file),
        ];
        for (key, name) in files {
            if name.trim().is_empty() {
                return Err(anyhow!("{key} must not be empty"));
            }
        }
        if self.customers_file == self.hotels_file
            || self.customers_file == self.reservations_file
            || self.hotels_file == self.reservations_file
        {
            return Err(anyhow!("each store needs its own snapshot file"));
        }
        Ok(())
    }

    pub fn customers_path(&self) -> PathBuf { PathBuf::from(&self.data_dir).join(&self.customers_file) }
    pub fn hotels_path(&self) -> PathBuf { PathBuf::from(&self.data_dir).join(&self.hotels_file) }
    pub fn reservations_path(&self) -> PathBuf { PathBuf::from(&self.data_dir).join(&self.reservations_file) }
}

impl ReservationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.id_length == 0 || self.id_length > ID_LENGTH_MAX {
            return Err(anyhow!("reservations.id_length must be in 1..={ID_LENGTH_MAX}"));
        }
        if self.id_max_attempts == 0 {
            return Err(anyhow!("reservations.id_max_attempts must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = load_from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.storage.customers_path(), PathBuf::from("data").join("customers.json"));
        assert_eq!(cfg.reservations.id_length, 8);
        assert!(!cfg.reservations.validate_stay_dates);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = load_from_str(
            r#"
            [storage]
            data_dir = "/var/lib/hotel"

            [reservations]
            validate_stay_dates = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.storage.hotels_path(), PathBuf::from("/var/lib/hotel").join("hotels.json"));
        assert!(cfg.reservations.validate_stay_dates);
        assert_eq!(cfg.reservations.id_max_attempts, 5);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.storage.hotels_file = " ".into();
        assert!(cfg.storage.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.reservations_file = cfg.storage.hotels_file.clone();
        assert!(cfg.storage.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.reservations.id_length = 0;
        assert!(cfg.reservations.validate().is_err());
        cfg.reservations.id_length = 33;
        assert!(cfg.reservations.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.reservations.id_max_attempts = 0;
        assert!(cfg.reservations.validate().is_err());
    }

    #[test]
    fn missing_file_is_detected() {
        let path = std::env::temp_dir().join(format!("no_config_{}.toml", uuid::Uuid::new_v4()));
        let err = load_from_file(path.to_str().unwrap()).unwrap_err();
        assert!(is_missing_file(&err));

        let err = load_from_str("storage = 5").unwrap_err();
        assert!(!is_missing_file(&err));
    }
}
