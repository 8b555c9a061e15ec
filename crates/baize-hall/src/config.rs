//! # Hall Configuration
//!
//! Configuration for the hall service layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BAIZE_TAX_ENABLED=true                                             │
//! │     BAIZE_TAX_PERCENTAGE=11                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/baize-pos/hall.toml (Linux)                              │
//! │     ~/Library/Application Support/com.baize.pos/hall.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Tax disabled, 30s expiry poll                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # hall.toml
//! [hall]
//! name = "Baize Billiard Hall"
//! default_staff_id = "default"
//!
//! [tax]
//! enabled = true
//! percentage = 11.0
//! name = "PPN"
//! apply_to_tables = true
//! apply_to_fnb = false
//!
//! [billing]
//! expiry_poll_interval_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use baize_core::validation::validate_tax_percentage;
use baize_core::{TaxConfig, TaxRate};

use crate::error::{HallError, HallResult};

// =============================================================================
// Hall Settings
// =============================================================================

/// Identity of this hall installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallSettings {
    /// Display name on receipts and the floor dashboard.
    #[serde(default = "default_hall_name")]
    pub name: String,

    /// Staff id stamped on operations that arrive without one
    /// (the expiry watcher, migration backfills).
    #[serde(default = "default_staff_id")]
    pub default_staff_id: String,
}

fn default_hall_name() -> String {
    "Baize Billiard Hall".to_string()
}

fn default_staff_id() -> String {
    "default".to_string()
}

impl Default for HallSettings {
    fn default() -> Self {
        HallSettings {
            name: default_hall_name(),
            default_staff_id: default_staff_id(),
        }
    }
}

// =============================================================================
// Tax Settings
// =============================================================================

/// Tax rules the hall runs under.
///
/// Table time and F&B are taxed independently; either side can be
/// switched off while the other stays on. Defaults describe the common
/// Indonesian setup (11% PPN on table time) but ship disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSettings {
    /// Master switch; when false no tax is ever charged.
    #[serde(default)]
    pub enabled: bool,

    /// Percentage applied to each enabled revenue category.
    #[serde(default = "default_tax_percentage")]
    pub percentage: f64,

    /// Display name on receipts.
    #[serde(default = "default_tax_name")]
    pub name: String,

    /// Tax table-time revenue.
    #[serde(default = "default_true")]
    pub apply_to_tables: bool,

    /// Tax F&B revenue.
    #[serde(default)]
    pub apply_to_fnb: bool,
}

fn default_tax_percentage() -> f64 {
    11.0
}

fn default_tax_name() -> String {
    "PPN".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            enabled: false,
            percentage: default_tax_percentage(),
            name: default_tax_name(),
            apply_to_tables: true,
            apply_to_fnb: false,
        }
    }
}

impl TaxSettings {
    /// Builds the evaluator the billing code consumes.
    pub fn tax_config(&self) -> TaxConfig {
        TaxConfig {
            enabled: self.enabled,
            rate: TaxRate::from_percentage(self.percentage),
            name: self.name.clone(),
            apply_to_tables: self.apply_to_tables,
            apply_to_fnb: self.apply_to_fnb,
        }
    }
}

// =============================================================================
// Billing Settings
// =============================================================================

/// Billing behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSettings {
    /// Interval between expiry sweeps (seconds). Each sweep ends every
    /// active timed session whose planned duration has run out.
    #[serde(default = "default_expiry_poll_interval")]
    pub expiry_poll_interval_secs: u64,
}

fn default_expiry_poll_interval() -> u64 {
    30
}

impl Default for BillingSettings {
    fn default() -> Self {
        BillingSettings {
            expiry_poll_interval_secs: default_expiry_poll_interval(),
        }
    }
}

// =============================================================================
// Main Hall Configuration
// =============================================================================

/// Complete hall configuration.
///
/// ## Example Config File
/// ```toml
/// [hall]
/// name = "Baize Billiard Hall"
/// default_staff_id = "default"
///
/// [tax]
/// enabled = true
/// percentage = 11.0
/// apply_to_tables = true
/// apply_to_fnb = false
///
/// [billing]
/// expiry_poll_interval_secs = 30
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HallConfig {
    /// Hall identity.
    #[serde(default)]
    pub hall: HallSettings,

    /// Tax rules.
    #[serde(default)]
    pub tax: TaxSettings,

    /// Billing behavior.
    #[serde(default)]
    pub billing: BillingSettings,
}

impl HallConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (hall.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> HallResult<Self> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading hall config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load hall config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> HallResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| HallError::ConfigSaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Hall config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> HallResult<()> {
        if self.hall.name.trim().is_empty() {
            return Err(HallError::InvalidConfig("hall name must not be empty".into()));
        }

        if self.hall.default_staff_id.trim().is_empty() {
            return Err(HallError::InvalidConfig(
                "default_staff_id must not be empty".into(),
            ));
        }

        validate_tax_percentage(self.tax.percentage)
            .map_err(|e| HallError::InvalidConfig(e.to_string()))?;

        if self.billing.expiry_poll_interval_secs == 0 {
            return Err(HallError::InvalidConfig(
                "expiry_poll_interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Hall name
        if let Ok(name) = std::env::var("BAIZE_HALL_NAME") {
            self.hall.name = name;
        }

        // Default staff
        if let Ok(staff) = std::env::var("BAIZE_DEFAULT_STAFF_ID") {
            self.hall.default_staff_id = staff;
        }

        // Tax master switch
        if let Ok(enabled) = std::env::var("BAIZE_TAX_ENABLED") {
            if let Ok(b) = enabled.parse::<bool>() {
                debug!(enabled = b, "Overriding tax switch from environment");
                self.tax.enabled = b;
            }
        }

        // Tax percentage
        if let Ok(pct) = std::env::var("BAIZE_TAX_PERCENTAGE") {
            if let Ok(p) = pct.parse::<f64>() {
                debug!(percentage = p, "Overriding tax percentage from environment");
                self.tax.percentage = p;
            }
        }

        // Expiry poll interval
        if let Ok(secs) = std::env::var("BAIZE_EXPIRY_POLL_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.billing.expiry_poll_interval_secs = s;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "baize", "pos").map(|dirs| {
            let config_dir = dirs.config_dir();
            config_dir.join("hall.toml")
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the tax evaluator for billing.
    pub fn tax_config(&self) -> TaxConfig {
        self.tax.tax_config()
    }

    /// Returns the expiry sweep interval.
    pub fn expiry_poll_interval(&self) -> Duration {
        Duration::from_secs(self.billing.expiry_poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HallConfig::default();
        assert!(!config.tax.enabled);
        assert_eq!(config.tax.percentage, 11.0);
        assert!(config.tax.apply_to_tables);
        assert!(!config.tax.apply_to_fnb);
        assert_eq!(config.billing.expiry_poll_interval_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = HallConfig::default();

        config.tax.percentage = 140.0;
        assert!(config.validate().is_err());

        config.tax.percentage = 11.0;
        config.billing.expiry_poll_interval_secs = 0;
        assert!(config.validate().is_err());

        config.billing.expiry_poll_interval_secs = 30;
        config.hall.name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tax_config_mapping() {
        let mut config = HallConfig::default();
        config.tax.enabled = true;
        config.tax.apply_to_fnb = true;

        let tax = config.tax_config();
        assert!(tax.enabled);
        assert!(tax.apply_to_tables);
        assert!(tax.apply_to_fnb);
        assert_eq!(tax.rate.percentage(), 11.0);
        assert_eq!(tax.name, "PPN");
    }

    #[test]
    fn test_toml_serialization() {
        let config = HallConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[hall]"));
        assert!(toml_str.contains("[tax]"));
        assert!(toml_str.contains("[billing]"));

        let parsed: HallConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.tax.percentage, config.tax.percentage);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: HallConfig = toml::from_str(
            r#"
            [tax]
            enabled = true
            apply_to_fnb = true
            "#,
        )
        .unwrap();

        assert!(parsed.tax.enabled);
        assert!(parsed.tax.apply_to_fnb);
        // Unlisted fields fall back to defaults
        assert_eq!(parsed.tax.percentage, 11.0);
        assert_eq!(parsed.billing.expiry_poll_interval_secs, 30);
        assert_eq!(parsed.hall.name, "Baize Billiard Hall");
    }
}
