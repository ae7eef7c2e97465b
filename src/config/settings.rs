//! User settings for ledger-import
//!
//! Manages the backend connection, request timeout and wizard preferences.

use serde::{Deserialize, Serialize};

use super::paths::ImportPaths;
use crate::error::ImportError;
use crate::wizard::WizardVariant;

/// User settings for ledger-import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Base URL of the finance backend (e.g. "http://localhost:8000/api")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Whether the wizard ends with a separate Submit step
    #[serde(default)]
    pub wizard_variant: WizardVariant,

    /// Ask for AI suggestions right after a successful parse
    #[serde(default = "default_auto_suggest")]
    pub auto_suggest: bool,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_auto_suggest() -> bool {
    true
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            api_base_url: default_api_base_url(),
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            wizard_variant: WizardVariant::default(),
            auto_suggest: default_auto_suggest(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ImportPaths) -> Result<Self, ImportError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| ImportError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ImportError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ImportPaths) -> Result<(), ImportError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ImportError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ImportError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Apply command-line overrides on top of the stored values
    pub fn with_overrides(mut self, api_url: Option<String>, api_token: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_base_url = url;
        }
        if api_token.is_some() {
            self.api_token = api_token;
        }
        self
    }

    /// Change one setting by its key, as typed on the command line
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ImportError> {
        let invalid = |expected: &str| {
            ImportError::Validation(format!(
                "Invalid value '{}' for {}: expected {}",
                value, key, expected
            ))
        };

        match key.replace('-', "_").as_str() {
            "api_base_url" | "api_url" => self.api_base_url = value.trim().to_string(),
            "api_token" => {
                self.api_token = Some(value.trim().to_string()).filter(|t| !t.is_empty())
            }
            "request_timeout_secs" | "timeout" => {
                self.request_timeout_secs = value
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| invalid("a positive number of seconds"))?
            }
            "wizard_variant" | "variant" => {
                self.wizard_variant = match value.replace('-', "_").as_str() {
                    "standard" => WizardVariant::Standard,
                    "with_review" | "review" => WizardVariant::WithReview,
                    _ => return Err(invalid("standard or with-review")),
                }
            }
            "auto_suggest" => {
                self.auto_suggest = value.parse().map_err(|_| invalid("true or false"))?
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "date_format" => {
                if value.trim().is_empty() {
                    return Err(invalid("a strftime format"));
                }
                self.date_format = value.to_string()
            }
            _ => {
                return Err(ImportError::Validation(format!(
                    "Unknown setting: '{}'",
                    key
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.wizard_variant, WizardVariant::Standard);
        assert!(settings.auto_suggest);
        assert_eq!(settings.request_timeout_secs, 60);
        assert!(settings.api_token.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ImportPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.api_base_url = "https://finance.example.com/api".into();
        settings.wizard_variant = WizardVariant::WithReview;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.api_base_url, "https://finance.example.com/api");
        assert_eq!(loaded.wizard_variant, WizardVariant::WithReview);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"api_base_url":"http://x"}"#).unwrap();
        assert_eq!(settings.api_base_url, "http://x");
        assert_eq!(settings.currency_symbol, "$");
        assert!(settings.auto_suggest);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_overrides(Some("http://override".into()), Some("secret".into()));
        assert_eq!(settings.api_base_url, "http://override");
        assert_eq!(settings.api_token.as_deref(), Some("secret"));

        let untouched = Settings::default().with_overrides(None, None);
        assert_eq!(untouched.api_base_url, default_api_base_url());
    }

    #[test]
    fn test_set_by_key() {
        let mut settings = Settings::default();
        settings.set("api-url", "https://finance.example.com").unwrap();
        settings.set("variant", "with-review").unwrap();
        settings.set("auto_suggest", "false").unwrap();
        settings.set("timeout", "5").unwrap();

        assert_eq!(settings.api_base_url, "https://finance.example.com");
        assert_eq!(settings.wizard_variant, WizardVariant::WithReview);
        assert!(!settings.auto_suggest);
        assert_eq!(settings.request_timeout_secs, 5);

        settings.set("api_token", "  ").unwrap();
        assert!(settings.api_token.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(settings.set("timeout", "0").unwrap_err().is_validation());
        assert!(settings.set("variant", "fancy").is_err());
        assert!(settings.set("colour", "blue").is_err());
        assert_eq!(settings.request_timeout_secs, 60);
    }
}
