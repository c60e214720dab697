use log::Level;
use web_sys::window;

const STORAGE_API_BASE: &str = "stockdash_api_base";
const STORAGE_PREDICT_PATH: &str = "stockdash_predict_path";
const STORAGE_LOG_LEVEL: &str = "stockdash_log_level";
const STORAGE_CURRENCY: &str = "stockdash_currency_symbol";

/// Global application settings
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    /// Backend origin (e.g., "http://localhost:5000"); empty means the page's own origin
    pub api_base: String,

    /// Path of the prediction endpoint
    pub predict_path: String,

    /// Default log level for the application
    pub log_level: Level,

    /// Enable debug mode
    pub debug_mode: bool,

    /// Symbol prefixed to prices in the report and axis titles
    pub currency_symbol: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            predict_path: "/predict-next".to_string(),
            log_level: Level::Info,
            debug_mode: false,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl AppSettings {
    /// Create settings from environment/window location
    pub fn from_environment() -> Self {
        let mut settings = Self::default();

        let Some(window) = window() else {
            return settings;
        };

        if let Ok(hostname) = window.location().hostname() {
            settings.debug_mode = hostname == "localhost" || hostname == "127.0.0.1";

            // In development, use more verbose logging
            if settings.debug_mode {
                settings.log_level = Level::Debug;
            }
        }

        if let Ok(Some(storage)) = window.local_storage() {
            if let Ok(Some(api_base)) = storage.get_item(STORAGE_API_BASE) {
                settings.api_base = api_base;
            }

            if let Ok(Some(predict_path)) = storage.get_item(STORAGE_PREDICT_PATH) {
                settings.predict_path = predict_path;
            }

            if let Ok(Some(log_level)) = storage.get_item(STORAGE_LOG_LEVEL) {
                settings.log_level = parse_log_level(&log_level).unwrap_or(settings.log_level);
            }

            if let Ok(Some(currency)) = storage.get_item(STORAGE_CURRENCY) {
                settings.currency_symbol = currency;
            }
        }

        settings
    }

    /// Get the full API URL for an endpoint
    pub fn api_url(&self, endpoint: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        if endpoint.starts_with('/') || endpoint.is_empty() {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }

    /// URL the prediction form posts to
    pub fn predict_url(&self) -> String {
        self.api_url(&self.predict_path)
    }
}

/// Parses a level name case-insensitively.
pub fn parse_log_level(value: &str) -> Option<Level> {
    match value.trim().to_lowercase().as_str() {
        "error" => Some(Level::Error),
        "warn" => Some(Level::Warn),
        "info" => Some(Level::Info),
        "debug" => Some(Level::Debug),
        "trace" => Some(Level::Trace),
        _ => None,
    }
}

// Global settings instance using thread_local
use std::cell::RefCell;

thread_local! {
    static SETTINGS: RefCell<AppSettings> = RefCell::new(AppSettings::default());
}

/// Get a copy of the current settings
pub fn get_settings() -> AppSettings {
    SETTINGS.with(|s| s.borrow().clone())
}

/// Initialize settings (call this at app startup)
pub fn init_settings() {
    SETTINGS.with(|s| {
        *s.borrow_mut() = AppSettings::from_environment();
    });
}
