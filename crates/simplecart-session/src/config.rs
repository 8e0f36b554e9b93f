//! # Cart Configuration
//!
//! Limits, persistence and identity settings for a [`crate::CartEngine`].
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SIMPLECART_MAX_ITEMS=10                                            │
//! │     SIMPLECART_PERSISTENCE=cookie                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cart/cart.toml (Linux)                                   │
//! │     ~/Library/Application Support/com.simplecart.cart/cart.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no limits, session persistence, structured format                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Hosts that build their configuration in code use
//! [`CartConfig::from_options`], which accepts the same loosely typed
//! option pairs a web form or framework config would carry.
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [cart]
//! max_items = 0          # 0 = unlimited distinct items
//! max_item_quantity = 0  # 0 = unlimited quantity per variant
//!
//! [persistence]
//! mode = "session"       # session | cookie
//! format = "structured"  # structured | delimited
//! cookie_path = "/"
//! cookie_max_age_days = 7
//!
//! [identity]
//! seed = "shop.example.com"
//! # session_id = "checkout-42"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use simplecart_core::validation::parse_count;
use simplecart_core::{CartIdentity, StoreLimits, WireFormat};

use crate::cookie::{DEFAULT_COOKIE_MAX_AGE_DAYS, DEFAULT_COOKIE_PATH};
use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Persistence Mode
// =============================================================================

/// Where the encoded cart lives between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// Server-side session storage.
    #[default]
    Session,

    /// Browser cookies.
    Cookie,
}

impl std::fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceMode::Session => write!(f, "session"),
            PersistenceMode::Cookie => write!(f, "cookie"),
        }
    }
}

impl std::str::FromStr for PersistenceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "session" => Ok(PersistenceMode::Session),
            "cookie" | "cookies" => Ok(PersistenceMode::Cookie),
            other => Err(ConfigError::Invalid(format!(
                "Unknown persistence mode: '{}'. Valid options: session, cookie",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[cart]` section: store limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSettings {
    /// Maximum distinct items. 0 = unlimited.
    #[serde(default)]
    pub max_items: u32,

    /// Maximum quantity per variant. 0 = unlimited.
    #[serde(default)]
    pub max_item_quantity: u32,
}

/// `[persistence]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    #[serde(default)]
    pub mode: PersistenceMode,

    #[serde(default)]
    pub format: WireFormat,

    /// Path scope of cart cookies.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Cookie lifetime after the last write.
    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,
}

fn default_cookie_path() -> String {
    DEFAULT_COOKIE_PATH.to_string()
}

fn default_cookie_max_age_days() -> i64 {
    DEFAULT_COOKIE_MAX_AGE_DAYS
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            mode: PersistenceMode::default(),
            format: WireFormat::default(),
            cookie_path: default_cookie_path(),
            cookie_max_age_days: default_cookie_max_age_days(),
        }
    }
}

/// `[identity]` section. An explicit session id wins over the seed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Host seed, typically the request host name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,

    /// Caller-chosen cart id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// =============================================================================
// Cart Config
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,

    #[serde(default)]
    pub identity: IdentitySettings,
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.persistence.cookie_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "cookie_path must start with '/', got: {}",
                self.persistence.cookie_path
            )));
        }

        if self.persistence.cookie_max_age_days <= 0 {
            return Err(ConfigError::Invalid(
                "cookie_max_age_days must be greater than 0".into(),
            ));
        }

        if let Some(ref session_id) = self.identity.session_id {
            CartIdentity::from_session_id(session_id)?;
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `SIMPLECART_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SIMPLECART_MAX_ITEMS") {
            match parse_count(raw.trim()) {
                Some(max) => {
                    debug!(max_items = max, "Overriding max items from environment");
                    self.cart.max_items = max;
                }
                None => warn!(value = %raw, "Ignoring non-numeric SIMPLECART_MAX_ITEMS"),
            }
        }

        if let Some(raw) = lookup("SIMPLECART_MAX_ITEM_QUANTITY") {
            match parse_count(raw.trim()) {
                Some(max) => {
                    debug!(max_item_quantity = max, "Overriding max item quantity from environment");
                    self.cart.max_item_quantity = max;
                }
                None => warn!(value = %raw, "Ignoring non-numeric SIMPLECART_MAX_ITEM_QUANTITY"),
            }
        }

        if let Some(raw) = lookup("SIMPLECART_PERSISTENCE") {
            match raw.parse() {
                Ok(mode) => {
                    debug!(mode = %raw, "Overriding persistence mode from environment");
                    self.persistence.mode = mode;
                }
                Err(_) => warn!(mode = %raw, "Unknown persistence mode in environment"),
            }
        }

        if let Some(raw) = lookup("SIMPLECART_FORMAT") {
            match raw.parse() {
                Ok(format) => {
                    debug!(format = %raw, "Overriding wire format from environment");
                    self.persistence.format = format;
                }
                Err(_) => warn!(format = %raw, "Unknown wire format in environment"),
            }
        }

        if let Some(id) = lookup("SIMPLECART_SESSION_ID") {
            debug!(session_id = %id, "Overriding session id from environment");
            self.identity.session_id = Some(id);
        }

        if let Some(seed) = lookup("SIMPLECART_SEED") {
            self.identity.seed = Some(seed);
        }
    }

    /// Builds a configuration from loosely typed host options.
    ///
    /// ## Recognized Keys
    /// - `cartMaxItem`, `itemMaxQuantity`: digits only, anything else ignored
    /// - `useCookie`: any value but `""`, `"0"` or `"false"` selects cookies
    /// - `format`: `structured` / `delimited`
    /// - `sessionId`, `seed`: identity
    pub fn from_options<I, K, V>(options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in options {
            let value = value.as_ref();
            match key.as_ref() {
                "cartMaxItem" => {
                    if let Some(max) = parse_count(value) {
                        config.cart.max_items = max;
                    }
                }
                "itemMaxQuantity" => {
                    if let Some(max) = parse_count(value) {
                        config.cart.max_item_quantity = max;
                    }
                }
                "useCookie" => {
                    let enabled = !matches!(value.trim().to_lowercase().as_str(), "" | "0" | "false");
                    if enabled {
                        config.persistence.mode = PersistenceMode::Cookie;
                    }
                }
                "format" => match value.parse() {
                    Ok(format) => config.persistence.format = format,
                    Err(_) => warn!(format = %value, "Ignoring unknown format option"),
                },
                "sessionId" => config.identity.session_id = Some(value.to_string()),
                "seed" => config.identity.seed = Some(value.to_string()),
                other => debug!(option = %other, "Ignoring unknown cart option"),
            }
        }

        config
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "simplecart", "cart").map(|dirs| {
            let config_dir = dirs.config_dir();
            config_dir.join("cart.toml")
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the store limits.
    pub fn limits(&self) -> StoreLimits {
        StoreLimits::new(self.cart.max_items, self.cart.max_item_quantity)
    }

    /// Resolves the cart identity: explicit session id, then seed.
    pub fn identity(&self) -> ConfigResult<CartIdentity> {
        Ok(CartIdentity::resolve(
            self.identity.session_id.as_deref(),
            self.identity.seed.as_deref(),
        )?)
    }

    /// Returns the persistence mode.
    pub fn mode(&self) -> PersistenceMode {
        self.persistence.mode
    }

    /// Returns the wire format.
    pub fn format(&self) -> WireFormat {
        self.persistence.format
    }
}
