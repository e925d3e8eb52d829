//! Remote configuration fetch with graceful fallback
//!
//! An optional GET of `{themes, fonts, fontColors}` from a detected base
//! URL, validated field by field and shallow-merged over the defaults: a
//! valid server array replaces its whole category. Every failure mode
//! (no server configured, network error, timeout, 404) is the expected
//! default-config path and stays at debug-level logging.

use serde::{Deserialize, Serialize};

use crate::theme::{ConfigSet, FontColor, FontFamily, ThemeDescriptor};

/// Request timeout for the config endpoint
pub const REMOTE_TIMEOUT_MS: u64 = 5000;
pub const CONFIG_ENDPOINT: &str = "/api/config";

const LOCAL_BASE_URL: &str = "http://localhost:3001";
const PRODUCTION_BASE_URL: &str = "https://api.book-excerpt.zhifu.tech";

/// The server payload; every category is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub themes: Option<Vec<ThemeDescriptor>>,
    #[serde(default)]
    pub fonts: Option<Vec<FontFamily>>,
    #[serde(default, rename = "fontColors")]
    pub font_colors: Option<Vec<FontColor>>,
}

/// Pick the config server for the host we appear to run on: localhost
/// development talks to the local server, anything else to production.
/// An empty host means no server is configured.
pub fn detect_base_url(host: &str) -> Option<String> {
    if host.is_empty() {
        return None;
    }
    if host == "localhost" || host == "127.0.0.1" || host.contains("localhost") {
        Some(LOCAL_BASE_URL.to_string())
    } else {
        Some(PRODUCTION_BASE_URL.to_string())
    }
}

/// Field-by-field validation of a server payload. A present category must
/// be structurally sound or the whole payload is rejected.
pub fn validate_config(config: &RemoteConfig) -> bool {
    if let Some(themes) = &config.themes {
        for theme in themes {
            if theme.id.is_empty() || (theme.color.is_none() && theme.background.is_none()) {
                return false;
            }
        }
    }
    if let Some(fonts) = &config.fonts {
        for font in fonts {
            if font.id.is_empty() || font.value.is_empty() || font.name.is_empty() {
                return false;
            }
        }
    }
    if let Some(colors) = &config.font_colors {
        for color in colors {
            if color.id.is_empty() || color.value.is_empty() || color.name.is_empty() {
                return false;
            }
        }
    }
    true
}

/// Merge a server payload over defaults. Whole-category replacement: a
/// present, valid server array wins wholesale for that category.
pub fn merge_config(server: Option<RemoteConfig>, defaults: ConfigSet) -> ConfigSet {
    let Some(server) = server else {
        return defaults;
    };
    if !validate_config(&server) {
        log::debug!("remote config failed validation; using defaults");
        return defaults;
    }
    ConfigSet {
        themes: server.themes.unwrap_or(defaults.themes),
        fonts: server.fonts.unwrap_or(defaults.fonts),
        font_colors: server.font_colors.unwrap_or(defaults.font_colors),
    }
}

#[cfg(feature = "remote-config")]
pub use service::ConfigService;

#[cfg(feature = "remote-config")]
mod service {
    use super::*;
    use std::time::Duration;

    /// Blocking client for the config endpoint. Construct it before
    /// entering an async runtime.
    pub struct ConfigService {
        base_url: Option<String>,
        timeout: Duration,
    }

    impl ConfigService {
        pub fn new(base_url: Option<String>) -> Self {
            ConfigService { base_url, timeout: Duration::from_millis(REMOTE_TIMEOUT_MS) }
        }

        pub fn with_timeout(base_url: Option<String>, timeout: Duration) -> Self {
            ConfigService { base_url, timeout }
        }

        /// Fetch the server config, or `None` on any failure, which is
        /// the expected path when no server is configured.
        pub fn fetch_config(&self) -> Option<RemoteConfig> {
            let base = self.base_url.as_deref()?;
            let url = match url::Url::parse(base).and_then(|b| b.join(CONFIG_ENDPOINT)) {
                Ok(url) => url,
                Err(err) => {
                    log::debug!("invalid config base url {}: {}", base, err);
                    return None;
                }
            };

            let client = reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .ok()?;
            let response = match client
                .get(url.as_str())
                .header("Content-Type", "application/json")
                .send()
            {
                Ok(response) => response,
                Err(err) => {
                    log::debug!("config fetch failed, using defaults: {}", err);
                    return None;
                }
            };
            if response.status().as_u16() == 404 {
                // no server configured; perfectly normal
                return None;
            }
            if !response.status().is_success() {
                log::debug!("config fetch returned {}, using defaults", response.status());
                return None;
            }
            match response.json::<RemoteConfig>() {
                Ok(config) => Some(config),
                Err(err) => {
                    log::debug!("config payload unreadable, using defaults: {}", err);
                    None
                }
            }
        }

        /// Fetch, validate, and merge over defaults in one step
        pub fn load_config_set(&self) -> ConfigSet {
            let fetched = self.fetch_config();
            if fetched.is_some() {
                log::info!("loaded remote config");
            }
            merge_config(fetched, ConfigSet::defaults())
        }
    }
}
