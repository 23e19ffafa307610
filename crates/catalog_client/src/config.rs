use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_PAGE_SIZES: [u32; 3] = [10, 25, 100];
pub const DEFAULT_SETTINGS_FILE: &str = "hero_browser.toml";
const CHARACTERS_PATH: &str = "v1/public/characters";

/// Everything a [`crate::QueryController`] needs at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub debounce: Duration,
    pub allowed_page_sizes: Vec<u32>,
    pub initial_page_size: Option<u32>,
}

impl ControllerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            debounce: DEFAULT_DEBOUNCE,
            allowed_page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            initial_page_size: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_page_sizes(mut self, sizes: impl Into<Vec<u32>>) -> Self {
        self.allowed_page_sizes = sizes.into();
        self
    }

    pub fn with_initial_page_size(mut self, size: u32) -> Self {
        self.initial_page_size = Some(size);
        self
    }

    /// Returns the page size the controller starts with.
    pub fn validate(&self) -> Result<u32, ConfigError> {
        let smallest = self
            .allowed_page_sizes
            .iter()
            .copied()
            .min()
            .ok_or(ConfigError::NoPageSizes)?;
        if smallest == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        match self.initial_page_size {
            None => Ok(smallest),
            Some(initial) if self.allowed_page_sizes.contains(&initial) => Ok(initial),
            Some(initial) => Err(ConfigError::InitialPageSizeNotAllowed {
                initial,
                allowed: self.allowed_page_sizes.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub public_key: Option<String>,
    pub debounce_ms: u64,
    pub page_sizes: Vec<u32>,
    pub initial_page_size: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "https://gateway.marvel.com".into(),
            public_key: None,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            initial_page_size: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    public_key: Option<String>,
    debounce_ms: Option<u64>,
    page_sizes: Option<Vec<u32>>,
    initial_page_size: Option<u32>,
}

impl Settings {
    /// Endpoint for the paged character collection.
    pub fn characters_url(&self) -> Result<String, ConfigError> {
        let mut raw = self.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            source,
        })?;
        let url = base
            .join(CHARACTERS_PATH)
            .map_err(|source| ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                source,
            })?;
        Ok(url.to_string())
    }

    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        let config = ControllerConfig {
            base_url: self.characters_url()?,
            api_key: self.public_key.clone().filter(|key| !key.is_empty()),
            debounce: Duration::from_millis(self.debounce_ms),
            allowed_page_sizes: self.page_sizes.clone(),
            initial_page_size: self.initial_page_size,
        };
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.api_url {
            self.api_url = v;
        }
        if let Some(v) = file_cfg.public_key {
            self.public_key = Some(v);
        }
        if let Some(v) = file_cfg.debounce_ms {
            self.debounce_ms = v;
        }
        if let Some(v) = file_cfg.page_sizes {
            self.page_sizes = v;
        }
        if let Some(v) = file_cfg.initial_page_size {
            self.initial_page_size = Some(v);
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("MARVEL_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = var("APP__API_URL") {
            self.api_url = v;
        }

        if let Some(v) = var("MARVEL_PUBLIC_KEY") {
            self.public_key = Some(v);
        }
        if let Some(v) = var("APP__PUBLIC_KEY") {
            self.public_key = Some(v);
        }

        if let Some(v) = var("APP__DEBOUNCE_MS") {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                self.debounce_ms = parsed;
            }
        }

        if let Some(v) = var("APP__PAGE_SIZES") {
            let parsed: Result<Vec<u32>, _> =
                v.split(',').map(|part| part.trim().parse::<u32>()).collect();
            if let Ok(sizes) = parsed {
                self.page_sizes = sizes;
            }
        }

        if let Some(v) = var("APP__INITIAL_PAGE_SIZE") {
            if let Ok(parsed) = v.trim().parse::<u32>() {
                self.initial_page_size = Some(parsed);
            }
        }
    }
}

/// Defaults, then `hero_browser.toml` in the working directory if present,
/// then the process environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(DEFAULT_SETTINGS_FILE) {
        if let Ok(file_cfg) = toml::from_str::<FileSettings>(&raw) {
            settings.apply_file(file_cfg);
        }
    }
    settings.apply_env(|key| std::env::var(key).ok());
    settings
}

/// Like [`load_settings`] but the file is explicit and must exist and parse.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_cfg =
        toml::from_str::<FileSettings>(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    let mut settings = Settings::default();
    settings.apply_file(file_cfg);
    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
