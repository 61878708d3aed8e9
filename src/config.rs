use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::prompt::DEFAULT_LANGUAGE;

/// Environment variable holding the provider credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemma-3-27b-it";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub use_mock: bool,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            language: default_language(),
            base_url: default_base_url(),
            use_mock: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables, or create default
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file().unwrap_or_else(|e| {
            info!("Using default config: {}", e);
            Self::default()
        });

        // Environment variables override config file
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    fn load_from_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config = Self::from_toml(&content)?;
            info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            Err(anyhow!("Config file not found"))
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `GEMMA_CODEGEN_*` overrides looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("GEMMA_CODEGEN_MODEL").filter(|m| !m.is_empty()) {
            self.model = model;
        }

        if let Some(base_url) = lookup("GEMMA_CODEGEN_BASE_URL").filter(|u| !u.is_empty()) {
            self.base_url = base_url;
        }

        if let Some(raw) = lookup("GEMMA_CODEGEN_TEMPERATURE") {
            match raw.trim().parse::<f32>() {
                Ok(temperature) => self.temperature = temperature,
                Err(_) => warn!("Ignoring invalid GEMMA_CODEGEN_TEMPERATURE value: {}", raw),
            }
        }

        if lookup("GEMMA_CODEGEN_USE_MOCK").is_some() {
            self.use_mock = true;
        }
    }

    /// Command-line values win over file and environment.
    pub fn apply_overrides(
        &mut self,
        language: Option<&str>,
        model: Option<&str>,
        temperature: Option<f32>,
    ) {
        if let Some(language) = language {
            self.language = language.to_string();
        }
        if let Some(model) = model {
            self.model = model.to_string();
        }
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".gemma-codegen"))
    }

    /// Reads the credential from the process environment.
    ///
    /// An empty value is treated the same as an unset one.
    pub fn api_key() -> Option<String> {
        Self::api_key_from(|key| std::env::var(key).ok())
    }

    pub fn api_key_from<F>(lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(API_KEY_VAR).filter(|key| !key.trim().is_empty())
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }

    pub fn show_config_info(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        println!("Configuration file: {}", config_path.display());

        if config_path.exists() {
            println!("Status: Found");
        } else {
            println!("Status: Not found (using defaults)");
        }

        println!("Model: {}", self.model);
        println!("Temperature: {}", self.temperature);
        println!("Language: {}", self.language);
        println!("Endpoint: {}", self.base_url);
        println!("Mock mode: {}", self.use_mock);
        println!(
            "API Key ({}): {}",
            API_KEY_VAR,
            if Self::api_key().is_some() { "Set" } else { "Not set" }
        );

        println!("\nTo set API key:");
        println!("  export {}=<your-key>", API_KEY_VAR);

        Ok(())
    }
}
