use anyhow::{anyhow, Result};
use serde::Deserialize;
use web_sys::window;

use crate::models::ModelOption;

const CONFIG_ELEMENT_ID: &str = "app-config";

#[derive(Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct AppConfig {
    /// Origin every endpoint path is joined to. Empty means the page origin.
    pub api_base: String,
    pub default_model: String,
    pub models: Vec<ModelOption>,
    pub banner_timeout_ms: u32,
    pub theme_storage_key: String,
    pub theme_transition_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            default_model: "openai/gpt-3.5-turbo".to_string(),
            models: vec![
                ModelOption { id: "openai/gpt-3.5-turbo".into(), label: "GPT-3.5 Turbo".into() },
                ModelOption { id: "openai/gpt-4o-mini".into(), label: "GPT-4o mini".into() },
                ModelOption { id: "anthropic/claude-3-haiku".into(), label: "Claude 3 Haiku".into() },
                ModelOption { id: "google/gemini-1.5-flash".into(), label: "Gemini 1.5 Flash".into() },
            ],
            banner_timeout_ms: 5000,
            theme_storage_key: "cyberchat-theme".to_string(),
            theme_transition_ms: 300,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut config: AppConfig = serde_json::from_str(raw)?;
        if config.models.is_empty() {
            config.models = AppConfig::default().models;
        }
        Ok(config)
    }

    /// Reads the optional JSON block embedded in the page and fills in the
    /// page origin when no explicit API base is configured.
    pub fn load() -> Self {
        let mut config = match Self::embedded_json().and_then(|raw| Self::from_json(&raw)) {
            Ok(config) => config,
            Err(err) => {
                log::debug!("using default config: {}", err);
                AppConfig::default()
            }
        };

        if config.api_base.is_empty() {
            match page_origin() {
                Ok(origin) => config.api_base = origin,
                Err(err) => log::warn!("could not resolve page origin: {}", err),
            }
        }
        config
    }

    fn embedded_json() -> Result<String> {
        let document = window()
            .and_then(|w| w.document())
            .ok_or_else(|| anyhow!("no document"))?;
        let element = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .ok_or_else(|| anyhow!("no #{} element", CONFIG_ELEMENT_ID))?;
        element
            .text_content()
            .ok_or_else(|| anyhow!("#{} is empty", CONFIG_ELEMENT_ID))
    }
}

fn page_origin() -> Result<String> {
    let window = window().ok_or_else(|| anyhow!("no window"))?;
    window
        .location()
        .origin()
        .map_err(|e| anyhow!("{:?}", e))
}
