use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/scrape_talk.json";

/// Environment variable holding the generation API key.
pub const API_KEY_ENV: &str = "PALM_API_KEY";

const DEFAULT_GENERATION_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta3/models/text-bison-001:generateText";
const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_generation_endpoint")]
    pub generation_endpoint: String,
    #[serde(default = "default_youtube_base_url")]
    pub youtube_base_url: String,
    #[serde(default = "default_caption_language")]
    pub caption_language: String,
    /// Wraps the draft before it is sent; `{text}` marks where it goes.
    #[serde(default)]
    pub prompt_template: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub generation: GenerationSettings,
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub candidate_count: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.25,
            top_k: 40,
            top_p: 0.95,
            candidate_count: 1,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation_endpoint: default_generation_endpoint(),
            youtube_base_url: default_youtube_base_url(),
            caption_language: default_caption_language(),
            prompt_template: None,
            request_timeout_secs: default_request_timeout_secs(),
            generation: GenerationSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn default_generation_endpoint() -> String {
    DEFAULT_GENERATION_ENDPOINT.to_string()
}

fn default_youtube_base_url() -> String {
    DEFAULT_YOUTUBE_BASE_URL.to_string()
}

fn default_caption_language() -> String {
    "en".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|err| {
            log::warn!("Failed to parse config file {}: {err}", path.display());
            AppConfig::default()
        }),
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

fn parse_config(content: &str) -> serde_json::Result<AppConfig> {
    serde_json::from_str::<AppConfig>(content)
}

/// Reads the API key from the environment (after `.env` has been loaded).
pub fn api_key_from_env() -> Option<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        _ => None,
    }
}
