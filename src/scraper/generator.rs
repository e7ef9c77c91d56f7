use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::{API_KEY_ENV, GenerationSettings};
use crate::error::GenerationError;

const TEXT_PLACEHOLDER: &str = "{text}";

/// A hosted text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Wraps the draft in an optional instructional template.
pub fn render_prompt(template: Option<&str>, text: &str) -> String {
    match template {
        Some(template) if template.contains(TEXT_PLACEHOLDER) => {
            template.replace(TEXT_PLACEHOLDER, text)
        }
        Some(template) if !template.trim().is_empty() => format!("{}\n\n{text}", template.trim_end()),
        _ => text.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct GenerateTextRequest<'a> {
    prompt: TextPrompt<'a>,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    candidate_count: u32,
}

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateTextResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    output: String,
}

/// Client for the PaLM `generateText` endpoint.
pub struct PalmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    settings: GenerationSettings,
}

impl PalmClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            settings,
        })
    }
}

#[async_trait]
impl TextGenerator for PalmClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey(API_KEY_ENV))?;

        let request = GenerateTextRequest {
            prompt: TextPrompt { text: prompt },
            temperature: self.settings.temperature,
            top_k: self.settings.top_k,
            top_p: self.settings.top_p,
            candidate_count: self.settings.candidate_count,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateTextResponse = serde_json::from_str(&body)?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyCandidates)?;
        if candidate.output.trim().is_empty() {
            return Err(GenerationError::EmptyOutput);
        }

        Ok(candidate.output)
    }
}
