use crate::config::{Config, ProviderSettings};
use crate::providers::{Prompt, ProviderAdapter, ProviderFailure, ProviderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

fn text_content(text: &str) -> Content {
    Content {
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

/// Adapter for Google's Gemini `generateContent` endpoint.
///
/// `api_url` is the API base; the model path is appended per request.
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    settings: ProviderSettings,
    max_tokens: u32,
}

impl GeminiAdapter {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self::with_settings(client, config.gemini.clone(), config.provider_max_tokens)
    }

    pub fn with_settings(client: reqwest::Client, settings: ProviderSettings, max_tokens: u32) -> Self {
        Self {
            client,
            settings,
            max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderFailure> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderFailure::NotConfigured(ProviderId::Gemini))?;

        let request = GenerateRequest {
            contents: vec![text_content(&prompt.user)],
            system_instruction: prompt.system.as_deref().map(text_content),
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(ProviderFailure::transport)?;

        if !response.status().is_success() {
            return Err(ProviderFailure::from_response(response).await);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::Parse(e.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().find_map(|p| p.text))
            .ok_or(ProviderFailure::Empty)
    }
}
