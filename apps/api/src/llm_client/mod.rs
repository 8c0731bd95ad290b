//! LLM Client — the single point of entry for all Gemini API calls in PersonaPost.
//!
//! ARCHITECTURAL RULE: No other module may call the provider directly.
//! Handlers and the generation flow talk to the `ContentProvider` trait.
//!
//! Models are hardcoded; only the base URL is configurable.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::content::GeneratedImage;
use crate::models::profile::UserProfile;

pub mod prompts;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Model used for post text.
pub const TEXT_MODEL: &str = "gemini-2.0-flash";
/// Model used for post images. Must support the IMAGE response modality.
pub const IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

const TOP_P: f32 = 0.95;
const TOP_K: u32 = 60;
const IMAGE_TEMPERATURE: f32 = 0.9;
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const GENERIC_TEXT_FAILURE: &str = "Failed to generate text content";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API Error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The provider answered without a usable candidate. Carries the provider's
    /// own message when it sent one.
    #[error("{0}")]
    Generation(String),

    #[error("Unexpected API response structure")]
    MalformedResponse,

    #[error("No image data found in response")]
    NoImageData,
}

/// Anything that can write post text and images. `LlmClient` in production,
/// stubs in tests.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn generate_text(
        &self,
        prompt: &str,
        profile: &UserProfile,
        temperature: f32,
    ) -> Result<String, LlmError>;

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, if the envelope has that shape.
    fn into_first_parts(self) -> Option<Vec<ResponsePart>> {
        self.candidates?.into_iter().next()?.content?.parts
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini REST client. One attempt per call; no retry and no client-side timeout.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }

    async fn send(
        &self,
        model: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(redact)?;

        debug!("Provider call to {model} returned {}", response.status());
        Ok(response)
    }
}

#[async_trait]
impl ContentProvider for LlmClient {
    async fn generate_text(
        &self,
        prompt: &str,
        profile: &UserProfile,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let persona = prompts::build_persona_instruction(profile);
        let request = GenerateContentRequest {
            contents: vec![
                Content {
                    role: Some("user"),
                    parts: vec![TextPart { text: &persona }],
                },
                Content {
                    role: Some("user"),
                    parts: vec![TextPart { text: prompt }],
                },
            ],
            generation_config: GenerationConfig {
                temperature,
                top_p: Some(TOP_P),
                top_k: Some(TOP_K),
                response_modalities: None,
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        };

        let response = self.send(TEXT_MODEL, &request).await?;
        let status = response.status();
        let body = response.text().await.map_err(redact)?;

        // The envelope is inspected regardless of status: error bodies carry
        // `error.message`, which is what the caller should see.
        let parsed: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(LlmError::Parse(e)),
            Err(_) => {
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        };

        extract_text(parsed)
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, LlmError> {
        let image_prompt = prompts::build_image_prompt(prompt);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![TextPart {
                    text: &image_prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: IMAGE_TEMPERATURE,
                top_p: None,
                top_k: None,
                response_modalities: Some(vec!["TEXT", "IMAGE"]),
            },
            safety_settings: Vec::new(),
        };

        let response = self.send(IMAGE_MODEL, &request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.map_err(redact)?;
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(redact)?;
        extract_image(parsed)
    }
}

/// Request URLs carry the API key; keep them out of error text.
fn redact(err: reqwest::Error) -> LlmError {
    LlmError::Http(err.without_url())
}

/// First candidate's first part, which must carry non-empty text.
fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    let provider_message = response.error.as_ref().and_then(|e| e.message.clone());

    response
        .into_first_parts()
        .and_then(|parts| parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            LlmError::Generation(
                provider_message.unwrap_or_else(|| GENERIC_TEXT_FAILURE.to_string()),
            )
        })
}

/// First inline `image/*` part of the first candidate, as base64 data.
fn extract_image(response: GenerateContentResponse) -> Result<GeneratedImage, LlmError> {
    let parts = response
        .into_first_parts()
        .ok_or(LlmError::MalformedResponse)?;

    parts
        .into_iter()
        .filter_map(|part| part.inline_data)
        .find(|data| data.mime_type.starts_with("image/"))
        .map(|data| GeneratedImage {
            mime_type: data.mime_type,
            data: data.data,
        })
        .ok_or(LlmError::NoImageData)
}
