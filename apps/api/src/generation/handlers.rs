//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{json_or_default, AppError};
use crate::generation::orchestrator::{generate_image_for_post, generate_text_variations};
use crate::llm_client::ContentProvider;
use crate::models::content::TextVariation;
use crate::models::profile::UserProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextVariationsRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_message: Option<String>,
    /// Missing profile data renders every persona field as "N/A".
    #[serde(default)]
    pub profile_data: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct TextVariationsResponse {
    pub variations: Vec<TextVariation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub image_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-text-variations
///
/// Three variations of a post at temperatures 0.7, 0.8, 0.6, scored 1.0, 0.9, 0.8.
pub async fn handle_generate_text_variations(
    State(state): State<AppState>,
    body: Result<Json<TextVariationsRequest>, JsonRejection>,
) -> Result<Json<TextVariationsResponse>, AppError> {
    let request = json_or_default(body)?;
    let user_message = required(request.user_message, "User message is required")?;
    let llm = provider(&state)?;
    let profile = request.profile_data.unwrap_or_default();

    let result = generate_text_variations(
        llm,
        &state.audit,
        request.user_id.as_deref(),
        &user_message,
        &profile,
    )
    .await
    .map_err(|e| AppError::failed("Error generating text variations", e))?;

    Ok(Json(TextVariationsResponse {
        variations: result.value,
        audit_error: result.audit_error,
    }))
}

/// POST /api/generate-image
///
/// Image for a chosen post, returned inline as a data URI.
pub async fn handle_generate_image(
    State(state): State<AppState>,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<ImageResponse>, AppError> {
    let request = json_or_default(body)?;
    let image_prompt = required(request.image_prompt, "Image prompt is required")?;
    let llm = provider(&state)?;

    let result = generate_image_for_post(llm, &state.audit, request.user_id.as_deref(), &image_prompt)
        .await
        .map_err(|e| AppError::failed("Error generating image", e))?;

    Ok(Json(ImageResponse {
        kind: "image",
        url: result.value,
        audit_error: result.audit_error,
    }))
}

/// Missing or empty is rejected; whitespace is passed through to the provider.
fn required(field: Option<String>, message: &str) -> Result<String, AppError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

fn provider(state: &AppState) -> Result<&dyn ContentProvider, AppError> {
    state
        .llm
        .as_deref()
        .ok_or_else(|| AppError::Configuration("GEMINI_API_KEY is not configured".to_string()))
}
