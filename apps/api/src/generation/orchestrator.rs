//! Generation flow — turns a prompt and profile into scored post variations, and a
//! chosen post into an image, recording each success in the audit log.
//!
//! Flow (text): 3 concurrent provider calls → positional scores → audit → return.
//! Flow (image): provider image call → data URI → audit → return.

use tracing::info;

use crate::generation::audit::AuditLog;
use crate::llm_client::{ContentProvider, LlmError};
use crate::models::content::{GeneratedContentRecord, GeneratedResponse, TextVariation};
use crate::models::profile::UserProfile;

/// One provider call per entry, in this order. Not configurable.
pub const VARIATION_TEMPERATURES: [f32; 3] = [0.7, 0.8, 0.6];

/// A generation result plus, under the `report` audit policy, why it was not recorded.
#[derive(Debug, Clone)]
pub struct Audited<T> {
    pub value: T,
    pub audit_error: Option<String>,
}

/// Produces three variations concurrently. Any single failure fails the whole call;
/// no partial results are returned.
pub async fn generate_text_variations(
    llm: &dyn ContentProvider,
    audit: &AuditLog,
    user_id: Option<&str>,
    prompt: &str,
    profile: &UserProfile,
) -> Result<Audited<Vec<TextVariation>>, LlmError> {
    let [first, second, third] = VARIATION_TEMPERATURES;

    let (a, b, c) = tokio::try_join!(
        llm.generate_text(prompt, profile, first),
        llm.generate_text(prompt, profile, second),
        llm.generate_text(prompt, profile, third),
    )?;

    let variations = score_variations(vec![a, b, c]);
    info!(
        "Generated {} text variations for user {}",
        variations.len(),
        user_id.unwrap_or("<anonymous>")
    );

    let audit_error = audit
        .record(GeneratedContentRecord {
            user_id: user_id.map(str::to_string),
            prompt_text: prompt.to_string(),
            generated_response: GeneratedResponse::TextVariations {
                variations: variations.clone(),
            },
        })
        .await;

    Ok(Audited {
        value: variations,
        audit_error,
    })
}

/// Generates an image for a chosen post and returns it as a data URI.
pub async fn generate_image_for_post(
    llm: &dyn ContentProvider,
    audit: &AuditLog,
    user_id: Option<&str>,
    image_prompt: &str,
) -> Result<Audited<String>, LlmError> {
    let image = llm.generate_image(image_prompt).await?;
    let url = image.data_uri();
    info!(
        "Generated {} image for user {}",
        image.mime_type,
        user_id.unwrap_or("<anonymous>")
    );

    let audit_error = audit
        .record(GeneratedContentRecord {
            user_id: user_id.map(str::to_string),
            prompt_text: image_prompt.to_string(),
            generated_response: GeneratedResponse::Image { url: url.clone() },
        })
        .await;

    Ok(Audited {
        value: url,
        audit_error,
    })
}

/// Score `1 - 0.1 * index`: a placeholder ranking by call order.
fn score_variations(contents: Vec<String>) -> Vec<TextVariation> {
    contents
        .into_iter()
        .enumerate()
        .map(|(index, content)| TextVariation {
            content,
            score: 1.0 - 0.1 * index as f64,
        })
        .collect()
}
