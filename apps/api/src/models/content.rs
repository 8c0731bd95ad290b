use serde::{Deserialize, Serialize};

/// One candidate post produced at a given temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextVariation {
    pub content: String,
    /// Positional placeholder in [0, 1]; not a quality signal.
    pub score: f64,
}

/// Inline image bytes returned by the provider, still base64-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: String,
}

impl GeneratedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Payload stored in `generated_content.generated_response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratedResponse {
    TextVariations { variations: Vec<TextVariation> },
    Image { url: String },
}

/// Audit row written once per successful generation. Never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContentRecord {
    pub user_id: Option<String>,
    pub prompt_text: String,
    pub generated_response: GeneratedResponse,
}
