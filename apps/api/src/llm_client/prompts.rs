// Prompt fragments sent to the provider. The persona preamble travels as its own
// message part, ahead of the user's raw prompt.

use crate::models::profile::UserProfile;

/// Rendered in place of any empty profile field.
pub const MISSING_FIELD: &str = "N/A";

pub const PERSONA_TEMPLATE: &str = "\
You are a professional social media content creator. Generate polished posts with clean formatting.
    User Profile:
    - Interests: {interests}
    - Profession: {profession}
    - Hobbies: {hobbies}
    - Content Themes: {themes}
    Guidelines:
- Use professional but engaging language
- Format with clean line breaks and bullet points when appropriate
- Never use asterisks for emphasis
- Use emojis sparingly (1-2 per post max)
- Include relevant hashtags at the end";

pub const IMAGE_PROMPT_PREFIX: &str = "Generate a social media post image based on: ";

pub fn build_persona_instruction(profile: &UserProfile) -> String {
    let profession = if profile.profession.is_empty() {
        MISSING_FIELD
    } else {
        profile.profession.as_str()
    };

    PERSONA_TEMPLATE
        .replace("{interests}", &join_or_missing(&profile.interests))
        .replace("{profession}", profession)
        .replace("{hobbies}", &join_or_missing(&profile.hobbies))
        .replace("{themes}", &join_or_missing(&profile.preferred_content_themes))
}

pub fn build_image_prompt(prompt: &str) -> String {
    format!("{IMAGE_PROMPT_PREFIX}{prompt}")
}

fn join_or_missing(items: &[String]) -> String {
    if items.is_empty() {
        MISSING_FIELD.to_string()
    } else {
        items.join(", ")
    }
}
