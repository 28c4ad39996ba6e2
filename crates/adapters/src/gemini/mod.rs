//! Google Gemini model adapters
//!
//! `text` generates the ad copy, `image` generates the promotional image.
//! Prompt construction and response parsing live here so they can be tested
//! without a network.

pub mod image;
pub mod text;

pub use image::GeminiImageModel;
pub use text::GeminiContentModel;

use serde::{Deserialize, Serialize};

use ad_poster_domain::{AppInfo, Platform, PlatformSettings};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Common Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Text model name/ID
    pub text_model: String,
    /// Image model name/ID
    pub image_model: String,
    /// Temperature (0.0-2.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            temperature: 1.0,
            max_output_tokens: 2048,
            timeout_secs: 30,
        }
    }
}

/// The five fields the model is instructed to return
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AdFields {
    pub headline: String,
    pub body_text: String,
    pub hashtags: Vec<String>,
    pub call_to_action: String,
    pub suggested_image_description: String,
}

/// Build the ad-copy prompt for one platform
pub fn build_ad_prompt(app: &AppInfo, platform: Platform, settings: &PlatformSettings) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Create a compelling social media ad for {} promoting an Android app with the following details:\n\n",
        platform
    ));

    prompt.push_str(&format!("App Name: {}\n", app.name));
    prompt.push_str(&format!("Description: {}\n", app.description));
    prompt.push_str(&format!("Category: {}\n", app.category));
    prompt.push_str(&format!("Key Features: {}\n", app.key_features.join(", ")));
    prompt.push_str(&format!("Target Audience: {}\n", app.target_audience));
    prompt.push_str(&format!("App URL: {}\n", app.app_url));
    prompt.push_str(&format!("App guide: [{}]\n\n", app.guide));

    prompt.push_str("Platform Requirements:\n");
    prompt.push_str(&format!(
        "- Maximum characters allowed: {}\n",
        settings.max_chars
    ));
    prompt.push_str(&format!(
        "- Maximum number of hashtags: {}\n",
        settings.hashtag_limit
    ));
    prompt.push_str(&format!("- Platform: {}\n\n", platform));

    prompt.push_str(&format!(
        r#"Please provide:
1. An attention-grabbing headline (max 60 characters).
2. Engaging body text that highlights the app's key benefits and appeals to the target audience.
3. Relevant hashtags (max {hashtag_limit}, concise and trending where possible).
4. A strong, clear call-to-action that encourages immediate engagement (e.g., download, try now, explore).
5. A suggested promotional image description - must be a purely visual concept, without any text, logos, or overlays.

Respond with ONLY a JSON object matching this exact structure:
{{
    "headline": "Your headline here",
    "body_text": "Your body text here",
    "hashtags": ["hashtag1", "hashtag2", "hashtag3"],
    "call_to_action": "Your CTA here",
    "suggested_image_description": "Purely visual description of promotional image, no text or logos"
}}

Make the content engaging, benefit-focused, and aligned with what performs best on {platform}.
"#,
        hashtag_limit = settings.hashtag_limit,
        platform = platform,
    ));

    prompt
}

/// Parse the model's ad-copy response JSON
pub fn parse_ad_response(response: &str) -> Result<AdFields, String> {
    // The model usually wraps the object in a markdown fence; tolerate both
    let json_str = extract_json(response);

    serde_json::from_str(json_str).map_err(|e| format!("Failed to parse JSON: {}", e))
}

/// Extract JSON from a response (handles markdown code blocks)
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    // Check for ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return trimmed[start + 7..start + 7 + end].trim();
        }
    }

    // Check for ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let content = trimmed[start + 3..start + 3 + end].trim();
            // Skip language identifier if present
            if let Some(newline) = content.find('\n') {
                let first_line = &content[..newline];
                if !first_line.starts_with('{') {
                    return content[newline + 1..].trim();
                }
            }
            return content;
        }
    }

    // Assume raw JSON
    trimmed
}
