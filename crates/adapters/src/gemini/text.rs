//! Gemini text model adapter for ad-copy generation

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

use ad_poster_domain::{
    AdContent, AppInfo, ContentError, ContentModel, Platform, PlatformSettings,
};

use super::{DEFAULT_BASE_URL, GeminiConfig, build_ad_prompt, parse_ad_response};

pub struct GeminiContentModel {
    client: Client,
    api_key: SecretString,
    config: GeminiConfig,
    base_url: String,
}

impl GeminiContentModel {
    pub fn new(api_key: SecretString, config: GeminiConfig) -> Self {
        Self::with_base_url(api_key, config, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: SecretString, config: GeminiConfig, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            config,
            base_url,
        }
    }

    async fn call_api(&self, prompt: &str) -> Result<String, ContentError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: Some(self.config.max_output_tokens),
            }),
            system_instruction: Some(SystemInstruction {
                parts: vec![Part {
                    text: "You are a social media advertising copywriter. Output only valid JSON."
                        .to_string(),
                }],
            }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.config.text_model,
            self.api_key.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ContentError::Timeout
                } else {
                    ContentError::Api(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ContentError::InvalidFormat(e.to_string()))?;

        if let Some(feedback) = api_response.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                return Err(ContentError::Blocked(format!(
                    "safety filters blocked the prompt: {reason}"
                )));
            }
        }

        // The contract is the first candidate's first text part
        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|p| p.text);

        match text {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ContentError::Blocked(
                "response carried no candidates".to_string(),
            )),
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "systemInstruction")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxOutputTokens")]
    max_output_tokens: Option<u32>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[async_trait]
impl ContentModel for GeminiContentModel {
    async fn generate_ad(
        &self,
        app: &AppInfo,
        platform: Platform,
        settings: &PlatformSettings,
    ) -> Result<AdContent, ContentError> {
        let prompt = build_ad_prompt(app, platform, settings);
        tracing::info!(%platform, model = %self.config.text_model, "Generating ad content");

        let response_text = self.call_api(&prompt).await?;
        let fields = parse_ad_response(&response_text).map_err(ContentError::InvalidFormat)?;

        Ok(AdContent {
            platform,
            app_url: app.app_url.clone(),
            headline: fields.headline,
            body_text: fields.body_text,
            hashtags: fields.hashtags,
            call_to_action: fields.call_to_action,
            suggested_image_description: fields.suggested_image_description,
            timestamp: OffsetDateTime::now_utc(),
            image_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_poster_domain::PlatformCatalog;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_app() -> AppInfo {
        AppInfo {
            name: "Illusion of Mastery".to_string(),
            description: "Turn any keyword into a quiz".to_string(),
            category: "Education".to_string(),
            key_features: vec!["Ad free".to_string()],
            guide: String::new(),
            target_audience: "People aged 13-60".to_string(),
            app_url: "https://play.google.com/store/apps/details?id=com.example.iom".to_string(),
            icon_path: None,
            screenshots: None,
        }
    }

    fn model(base_url: String) -> GeminiContentModel {
        GeminiContentModel::with_base_url(
            SecretString::new("test-key".into()),
            GeminiConfig::default(),
            base_url,
        )
    }

    fn fenced_response() -> serde_json::Value {
        let text = r##"```json
{
    "headline": "Stop guessing. Start knowing.",
    "body_text": "Type a keyword, get a quiz. 🧠",
    "hashtags": ["#learning", "#quiz"],
    "call_to_action": "Try it now",
    "suggested_image_description": "A glowing lightbulb above an open book"
}
```"##;
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    #[tokio::test]
    async fn generates_ad_content_from_fenced_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-2.5-flash:generateContent",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(fenced_response()))
            .mount(&mock_server)
            .await;

        let catalog = PlatformCatalog::builtin();
        let model = model(mock_server.uri());

        let content = model
            .generate_ad(
                &sample_app(),
                Platform::Facebook,
                catalog.get(Platform::Facebook).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(content.platform, Platform::Facebook);
        assert_eq!(content.headline, "Stop guessing. Start knowing.");
        assert_eq!(content.body_text, "Type a keyword, get a quiz. 🧠");
        assert_eq!(content.hashtags, vec!["#learning", "#quiz"]);
        assert_eq!(content.app_url, sample_app().app_url);
        assert!(content.image_path.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_an_invalid_format_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-2.5-flash:generateContent",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "```json\nnot json\n```" }] }
                }]
            })))
            .mount(&mock_server)
            .await;

        let catalog = PlatformCatalog::builtin();
        let model = model(mock_server.uri());

        let err = model
            .generate_ad(
                &sample_app(),
                Platform::Twitter,
                catalog.get(Platform::Twitter).unwrap(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn safety_block_is_reported_as_blocked() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-2.5-flash:generateContent",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [],
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&mock_server)
            .await;

        let catalog = PlatformCatalog::builtin();
        let model = model(mock_server.uri());

        let err = model
            .generate_ad(
                &sample_app(),
                Platform::Twitter,
                catalog.get(Platform::Twitter).unwrap(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Blocked(_)));
    }

    #[tokio::test]
    async fn empty_candidate_list_is_blocked() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-2.5-flash:generateContent",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&mock_server)
            .await;

        let catalog = PlatformCatalog::builtin();
        let model = model(mock_server.uri());

        let err = model
            .generate_ad(
                &sample_app(),
                Platform::Bluesky,
                catalog.get(Platform::Bluesky).unwrap(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Blocked(_)));
    }
}
