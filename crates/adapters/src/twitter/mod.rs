//! Twitter/X publisher
//!
//! Two credential contexts are required at the same time: media upload goes
//! through the v1.1 endpoint under OAuth 1.0a user-context signing, while
//! tweet creation and replies use the v2 endpoint under an OAuth2 user
//! bearer token.

mod oauth1;

pub use oauth1::{OAuth1Credentials, OAuth1Signer};

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ad_poster_domain::{AdPublisher, MediaRef, Platform, PostDraft, PublishError};

use crate::media::content_type_for_path;

const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";
const DEFAULT_UPLOAD_BASE_URL: &str = "https://upload.twitter.com";

pub struct TwitterPublisher {
    client: Client,
    oauth1: OAuth1Signer,
    bearer_token: SecretString,
    api_base_url: String,
    upload_base_url: String,
    authenticated: AtomicBool,
}

impl TwitterPublisher {
    pub fn new(oauth1_credentials: OAuth1Credentials, bearer_token: SecretString) -> Self {
        Self::with_base_urls(
            oauth1_credentials,
            bearer_token,
            DEFAULT_API_BASE_URL.to_string(),
            DEFAULT_UPLOAD_BASE_URL.to_string(),
        )
    }

    pub fn with_base_urls(
        oauth1_credentials: OAuth1Credentials,
        bearer_token: SecretString,
        api_base_url: String,
        upload_base_url: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            oauth1: OAuth1Signer::new(oauth1_credentials),
            bearer_token,
            api_base_url,
            upload_base_url,
            authenticated: AtomicBool::new(false),
        }
    }

    fn ensure_authenticated(&self) -> Result<(), PublishError> {
        if !self.authenticated.load(Ordering::Acquire) {
            return Err(PublishError::Authentication(
                "not authenticated: call authenticate() first".to_string(),
            ));
        }
        Ok(())
    }

    async fn create_tweet(&self, request: &CreateTweetRequest) -> Result<String, PublishError> {
        let url = format!("{}/2/tweets", self.api_base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.bearer_token.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Publish("tweet request timed out".to_string())
                } else {
                    PublishError::Publish(e.to_string())
                }
            })?;

        if response.status() == 401 {
            return Err(PublishError::Authentication(
                "Twitter rejected the bearer token".to_string(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Publish(format!(
                "Twitter HTTP error: {status} - {body}"
            )));
        }

        let tweet: CreateTweetResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        Ok(tweet.data.id)
    }
}

#[derive(Serialize)]
struct CreateTweetRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings>,
}

#[derive(Serialize)]
struct TweetMedia {
    media_ids: Vec<String>,
}

#[derive(Serialize)]
struct ReplySettings {
    in_reply_to_tweet_id: String,
}

#[derive(Deserialize)]
struct CreateTweetResponse {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[async_trait]
impl AdPublisher for TwitterPublisher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn authenticate(&self) -> Result<(), PublishError> {
        if !self.oauth1.credentials().is_complete() {
            return Err(PublishError::Authentication(
                "missing Twitter OAuth1 credentials".to_string(),
            ));
        }
        if self.bearer_token.expose_secret().is_empty() {
            return Err(PublishError::Authentication(
                "missing Twitter bearer token".to_string(),
            ));
        }
        self.authenticated.store(true, Ordering::Release);
        Ok(())
    }

    /// v1.1 media upload, OAuth 1.0a signed
    async fn upload_media(&self, path: &Path) -> Result<MediaRef, PublishError> {
        self.ensure_authenticated()?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PublishError::MediaUpload(format!("failed to read {}: {e}", path.display()))
        })?;
        if bytes.is_empty() {
            return Err(PublishError::MediaUpload(format!(
                "{} is empty",
                path.display()
            )));
        }

        let url = format!("{}/1.1/media/upload.json", self.upload_base_url);
        // Multipart bodies contribute no parameters to the signature
        let authorization = self.oauth1.authorization_header("POST", &url, &[]);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media.jpg".to_string());
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type_for_path(path))
            .map_err(|e| PublishError::MediaUpload(e.to_string()))?;
        let form = multipart::Form::new().part("media", part);

        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .multipart(form)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::MediaUpload("media upload timed out".to_string())
                } else {
                    PublishError::MediaUpload(e.to_string())
                }
            })?;

        if response.status() == 401 {
            return Err(PublishError::Authentication(
                "Twitter rejected the OAuth1 credentials".to_string(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::MediaUpload(format!(
                "media upload returned {status}: {body}"
            )));
        }

        let uploaded: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::MediaUpload(e.to_string()))?;

        Ok(MediaRef::MediaId(uploaded.media_id_string))
    }

    /// v2 tweet creation, bearer-token authorized
    async fn publish(&self, draft: &PostDraft<'_>) -> Result<String, PublishError> {
        self.ensure_authenticated()?;

        let media = match draft.media {
            Some(MediaRef::MediaId(id)) => Some(TweetMedia {
                media_ids: vec![id.clone()],
            }),
            Some(other) => {
                return Err(PublishError::Publish(format!(
                    "unsupported media reference for Twitter: {other:?}"
                )));
            }
            None => None,
        };

        self.create_tweet(&CreateTweetRequest {
            text: draft.text.to_string(),
            media,
            reply: None,
        })
        .await
    }

    async fn reply(&self, post_id: &str, text: &str) -> Result<String, PublishError> {
        self.ensure_authenticated()?;

        self.create_tweet(&CreateTweetRequest {
            text: text.to_string(),
            media: None,
            reply: Some(ReplySettings {
                in_reply_to_tweet_id: post_id.to_string(),
            }),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> OAuth1Credentials {
        OAuth1Credentials {
            consumer_key: "consumer".to_string(),
            consumer_secret: SecretString::new("consumer-secret".into()),
            access_token: "token".to_string(),
            access_token_secret: SecretString::new("token-secret".into()),
        }
    }

    fn publisher(api_url: String, upload_url: String) -> TwitterPublisher {
        TwitterPublisher::with_base_urls(
            credentials(),
            SecretString::new("bearer-token".into()),
            api_url,
            upload_url,
        )
    }

    #[tokio::test]
    async fn publish_posts_text_with_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header("Authorization", "Bearer bearer-token"))
            .and(body_json(serde_json::json!({
                "text": "Punchy ad copy"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": { "id": "tweet1" }
            })))
            .mount(&mock_server)
            .await;

        let publisher = publisher(mock_server.uri(), "http://unused".to_string());
        publisher.authenticate().await.unwrap();

        let draft = PostDraft {
            text: "Punchy ad copy",
            link: None,
            media: None,
        };
        let id = publisher.publish(&draft).await.unwrap();
        assert_eq!(id, "tweet1");
    }

    #[tokio::test]
    async fn publish_attaches_media_ids() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(body_json(serde_json::json!({
                "text": "With picture",
                "media": { "media_ids": ["media42"] }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": { "id": "tweet2" }
            })))
            .mount(&mock_server)
            .await;

        let publisher = publisher(mock_server.uri(), "http://unused".to_string());
        publisher.authenticate().await.unwrap();

        let media = MediaRef::MediaId("media42".to_string());
        let draft = PostDraft {
            text: "With picture",
            link: None,
            media: Some(&media),
        };
        assert_eq!(publisher.publish(&draft).await.unwrap(), "tweet2");
    }

    #[tokio::test]
    async fn upload_media_is_oauth1_signed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1.1/media/upload.json"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "media_id": 710511363345354753_i64,
                "media_id_string": "710511363345354753"
            })))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("ad.png");
        std::fs::write(&image_path, b"pngdata").unwrap();

        let publisher = publisher("http://unused".to_string(), mock_server.uri());
        publisher.authenticate().await.unwrap();

        let media = publisher.upload_media(&image_path).await.unwrap();
        assert_eq!(media, MediaRef::MediaId("710511363345354753".to_string()));

        let requests = mock_server.received_requests().await.unwrap();
        let auth = requests[0].headers.get("Authorization").unwrap();
        assert!(auth.to_str().unwrap().starts_with("OAuth "));
    }

    #[tokio::test]
    async fn reply_threads_onto_the_tweet() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(body_json(serde_json::json!({
                "text": "Get the app on Google Play: https://example.com",
                "reply": { "in_reply_to_tweet_id": "tweet1" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": { "id": "tweet3" }
            })))
            .mount(&mock_server)
            .await;

        let publisher = publisher(mock_server.uri(), "http://unused".to_string());
        publisher.authenticate().await.unwrap();

        let id = publisher
            .reply("tweet1", "Get the app on Google Play: https://example.com")
            .await
            .unwrap();
        assert_eq!(id, "tweet3");
    }

    #[tokio::test]
    async fn incomplete_credentials_fail_authentication() {
        let publisher = TwitterPublisher::with_base_urls(
            OAuth1Credentials {
                consumer_key: String::new(),
                consumer_secret: SecretString::new("".into()),
                access_token: String::new(),
                access_token_secret: SecretString::new("".into()),
            },
            SecretString::new("bearer".into()),
            "http://unused".to_string(),
            "http://unused".to_string(),
        );

        assert!(matches!(
            publisher.authenticate().await,
            Err(PublishError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn unauthenticated_calls_fail_without_network() {
        let mock_server = MockServer::start().await;
        let publisher = publisher(mock_server.uri(), mock_server.uri());

        let draft = PostDraft {
            text: "text",
            link: None,
            media: None,
        };
        assert!(matches!(
            publisher.publish(&draft).await,
            Err(PublishError::Authentication(_))
        ));
        assert!(matches!(
            publisher.upload_media(Path::new("a.png")).await,
            Err(PublishError::Authentication(_))
        ));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
