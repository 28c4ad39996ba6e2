//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Twitter's v1.1 media upload endpoint still requires OAuth 1.0a
//! user-context signatures, while v2 posting uses a bearer token. This module
//! implements the signature base-string construction and HMAC-SHA1 signing
//! from RFC 5849 for the upload call.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use time::OffsetDateTime;

/// RFC 3986 unreserved characters stay literal; everything else is escaped
const STRICT_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, STRICT_ENCODE).to_string()
}

/// OAuth 1.0a user-context credential tuple
#[derive(Clone)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: SecretString,
    pub access_token: String,
    pub access_token_secret: SecretString,
}

impl OAuth1Credentials {
    pub fn is_complete(&self) -> bool {
        !self.consumer_key.is_empty()
            && !self.consumer_secret.expose_secret().is_empty()
            && !self.access_token.is_empty()
            && !self.access_token_secret.expose_secret().is_empty()
    }
}

/// Signs requests with HMAC-SHA1 in the OAuth 1.0a user context
pub struct OAuth1Signer {
    credentials: OAuth1Credentials,
}

impl OAuth1Signer {
    pub fn new(credentials: OAuth1Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &OAuth1Credentials {
        &self.credentials
    }

    /// `Authorization` header value for a request.
    ///
    /// `params` are the request's form/query parameters; multipart bodies
    /// contribute none.
    pub fn authorization_header(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let nonce = generate_nonce();
        let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();
        self.header_with(method, url, params, &nonce, &timestamp)
    }

    fn header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let oauth_params = self.oauth_params(nonce, timestamp);
        let signature = self.signature(method, url, params, &oauth_params);

        let mut fields: Vec<(String, String)> = oauth_params;
        fields.push(("oauth_signature".to_string(), signature));
        fields.sort();

        let joined = fields
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {joined}")
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        vec![
            (
                "oauth_consumer_key".to_string(),
                self.credentials.consumer_key.clone(),
            ),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            (
                "oauth_token".to_string(),
                self.credentials.access_token.clone(),
            ),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        oauth_params: &[(String, String)],
    ) -> String {
        // Parameter normalization: encode both halves, then sort
        let mut pairs: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        pairs.extend(
            oauth_params
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        );
        pairs.sort();

        let parameter_string = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&parameter_string)
        );

        let signing_key = format!(
            "{}&{}",
            percent_encode(self.credentials.consumer_secret.expose_secret()),
            percent_encode(self.credentials.access_token_secret.expose_secret())
        );

        let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(base_string.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
