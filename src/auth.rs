//! Google API credentials
//!
//! Service accounts authenticate with a signed RS256 JWT assertion exchanged
//! for a short-lived bearer token. Public sheets can use a plain API key.
//!
//! See <https://developers.google.com/identity/protocols/oauth2/service-account#httprest>

use crate::error::{FeedError, FeedResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use rustls_pemfile::Item;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

/// Read-only access to spreadsheets
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Service account key file contents (the JSON downloaded from the cloud console)
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<secret>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text
    pub fn from_json(json: &str) -> FeedResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| FeedError::Credentials(format!("Invalid service account key: {}", e)))
    }

    /// Build the signed JWT assertion for `scope`, issued at `now`
    pub fn assertion(&self, scope: &str, now: DateTime<Utc>) -> FeedResult<String> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };
        let claims = JwtClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?),
        );

        let key_pair = load_key_pair(&self.private_key)?;
        let mut signature = vec![0u8; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &RSA_PKCS1_SHA256,
                &SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| FeedError::Credentials("Failed to sign JWT assertion".to_string()))?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'a str,
    typ: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Parse the first PEM block of `pem` as an RSA private key (PKCS#8 or PKCS#1)
fn load_key_pair(pem: &str) -> FeedResult<RsaKeyPair> {
    // Key files embedded in env vars often carry literal "\n" sequences
    let pem = pem.replace("\\n", "\n");
    let mut reader = Cursor::new(pem.as_bytes());
    let item = rustls_pemfile::read_one(&mut reader)
        .map_err(|e| FeedError::Credentials(format!("Invalid PEM private key: {}", e)))?;

    match item {
        Some(Item::Pkcs8Key(der)) => RsaKeyPair::from_pkcs8(der.secret_pkcs8_der())
            .map_err(|e| FeedError::Credentials(format!("Rejected PKCS#8 private key: {}", e))),
        Some(Item::Pkcs1Key(der)) => RsaKeyPair::from_der(der.secret_pkcs1_der())
            .map_err(|e| FeedError::Credentials(format!("Rejected PKCS#1 private key: {}", e))),
        Some(_) => Err(FeedError::Credentials(
            "PEM block is not an RSA private key".to_string(),
        )),
        None => Err(FeedError::Credentials(
            "Private key is not a PEM block".to_string(),
        )),
    }
}

/// How requests to the Sheets API are authorized
#[derive(Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    ApiKey(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ServiceAccount(key) => {
                f.debug_tuple("ServiceAccount").field(key).finish()
            }
            Credentials::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<secret>").finish(),
        }
    }
}

impl Credentials {
    /// One-line description without secrets
    pub fn describe(&self) -> String {
        match self {
            Credentials::ServiceAccount(key) => format!("service account {}", key.client_email),
            Credentials::ApiKey(_) => "API key".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchange a service account assertion for a bearer access token
pub async fn fetch_access_token(
    client: &reqwest::Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> FeedResult<String> {
    let assertion = key.assertion(scope, Utc::now())?;

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| FeedError::Auth(format!("Token request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| FeedError::Auth(format!("Failed to read token response: {}", e)))?;

    if !status.is_success() {
        let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(FeedError::Auth(format!("HTTP {}: {}", status.as_u16(), detail)));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| FeedError::Auth(format!("Malformed token response: {}", e)))?;
    Ok(token.access_token)
}
