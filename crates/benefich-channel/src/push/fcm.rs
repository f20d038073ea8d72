//! Firebase Cloud Messaging HTTP v1 client.
//!
//! Authenticates with a service-account key: a self-signed RS256 assertion
//! is exchanged for an OAuth access token, which is cached until shortly
//! before it expires.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use benefich_core::config::PushConfig;
use benefich_core::error::{AppError, ErrorKind};

use super::transport::{PushMessage, PushTransport};
use crate::error::DeliveryError;

const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECONDS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECONDS: i64 = 60;

/// The fields of a Google service-account key file that are used here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    /// Service account address, the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccount {
    /// Read a service-account key file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Cannot read service account '{}'", path.display()),
                e,
            )
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Malformed service account '{}'", path.display()),
                e,
            )
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// FCM client authenticated as a service account.
pub struct FcmClient {
    client: Client,
    account: ServiceAccount,
    signing_key: EncodingKey,
    send_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for FcmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FcmClient")
            .field("client_email", &self.account.client_email)
            .field("send_url", &self.send_url)
            .finish_non_exhaustive()
    }
}

impl FcmClient {
    /// Build a client from the push configuration.
    pub fn new(config: &PushConfig) -> Result<Self, AppError> {
        let account = ServiceAccount::from_file(Path::new(&config.service_account_path))?;
        Self::with_account(config, account)
    }

    /// Build a client from an already loaded service account.
    pub fn with_account(config: &PushConfig, account: ServiceAccount) -> Result<Self, AppError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "Service account private key is not a valid RSA PEM",
                e,
            )
        })?;

        Ok(Self {
            client: Client::new(),
            signing_key,
            send_url: format!(
                "{}/v1/projects/{}/messages:send",
                config.api_base.trim_end_matches('/'),
                config.project_id
            ),
            account,
            token: Mutex::new(None),
        })
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, DeliveryError> {
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: MESSAGING_SCOPE,
            aud: &self.account.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECONDS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| DeliveryError::AuthenticationFailed(format!("cannot sign assertion: {e}")))
    }

    async fn access_token(&self) -> Result<String, DeliveryError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECONDS) > now {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.assertion(now)?;
        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| DeliveryError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::AuthenticationFailed(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::AuthenticationFailed(e.to_string()))?;
        debug!(expires_in = token.expires_in, "Refreshed FCM access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl PushTransport for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<(), DeliveryError> {
        let token = self.access_token().await?;
        let payload = json!({
            "message": {
                "topic": message.topic,
                "notification": {
                    "title": message.title,
                    "body": message.body,
                },
                "data": message.data,
            }
        });

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            *self.token.lock().await = None;
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected(format!("FCM returned {status}: {body}")));
        }

        debug!(topic = %message.topic, "FCM accepted broadcast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pem_key() {
        let account = ServiceAccount {
            client_email: "dispatch@benefich.iam.gserviceaccount.com".to_string(),
            private_key: "not a key".to_string(),
            token_uri: default_token_uri(),
        };
        let err = FcmClient::with_account(&PushConfig::default(), account).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_service_account_defaults_token_uri() {
        let account: ServiceAccount = serde_json::from_str(
            r#"{"client_email":"a@b.iam.gserviceaccount.com","private_key":"k","type":"service_account"}"#,
        )
        .unwrap();
        assert_eq!(account.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_missing_key_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServiceAccount::from_file(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
