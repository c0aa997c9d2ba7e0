use anyhow::{Context, anyhow};
use fennec_core::api::{ClientIdentity, UserSession};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which server to talk to and as whom.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Stable per-install id. Generated per run when unset, which makes the
    /// server list every run as a new device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(with = "super::duration")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            user_id: None,
            access_token: None,
            client_name: "Fennec".to_string(),
            device_name: None,
            device_id: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("user_id", &self.user_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("client_name", &self.client_name)
            .field("device_name", &self.device_name)
            .field("device_id", &self.device_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ServerConfig {
    pub fn is_complete(&self) -> bool {
        self.url.is_some() && self.user_id.is_some() && self.access_token.is_some()
    }

    pub fn identity(&self) -> ClientIdentity {
        let mut identity = ClientIdentity {
            client: self.client_name.clone(),
            ..ClientIdentity::default()
        };
        if let Some(device) = &self.device_name {
            identity.device = device.clone();
        }
        if let Some(device_id) = &self.device_id {
            identity.device_id = device_id.clone();
        }
        identity
    }

    /// Build an authenticated HTTP session from these settings.
    pub fn user_session(&self) -> anyhow::Result<UserSession> {
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| anyhow!("server.url is not configured (set FENNEC_SERVER_URL)"))?;
        let user_id = self
            .user_id
            .as_deref()
            .ok_or_else(|| anyhow!("server.user_id is not configured (set FENNEC_USER_ID)"))?;
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| anyhow!("server.access_token is not configured (set FENNEC_ACCESS_TOKEN)"))?;

        UserSession::with_timeout(url.as_str(), user_id, token, &self.identity(), self.request_timeout)
            .with_context(|| format!("failed to create session for {url}"))
    }
}
