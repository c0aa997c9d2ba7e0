use crate::error::Result;
use async_trait::async_trait;
use fennec_contracts::error::FetchError;
use fennec_contracts::session::{ApiRequest, ApiResponse, AuthenticatedSession, Method};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How this client introduces itself in the `MediaBrowser` authorization
/// scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client: String,
    pub device: String,
    pub device_id: String,
    pub version: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            client: "Fennec".to_string(),
            device: std::env::consts::OS.to_string(),
            device_id: Uuid::new_v4().simple().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ClientIdentity {
    fn authorization(&self, token: &str) -> String {
        format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\", Token=\"{}\"",
            self.client, self.device, self.device_id, self.version, token
        )
    }
}

/// A logged in user on one server.
#[derive(Clone)]
pub struct UserSession {
    client: Client,
    server_url: Url,
    user_id: String,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("server_url", &self.server_url.as_str())
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl UserSession {
    pub fn new(
        server_url: &str,
        user_id: impl Into<String>,
        access_token: &str,
        identity: &ClientIdentity,
    ) -> Result<Self> {
        Self::with_timeout(server_url, user_id, access_token, identity, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        server_url: &str,
        user_id: impl Into<String>,
        access_token: &str,
        identity: &ClientIdentity,
        timeout: Duration,
    ) -> Result<Self> {
        let mut server_url = Url::parse(server_url)?;
        // Url::join drops the last path segment unless it ends with '/'.
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&identity.authorization(access_token))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let user_id = user_id.into();
        info!(server = %server_url, %user_id, "created user session");

        Ok(Self {
            client,
            server_url,
            user_id,
        })
    }

    fn resolve(&self, path: &str) -> std::result::Result<Url, FetchError> {
        self.server_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| FetchError::Transport(format!("invalid request path {path}: {err}")))
    }
}

#[async_trait]
impl AuthenticatedSession for UserSession {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn server_url(&self) -> &Url {
        &self.server_url
    }

    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, FetchError> {
        let url = self.resolve(&request.path)?;
        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };
        let builder = builder.query(&request.query);
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        debug!(method = ?request.method, path = %request.path, "sending api request");
        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: status_message(status, &body),
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        text.chars().take(200).collect()
    }
}
