//! Blocking HTTP client for the Mattermost API v4

use std::time::Duration;

use chansync_meta::{AuthConfig, ChannelSpec, Visibility};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::channel::{ChannelPatch, NewChannel, PrivacyUpdate, RemoteChannel, channel_type};
use crate::error::{GatewayError, Result};
use crate::gateway::ChannelGateway;

const API_PREFIX: &str = "/api/v4";
const VERSION_HEADER: &str = "X-Version-Id";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Transport settings fixed at construction time.
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    /// Accept TLS 1.0 and 1.1 in addition to 1.2+
    pub allow_insecure_tls: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            allow_insecure_tls: false,
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// App error payload returned by the server on failure.
#[derive(Debug, Deserialize)]
struct AppErrorBody {
    #[serde(default)]
    message: String,
}

/// Blocking Mattermost client authenticated with a bearer token.
pub struct MattermostClient {
    http: Client,
    api_base: String,
    token: String,
    allow_insecure_tls: bool,
}

impl MattermostClient {
    /// Build a client for the server in `auth`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is empty, or the HTTP client
    /// cannot be initialized.
    pub fn new(auth: &AuthConfig, options: ClientOptions) -> Result<Self> {
        let instance_url = auth.instance_url.trim();
        if instance_url.is_empty() {
            return Err(GatewayError::InvalidConfig {
                message: "instance_url must not be empty".to_string(),
            });
        }
        if auth.auth_token.trim().is_empty() {
            return Err(GatewayError::InvalidConfig {
                message: "auth_token must not be empty".to_string(),
            });
        }

        let min_tls = if options.allow_insecure_tls {
            reqwest::tls::Version::TLS_1_0
        } else {
            reqwest::tls::Version::TLS_1_2
        };

        let http = Client::builder()
            .user_agent(user_agent())
            .min_tls_version(min_tls)
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| GatewayError::InvalidConfig {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            api_base: format!("{}{}", instance_url.trim_end_matches('/'), API_PREFIX),
            token: auth.auth_token.trim().to_string(),
            allow_insecure_tls: options.allow_insecure_tls,
        })
    }

    /// Verify the credentials against the server and return its version.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the token or is unreachable.
    pub fn connect(&self) -> Result<String> {
        let endpoint = "GET /users/me";
        let response = self.execute(endpoint, self.http.get(self.url("/users/me")))?;
        let version = response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(version = %version, "Authenticated against remote server");
        Ok(version)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(endpoint, "Calling remote API");
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| self.transport_error(endpoint, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<AppErrorBody>(&body)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| truncate(&body, MAX_ERROR_BODY_CHARS));

        Err(GatewayError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    fn execute_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        self.execute(endpoint, request)?
            .json::<T>()
            .map_err(|e| GatewayError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
    }

    fn transport_error(&self, endpoint: &str, error: &reqwest::Error) -> GatewayError {
        let message = error_chain(error);
        if !self.allow_insecure_tls && is_tls_version_error(&message) {
            return GatewayError::InsecureTls;
        }
        GatewayError::Transport {
            endpoint: endpoint.to_string(),
            message,
        }
    }
}

impl ChannelGateway for MattermostClient {
    fn name(&self) -> &'static str {
        "mattermost"
    }

    fn list_channels(
        &self,
        page: u32,
        per_page: u32,
        include_deleted: bool,
    ) -> Result<Vec<RemoteChannel>> {
        let request = self.http.get(self.url("/channels")).query(&[
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("include_deleted", include_deleted.to_string()),
        ]);
        self.execute_json("GET /channels", request)
    }

    fn create_channel(&self, spec: &ChannelSpec) -> Result<RemoteChannel> {
        let request = self
            .http
            .post(self.url("/channels"))
            .json(&NewChannel::from_spec(spec));
        self.execute_json("POST /channels", request)
    }

    fn patch_channel(&self, channel_id: &str, patch: &ChannelPatch) -> Result<()> {
        let path = format!("/channels/{}/patch", channel_id);
        let request = self.http.put(self.url(&path)).json(patch);
        self.execute(&format!("PUT {}", path), request)?;
        Ok(())
    }

    fn set_channel_privacy(&self, channel_id: &str, visibility: Visibility) -> Result<()> {
        let path = format!("/channels/{}/privacy", channel_id);
        let body = PrivacyUpdate {
            privacy: channel_type(visibility),
        };
        let request = self.http.put(self.url(&path)).json(&body);
        self.execute(&format!("PUT {}", path), request)?;
        Ok(())
    }

    fn archive_channel(&self, channel_id: &str) -> Result<()> {
        let path = format!("/channels/{}", channel_id);
        let request = self.http.delete(self.url(&path));
        self.execute(&format!("DELETE {}", path), request)?;
        Ok(())
    }

    fn restore_channel(&self, channel_id: &str) -> Result<()> {
        let path = format!("/channels/{}/restore", channel_id);
        let request = self.http.post(self.url(&path));
        self.execute(&format!("POST {}", path), request)?;
        Ok(())
    }
}

fn user_agent() -> String {
    format!(
        "chansync/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

fn is_tls_version_error(message: &str) -> bool {
    message.contains("protocol version not supported")
        || message.contains("unsupported protocol version")
        || message.contains("PeerIncompatible")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
