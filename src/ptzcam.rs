use crate::commands::Connection;
use crate::constants::{HTTP_PORT, REQUEST_TIMEOUT, SETTLE_DELAY};
use crate::error::{PTZError, Result};
use crate::parameters::Parameters;
use crate::protocol::{DigestChallenge, new_cnonce};
use crate::resolution::Resolution;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::{Position, Url};

pub struct PTZCam {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) resolution: Resolution,
    pub(crate) timeout: Duration,
    pub(crate) settle_delay: Duration,
    pub(crate) validate_updates: bool,

    // Local mirror of the camera state
    pub(crate) parameters: Parameters,

    pub(crate) client: Client,
}

impl PTZCam {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: HTTP_PORT,
            username: username.into(),
            password: password.into(),
            resolution: Resolution::default(),
            timeout: REQUEST_TIMEOUT,
            settle_delay: SETTLE_DELAY,
            validate_updates: false,
            parameters: Parameters::default(),
            // Every call opens its own connection.
            client: Client::builder()
                .pool_max_idle_per_host(0)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pause after every parameter update. Defaults to two seconds.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Report rejected parameter updates as `RequestRejected` instead of
    /// only logging them. Off by default.
    pub fn with_update_validation(mut self, validate: bool) -> Self {
        self.validate_updates = validate;
        self
    }

    /// Starts a camera session from the configured client: runs the
    /// liveness ping once and returns its raw body alongside the client.
    /// The session starts even when the ping fails.
    pub async fn open(self) -> (Self, Option<String>) {
        let ping = self.connect().await;
        (self, ping)
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub(crate) fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("http://{}:{}{}", self.host, self.port, path))
            .map_err(|e| PTZError::ConnectionError(format!("Invalid camera address: {}", e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    pub(crate) async fn send_get(&self, url: Url) -> Result<Response> {
        tracing::debug!(url = %url, "GET");
        Ok(self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?)
    }

    /// GET with HTTP Digest authentication. The first unauthenticated request
    /// fetches the challenge; the answer is sent on a second request.
    pub(crate) async fn send_authenticated(&self, url: Url) -> Result<Response> {
        let response = self.send_get(url.clone()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let header = response
            .headers()
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| {
                v.trim_start()
                    .get(..6)
                    .is_some_and(|s| s.eq_ignore_ascii_case("digest"))
            })
            .map(str::to_string)
            .ok_or_else(|| {
                PTZError::AuthenticationError("Camera did not offer digest authentication".into())
            })?;
        let challenge = DigestChallenge::parse(&header)?;

        let uri = &url[Position::BeforePath..];
        let authorization = challenge.authorization(
            "GET",
            uri,
            &self.username,
            &self.password,
            &new_cnonce(),
            1,
        );

        tracing::debug!(url = %url, realm = %challenge.realm, "Answering digest challenge");
        Ok(self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?)
    }
}
