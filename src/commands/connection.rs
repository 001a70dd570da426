use crate::constants::PING_PATH;
use crate::ptzcam::PTZCam;
use async_trait::async_trait;

#[async_trait]
pub trait Connection: Send + Sync {
    /// Request the camera's ping endpoint and return the raw response body.
    ///
    /// The ping is diagnostic only: an HTTP error status is not checked and
    /// an unreachable camera yields `None` instead of an error.
    async fn connect(&self) -> Option<String>;

    /// Get the camera address
    fn host(&self) -> &str;

    /// Get the HTTP port
    fn port(&self) -> u16;
}

#[async_trait]
impl Connection for PTZCam {
    async fn connect(&self) -> Option<String> {
        let url = match self.endpoint(PING_PATH, &[]) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "Liveness check skipped");
                return None;
            }
        };

        let body = match self.send_get(url).await {
            Ok(response) => response.text().await,
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "Liveness check failed");
                return None;
            }
        };

        match body {
            Ok(text) => {
                tracing::info!(host = %self.host, response = %text.trim(), "Liveness check");
                Some(text)
            }
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "Liveness check body unreadable");
                None
            }
        }
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }
}
