use crate::constants::{MAX_FRAME_SCAN, VIDEO_PATH};
use crate::error::{PTZError, Result};
use crate::frame::Frame;
use crate::protocol::JpegScanner;
use crate::ptzcam::PTZCam;
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait Capture: Send + Sync {
    /// Open the MJPEG stream, read one frame and close the stream
    async fn capture_frame(&self) -> Result<Frame>;

    /// Capture a frame into `{dir}/{YYYYMMDD-HHMMSS}.jpg`
    async fn save_frame(&self, dir: &Path) -> Result<PathBuf>;
}

#[async_trait]
impl Capture for PTZCam {
    async fn capture_frame(&self) -> Result<Frame> {
        let url = self.endpoint(VIDEO_PATH, &[("resolution", self.resolution.to_string())])?;

        let mut response = self.send_authenticated(url).await.map_err(|e| match e {
            PTZError::AuthenticationError(msg) => PTZError::ConnectionError(msg),
            other => other,
        })?;
        if !response.status().is_success() {
            return Err(PTZError::ConnectionError(format!(
                "Unable to connect to {}: status {}",
                self.host,
                response.status()
            )));
        }

        let mut buf: Vec<u8> = Vec::new();
        let mut scanner = JpegScanner::default();
        loop {
            let chunk = response
                .chunk()
                .await
                .map_err(|e| PTZError::ReadError(format!("Stream interrupted: {}", e)))?;
            let Some(chunk) = chunk else {
                return Err(PTZError::ReadError(
                    "Stream ended before a complete frame".to_string(),
                ));
            };
            buf.extend_from_slice(&chunk);

            if let Some(range) = scanner.scan(&buf) {
                tracing::debug!(host = %self.host, bytes = range.len(), "Frame captured");
                return Frame::from_jpeg(buf[range].to_vec());
            }
            if buf.len() > MAX_FRAME_SCAN {
                return Err(PTZError::ReadError(format!(
                    "No frame within the first {} bytes",
                    MAX_FRAME_SCAN
                )));
            }
        }
    }

    async fn save_frame(&self, dir: &Path) -> Result<PathBuf> {
        let frame = self.capture_frame().await?;
        let path = frame.save_to(dir, Local::now()).await?;
        tracing::info!(host = %self.host, path = %path.display(), "Frame saved");
        Ok(path)
    }
}
