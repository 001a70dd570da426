use crate::constants::SNAPSHOT_FORMAT;
use crate::error::{PTZError, Result};
use chrono::{DateTime, TimeZone};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt};

/// One frame pulled from the MJPEG stream.
#[derive(Debug, Clone)]
pub struct Frame {
    jpeg: Vec<u8>,
    image: DynamicImage,
}

impl Frame {
    /// Decodes a JPEG; fails with `ReadError` if the bytes are not a valid image.
    pub fn from_jpeg(jpeg: Vec<u8>) -> Result<Self> {
        let image = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
            .map_err(|e| PTZError::ReadError(format!("Unable to decode frame: {}", e)))?;
        Ok(Self { jpeg, image })
    }

    /// JPEG bytes exactly as sent by the camera.
    pub fn jpeg(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Writes the frame to `{dir}/{YYYYMMDD-HHMMSS}.jpg`. Two frames saved
    /// within the same second share a name; the later one replaces the earlier.
    pub async fn save_to<Tz>(&self, dir: impl AsRef<Path>, at: DateTime<Tz>) -> Result<PathBuf>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let path = snapshot_path(dir, &at);
        let mut file = File::create(&path).await?;
        file.write_all(&self.jpeg).await?;
        file.flush().await?;
        Ok(path)
    }
}

pub fn snapshot_path<Tz>(dir: impl AsRef<Path>, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    dir.as_ref().join(format!("{}.jpg", at.format(SNAPSHOT_FORMAT)))
}
