use std::time::Duration;

pub const HTTP_PORT: u16 = 80;

pub const PING_PATH: &str = "/axis-cgi/pingtest.cgi";
pub const PTZ_PATH: &str = "/axis-cgi/com/ptz.cgi";
pub const VIDEO_PATH: &str = "/axis-cgi/mjpg/video.cgi";

/// Snapshot file names, seconds resolution.
pub const SNAPSHOT_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Time the head needs to finish moving after an update.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on bytes read from the stream while looking for one frame.
pub const MAX_FRAME_SCAN: usize = 8 * 1024 * 1024;

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
