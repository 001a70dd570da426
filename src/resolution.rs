use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Stream resolutions accepted by `video.cgi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString, EnumIter)]
pub enum Resolution {
    #[strum(serialize = "1920x1080")]
    P1080,
    #[default]
    #[strum(serialize = "1280x720")]
    P720,
    #[strum(serialize = "800x450")]
    P450,
    #[strum(serialize = "640x360")]
    P360,
    #[strum(serialize = "480x270")]
    P270,
    #[strum(serialize = "320x180")]
    P180,
}

impl Resolution {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::P1080 => (1920, 1080),
            Resolution::P720 => (1280, 720),
            Resolution::P450 => (800, 450),
            Resolution::P360 => (640, 360),
            Resolution::P270 => (480, 270),
            Resolution::P180 => (320, 180),
        }
    }
}
