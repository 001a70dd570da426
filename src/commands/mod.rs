pub mod capture;
pub mod connection;
pub mod ptz;

pub use capture::Capture;
pub use connection::Connection;
pub use ptz::{PTZ, pan_tilt_from_cartesian};
