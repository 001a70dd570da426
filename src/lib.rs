pub mod commands;
pub mod constants;
pub mod error;
pub mod frame;
pub mod parameters;
pub mod protocol;
pub mod ptzcam;
pub mod resolution;

pub use commands::*;
pub use error::{PTZError, Result};
pub use frame::Frame;
pub use parameters::{ParamValue, Parameter, Parameters};
pub use ptzcam::PTZCam;
pub use resolution::Resolution;
