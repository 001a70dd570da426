use crate::constants::PTZ_PATH;
use crate::error::{PTZError, Result};
use crate::parameters::{Parameter, Parameters};
use crate::protocol::parse_position;
use crate::ptzcam::PTZCam;
use async_trait::async_trait;
use tokio::time::sleep;

#[async_trait]
pub trait PTZ: Send + Sync {
    /// Last-known camera parameters (local mirror, not camera truth)
    fn parameters(&self) -> &Parameters;

    /// Send the whole mirror with `action=update`, then wait for the head to settle
    async fn push_parameters(&mut self) -> Result<()>;

    /// Refresh the mirror from `query=position`
    async fn query_position(&mut self) -> Result<()>;

    /// Set absolute zoom
    async fn set_zoom(&mut self, zoom: f64) -> Result<()>;

    /// Set absolute pan and tilt in degrees
    async fn set_pan_tilt(&mut self, pan: f64, tilt: f64) -> Result<()>;

    /// Aim at a point, with `z` forward, `x` lateral and `y` up
    async fn set_from_cartesian(&mut self, x: f64, y: f64, z: f64) -> Result<()>;

    /// Move relative to the mirrored pan and tilt
    async fn move_pan_tilt(&mut self, delta_pan: f64, delta_tilt: f64) -> Result<()>;
}

/// Bearing and elevation in degrees of a point seen from the origin, with the
/// zero pan/tilt orientation along `+z`. The origin maps to `(0, 0)`.
pub fn pan_tilt_from_cartesian(x: f64, y: f64, z: f64) -> (f64, f64) {
    let pan = x.atan2(z).to_degrees();
    let tilt = y.atan2(x.hypot(z)).to_degrees();
    (pan, tilt)
}

#[async_trait]
impl PTZ for PTZCam {
    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    async fn push_parameters(&mut self) -> Result<()> {
        let mut query = vec![("action", "update".to_string())];
        query.extend(self.parameters.query_pairs());
        let url = self.endpoint(PTZ_PATH, &query)?;

        let response = self.send_authenticated(url).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if self.validate_updates {
                return Err(PTZError::RequestRejected {
                    status: status.as_u16(),
                    body,
                });
            }
            tracing::warn!(
                host = %self.host,
                status = %status,
                body = %body.trim(),
                "Parameter update not accepted"
            );
        }

        sleep(self.settle_delay).await;
        Ok(())
    }

    async fn query_position(&mut self) -> Result<()> {
        let url = self.endpoint(PTZ_PATH, &[("query", "position".to_string())])?;
        let response = self.send_authenticated(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PTZError::ConnectionError(format!(
                "Position query failed with status {}",
                status
            )));
        }

        let body = response.text().await?;
        // Parse everything before touching the mirror
        let pairs = parse_position(&body)?;
        let applied = self.parameters.apply_raw(pairs);
        tracing::debug!(host = %self.host, applied, "Position refreshed");
        Ok(())
    }

    async fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        self.parameters.set(Parameter::Zoom, zoom);
        self.push_parameters().await
    }

    async fn set_pan_tilt(&mut self, pan: f64, tilt: f64) -> Result<()> {
        self.parameters.set(Parameter::Pan, pan);
        self.parameters.set(Parameter::Tilt, tilt);
        self.push_parameters().await
    }

    async fn set_from_cartesian(&mut self, x: f64, y: f64, z: f64) -> Result<()> {
        let (pan, tilt) = pan_tilt_from_cartesian(x, y, z);
        self.set_pan_tilt(pan, tilt).await
    }

    async fn move_pan_tilt(&mut self, delta_pan: f64, delta_tilt: f64) -> Result<()> {
        // No clamping: the mirror drifts from the hardware at its limits
        // until the next position query.
        let pan = self.parameters.number(Parameter::Pan)? + delta_pan;
        let tilt = self.parameters.number(Parameter::Tilt)? + delta_tilt;
        self.set_pan_tilt(pan, tilt).await
    }
}
