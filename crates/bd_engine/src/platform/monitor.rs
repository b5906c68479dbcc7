//! Non-owning monitor view
//!
//! Monitors belong to the native library. A [`Monitor`] only names one; once
//! the monitor is disconnected its queries fail with
//! [`WindowError::EmptyHandle`].

use super::backend::MonitorId;
use super::error::{WindowError, WindowResult};
use super::types::{GammaRamp, MonitorInfo, Point2D, Size2D, VideoMode};
use super::Platform;

/// A connected monitor
#[derive(Clone)]
pub struct Monitor {
    platform: Platform,
    id: MonitorId,
}

impl Monitor {
    pub(crate) const fn new(platform: Platform, id: MonitorId) -> Self {
        Self { platform, id }
    }

    /// Native handle
    pub const fn id(&self) -> MonitorId {
        self.id
    }

    /// Snapshot of every property at once
    pub fn info(&self) -> WindowResult<MonitorInfo> {
        self.platform
            .call(|backend| backend.monitor_info(self.id))?
            .ok_or(WindowError::EmptyHandle("monitor"))
    }

    /// Human readable name
    pub fn name(&self) -> WindowResult<Option<String>> {
        Ok(self.info()?.name)
    }

    /// Position on the virtual screen
    pub fn position(&self) -> WindowResult<Point2D<i32>> {
        Ok(self.info()?.position)
    }

    /// Physical size in millimetres
    pub fn physical_size(&self) -> WindowResult<Size2D> {
        Ok(self.info()?.physical_size_mm)
    }

    /// Every supported video mode
    pub fn video_modes(&self) -> WindowResult<Vec<VideoMode>> {
        Ok(self.info()?.video_modes)
    }

    /// Current video mode
    pub fn video_mode(&self) -> WindowResult<Option<VideoMode>> {
        Ok(self.info()?.video_mode)
    }

    /// Current gamma ramp, `None` when no ramp is available
    ///
    /// Platforms without gamma support report a native error instead.
    pub fn gamma_ramp(&self) -> WindowResult<Option<GammaRamp>> {
        self.ensure_connected()?;
        self.platform.call(|backend| backend.gamma_ramp(self.id))
    }

    /// Replace the gamma ramp
    pub fn set_gamma_ramp(&self, ramp: &GammaRamp) -> WindowResult<()> {
        if !ramp.size().is_some_and(|size| size > 0) {
            return Err(WindowError::InvalidArgument(
                "gamma ramp channels must be non-empty and of equal length".to_string(),
            ));
        }
        self.ensure_connected()?;
        self.platform.call(|backend| backend.set_gamma_ramp(self.id, ramp))
    }

    /// Apply a gamma ramp generated from the exponent `gamma`
    pub fn set_gamma(&self, gamma: f32) -> WindowResult<()> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(WindowError::InvalidArgument(format!(
                "gamma must be positive and finite, got {gamma}"
            )));
        }
        self.ensure_connected()?;
        self.platform.call(|backend| backend.set_gamma(self.id, gamma))
    }

    fn ensure_connected(&self) -> WindowResult<()> {
        if self.platform.call(|backend| backend.monitors())?.contains(&self.id) {
            Ok(())
        } else {
            Err(WindowError::EmptyHandle("monitor"))
        }
    }
}

impl PartialEq for Monitor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Monitor {}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor").field("id", &self.id).finish()
    }
}
