use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::time::{TimeScale, ZoomLevel};

/// Duration-dependent layout: ruler length and track width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayout {
    pub visible_duration: f64,
    pub width_px: f64,
}

/// Outcome of one transport tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayheadUpdate {
    pub current_time: f64,
    pub position_px: f64,
    /// Present only when the reported media duration changed.
    pub layout: Option<TimelineLayout>,
}

/// Shared time cursor.
///
/// The transport is the single source of truth: only [`Playhead::update_time`]
/// moves the cursor. Ruler interaction asks the transport to seek and waits
/// for the next update.
#[derive(Debug, Clone, PartialEq)]
pub struct Playhead {
    current_time: f64,
    duration: Option<f64>,
    default_visible_duration: f64,
}

impl Playhead {
    pub fn new(default_visible_duration: f64) -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            default_visible_duration,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Media duration last reported by the transport.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Ruler length: the media duration once known, the configured default before.
    pub fn visible_duration(&self) -> f64 {
        self.duration.unwrap_or(self.default_visible_duration)
    }

    pub fn position_px(&self, scale: &TimeScale, zoom: ZoomLevel) -> f64 {
        scale.time_to_pixels(self.current_time, zoom)
    }

    pub fn layout(&self, scale: &TimeScale, zoom: ZoomLevel) -> TimelineLayout {
        let visible_duration = self.visible_duration();
        TimelineLayout {
            visible_duration,
            width_px: scale.time_to_pixels(visible_duration, zoom),
        }
    }

    /// Applies a transport tick.
    ///
    /// # Example
    /// ```
    /// use clipdeck_engine::{EditorConfig, Playhead, TimeScale, ZoomLevel};
    ///
    /// let scale = TimeScale::from_config(&EditorConfig::default());
    /// let mut playhead = Playhead::new(60.0);
    /// let first = playhead.update_time(1.0, 30.0, &scale, ZoomLevel(1));
    /// assert_eq!(first.position_px, 35.0);
    /// assert!(first.layout.is_some());
    /// let second = playhead.update_time(2.0, 30.0, &scale, ZoomLevel(1));
    /// assert!(second.layout.is_none());
    /// ```
    pub fn update_time(
        &mut self,
        current_time: f64,
        duration: f64,
        scale: &TimeScale,
        zoom: ZoomLevel,
    ) -> PlayheadUpdate {
        self.current_time = if current_time.is_finite() {
            current_time.max(0.0)
        } else {
            0.0
        };

        let reported = Some(duration).filter(|duration| duration.is_finite() && *duration > 0.0);
        let layout = if reported.is_some() && reported != self.duration {
            debug!(previous = ?self.duration, duration, "media duration changed");
            self.duration = reported;
            Some(self.layout(scale, zoom))
        } else {
            None
        };

        PlayheadUpdate {
            current_time: self.current_time,
            position_px: self.position_px(scale, zoom),
            layout,
        }
    }
}
