use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;

/// Integer zoom level of the timeline view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoomLevel(pub u8);

impl ZoomLevel {
    pub fn get(self) -> u8 {
        self.0
    }
}

/// One labelled ruler mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulerTick {
    pub time: f64,
    pub x: f64,
    pub label: String,
}

/// Seconds-to-pixels mapping parameterised by zoom.
///
/// `pixels_per_second(zoom) = base + zoom * slope`, so higher zoom levels are
/// strictly denser.
///
/// # Example
/// ```
/// use clipdeck_engine::{EditorConfig, TimeScale, ZoomLevel};
///
/// let scale = TimeScale::from_config(&EditorConfig::default());
/// assert_eq!(scale.pixels_per_second(ZoomLevel(1)), 35.0);
/// assert_eq!(scale.time_to_pixels(2.0, ZoomLevel(1)), 70.0);
/// assert_eq!(scale.pixels_to_time(70.0, ZoomLevel(1)), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    zoom_min: u8,
    zoom_max: u8,
    base: f64,
    slope: f64,
    min_clip_width_px: f64,
}

impl TimeScale {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            base: config.base_pixels_per_second,
            slope: config.pixels_per_second_slope,
            min_clip_width_px: config.min_clip_width_px,
        }
    }

    pub fn zoom_bounds(&self) -> (ZoomLevel, ZoomLevel) {
        (ZoomLevel(self.zoom_min), ZoomLevel(self.zoom_max))
    }

    /// Saturates an arbitrary requested level into the configured bounds.
    pub fn clamp_zoom(&self, raw: i64) -> ZoomLevel {
        let clamped = raw.clamp(i64::from(self.zoom_min), i64::from(self.zoom_max));
        ZoomLevel(u8::try_from(clamped).unwrap_or(self.zoom_max))
    }

    pub fn pixels_per_second(&self, zoom: ZoomLevel) -> f64 {
        let zoom = zoom.0.clamp(self.zoom_min, self.zoom_max);
        self.base + f64::from(zoom) * self.slope
    }

    pub fn time_to_pixels(&self, seconds: f64, zoom: ZoomLevel) -> f64 {
        seconds * self.pixels_per_second(zoom)
    }

    pub fn pixels_to_time(&self, x: f64, zoom: ZoomLevel) -> f64 {
        x / self.pixels_per_second(zoom)
    }

    /// Shortest duration a trim may leave, i.e. the minimum clip width in
    /// seconds at `zoom`.
    pub fn min_clip_duration(&self, zoom: ZoomLevel) -> f64 {
        self.min_clip_width_px / self.pixels_per_second(zoom)
    }

    /// Labelled marks every [`tick_interval`] seconds across `visible_duration`.
    pub fn ruler_ticks(&self, zoom: ZoomLevel, visible_duration: f64) -> Vec<RulerTick> {
        if !(visible_duration > 0.0) {
            return Vec::new();
        }

        // Long media widens the spacing instead of growing the tick list.
        let mut interval = tick_interval(zoom);
        let mut count = (visible_duration / interval).floor() as u64;
        if count > MAX_RULER_TICKS {
            interval *= count.div_ceil(MAX_RULER_TICKS) as f64;
            count = (visible_duration / interval).floor() as u64;
        }
        (0..=count)
            .map(|step| {
                let time = step as f64 * interval;
                RulerTick {
                    time,
                    x: self.time_to_pixels(time, zoom),
                    label: format_timecode(time),
                }
            })
            .collect()
    }
}

/// Upper bound on ticks produced for one ruler.
pub const MAX_RULER_TICKS: u64 = 2_000;

/// Ruler label spacing in seconds for `zoom`.
///
/// Used for labels only; clip placement never snaps to it.
pub fn tick_interval(zoom: ZoomLevel) -> f64 {
    match zoom.0 {
        0..3 => 10.0,
        3..6 => 5.0,
        _ => 1.0,
    }
}

/// Formats seconds as `m:ss`, truncating fractional seconds.
///
/// # Example
/// ```
/// use clipdeck_engine::time::format_timecode;
///
/// assert_eq!(format_timecode(75.9), "1:15");
/// ```
pub fn format_timecode(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
