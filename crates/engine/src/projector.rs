use serde::{Deserialize, Serialize};

use crate::clip::{ClipId, TrackKind};
use crate::playhead::Playhead;
use crate::store::ClipStore;
use crate::time::{RulerTick, TimeScale, ZoomLevel};

/// Visual placement of one clip, in track-local pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    pub id: ClipId,
    pub track: TrackKind,
    pub left_px: f64,
    pub width_px: f64,
    pub selected: bool,
    pub label: String,
    pub is_text: bool,
}

impl ClipRect {
    pub fn right_px(&self) -> f64 {
        self.left_px + self.width_px
    }
}

/// Everything the drawing layer needs for one repaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub zoom: ZoomLevel,
    pub pixels_per_second: f64,
    pub clips: Vec<ClipRect>,
    pub playhead_px: f64,
    /// Covers the visible duration and the end of every clip.
    pub content_width_px: f64,
    pub ruler: Vec<RulerTick>,
}

impl RenderFrame {
    pub fn clip(&self, id: ClipId) -> Option<&ClipRect> {
        self.clips.iter().find(|rect| rect.id == id)
    }

    pub fn track_clips(&self, track: TrackKind) -> impl Iterator<Item = &ClipRect> {
        self.clips.iter().filter(move |rect| rect.track == track)
    }
}

/// Maps the current store, zoom and playhead into drawable rectangles.
pub fn project(
    store: &ClipStore,
    scale: &TimeScale,
    zoom: ZoomLevel,
    playhead: &Playhead,
) -> RenderFrame {
    let selected = store.selected();
    let clips = store
        .clips()
        .map(|clip| ClipRect {
            id: clip.id,
            track: clip.track,
            left_px: scale.time_to_pixels(clip.start_time, zoom),
            width_px: scale.time_to_pixels(clip.duration, zoom),
            selected: selected == Some(clip.id),
            label: clip.name.clone(),
            is_text: clip.is_text(),
        })
        .collect();

    let visible_duration = playhead.visible_duration();
    let content_duration = visible_duration.max(store.timeline_end());

    RenderFrame {
        zoom,
        pixels_per_second: scale.pixels_per_second(zoom),
        clips,
        playhead_px: playhead.position_px(scale, zoom),
        content_width_px: scale.time_to_pixels(content_duration, zoom),
        ruler: scale.ruler_ticks(zoom, visible_duration),
    }
}

#[cfg(test)]
mod tests {
    use super::project;
    use crate::clip::{ClipMetadata, TrackKind};
    use crate::config::EditorConfig;
    use crate::playhead::Playhead;
    use crate::store::ClipStore;
    use crate::time::{TimeScale, ZoomLevel};

    #[test]
    fn projects_clip_geometry_and_selection() {
        let scale = TimeScale::from_config(&EditorConfig::default());
        let mut store = ClipStore::new();
        let a = store
            .add_clip(TrackKind::Video, 10.0, ClipMetadata::media("a.mp4"))
            .expect("add a");
        let b = store
            .add_clip(TrackKind::Text, 5.0, ClipMetadata::text("Title"))
            .expect("add b");
        store.select_clip(b.id).expect("select");

        let frame = project(&store, &scale, ZoomLevel(1), &Playhead::new(60.0));

        let rect_a = frame.clip(a.id).expect("rect a");
        assert_eq!((rect_a.left_px, rect_a.width_px), (0.0, 350.0));
        assert!(!rect_a.selected);
        let rect_b = frame.clip(b.id).expect("rect b");
        assert!(rect_b.selected);
        assert!(rect_b.is_text);
        assert_eq!(rect_b.label, "Title");
        assert_eq!(frame.track_clips(TrackKind::Audio).count(), 0);
    }

    #[test]
    fn content_width_extends_past_visible_duration_for_late_clips() {
        let scale = TimeScale::from_config(&EditorConfig::default());
        let mut store = ClipStore::new();
        store
            .add_clip_at(TrackKind::Audio, 70.0, 10.0, ClipMetadata::media("late"))
            .expect("add");

        let frame = project(&store, &scale, ZoomLevel(1), &Playhead::new(60.0));

        assert_eq!(frame.content_width_px, 80.0 * 35.0);
        assert_eq!(frame.ruler.last().map(|tick| tick.time), Some(60.0));
    }

    #[test]
    fn zoom_rescales_every_rectangle() {
        let scale = TimeScale::from_config(&EditorConfig::default());
        let mut store = ClipStore::new();
        let clip = store
            .add_clip_at(TrackKind::Video, 2.0, 4.0, ClipMetadata::media("a"))
            .expect("add");

        let frame = project(&store, &scale, ZoomLevel(10), &Playhead::new(60.0));

        let rect = frame.clip(clip.id).expect("rect");
        assert_eq!(frame.pixels_per_second, 170.0);
        assert_eq!(rect.left_px, 340.0);
        assert_eq!(rect.right_px(), 1_020.0);
    }
}
