use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clip::{Clip, ClipId, ClipMetadata, TrackKind, TrimRange};
use crate::error::{EngineError, Result};

/// One timeline lane. Clips keep insertion order and may overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub kind: TrackKind,
    pub clips: Vec<Clip>,
}

impl Track {
    /// End of the last-ending clip, or `0` for an empty track.
    pub fn end_time(&self) -> f64 {
        self.clips.iter().map(Clip::end_time).fold(0.0, f64::max)
    }
}

/// Which clip edge a trim moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimSide {
    Left,
    Right,
}

/// Requested geometry for a trim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimEdit {
    /// Moves the start; `new_duration` is expected to keep the end in place.
    Left { new_start: f64, new_duration: f64 },
    /// Changes only the duration.
    Right { new_duration: f64 },
}

impl TrimEdit {
    pub fn side(&self) -> TrimSide {
        match self {
            Self::Left { .. } => TrimSide::Left,
            Self::Right { .. } => TrimSide::Right,
        }
    }
}

/// Clips of the three tracks plus the single selection.
///
/// # Example
/// ```
/// use clipdeck_engine::{ClipMetadata, ClipStore, TrackKind};
///
/// let mut store = ClipStore::new();
/// let a = store.add_clip(TrackKind::Video, 10.0, ClipMetadata::media("a.mp4")).unwrap();
/// let b = store.add_clip(TrackKind::Video, 5.0, ClipMetadata::media("b.mp4")).unwrap();
/// assert_eq!(a.start_time, 0.0);
/// assert_eq!(b.start_time, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClipStore {
    tracks: [Track; 3],
    selection: Option<ClipId>,
    next_clip_id: u64,
}

impl Default for ClipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipStore {
    pub fn new() -> Self {
        Self {
            tracks: TrackKind::ALL.map(|kind| Track {
                kind,
                clips: Vec::new(),
            }),
            selection: None,
            next_clip_id: 1,
        }
    }

    pub fn track(&self, kind: TrackKind) -> &Track {
        &self.tracks[kind.index()]
    }

    /// All clips in track display order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|track| track.clips.iter())
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|track| track.clips.len()).sum()
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips().find(|clip| clip.id == id)
    }

    pub fn track_end(&self, kind: TrackKind) -> f64 {
        self.track(kind).end_time()
    }

    /// End of the last-ending clip across all tracks.
    pub fn timeline_end(&self) -> f64 {
        self.tracks.iter().map(Track::end_time).fold(0.0, f64::max)
    }

    pub fn selected(&self) -> Option<ClipId> {
        self.selection
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selection.and_then(|id| self.clip(id))
    }

    /// Appends a clip after the last-ending clip of `track`.
    pub fn add_clip(
        &mut self,
        track: TrackKind,
        duration: f64,
        metadata: ClipMetadata,
    ) -> Result<Clip> {
        let start_time = self.track_end(track);
        self.insert_clip(track, start_time, duration, metadata)
    }

    /// Places a clip at an explicit start. Overlaps are allowed.
    pub fn add_clip_at(
        &mut self,
        track: TrackKind,
        start_time: f64,
        duration: f64,
        metadata: ClipMetadata,
    ) -> Result<Clip> {
        let start_time = clamp_time(start_time)?;
        self.insert_clip(track, start_time, duration, metadata)
    }

    /// Moves a clip, clamping negative starts to zero. Returns the applied start.
    pub fn move_clip(&mut self, id: ClipId, new_start_time: f64) -> Result<f64> {
        let start_time = clamp_time(new_start_time)?;
        let clip = self.clip_mut(id)?;
        if start_time != new_start_time {
            debug!(clip_id = %id, requested = new_start_time, "move clamped to timeline origin");
        }
        clip.start_time = start_time;
        Ok(start_time)
    }

    /// Reassigns a clip to another lane, keeping its timing.
    pub fn move_clip_to_track(&mut self, id: ClipId, track: TrackKind) -> Result<()> {
        let (from, index) = self.locate(id)?;
        if from == track {
            return Ok(());
        }

        let mut clip = self.tracks[from.index()].clips.remove(index);
        clip.track = track;
        self.tracks[track.index()].clips.push(clip);
        debug!(clip_id = %id, from = from.as_str(), to = track.as_str(), "clip reassigned");
        Ok(())
    }

    /// Trims one clip edge.
    ///
    /// Results shorter than `min_duration`, or trim ranges that would leave the
    /// source media, are rejected and leave the clip untouched.
    pub fn trim_clip(&mut self, id: ClipId, edit: TrimEdit, min_duration: f64) -> Result<()> {
        let clip = self.clip_mut(id)?;

        let (start_time, duration) = match edit {
            TrimEdit::Left {
                new_start,
                new_duration,
            } => {
                if new_start < 0.0 {
                    (0.0, new_duration + new_start)
                } else {
                    (new_start, new_duration)
                }
            }
            TrimEdit::Right { new_duration } => (clip.start_time, new_duration),
        };

        if !duration.is_finite() || !start_time.is_finite() {
            return Err(EngineError::InvalidDuration { duration });
        }
        if duration < min_duration {
            warn!(clip_id = %id, duration, min_duration, "trim rejected: below minimum duration");
            return Err(EngineError::DegenerateTrim {
                clip_id: id,
                duration,
                min_duration,
            });
        }

        let trim = match (clip.trim, edit.side()) {
            (Some(range), TrimSide::Left) => Some(TrimRange {
                trim_in: range.trim_in + (start_time - clip.start_time),
                ..range
            }),
            (Some(range), TrimSide::Right) => Some(TrimRange {
                trim_out: range.trim_out + (duration - clip.duration),
                ..range
            }),
            (None, _) => None,
        };
        if let Some(range) = trim.filter(|range| !range.is_valid()) {
            warn!(clip_id = %id, trim_in = range.trim_in, trim_out = range.trim_out, "trim rejected: outside source media");
            return Err(EngineError::TrimOutsideSource {
                clip_id: id,
                trim_in: range.trim_in,
                trim_out: range.trim_out,
                source_duration: range.source_duration,
            });
        }

        debug!(
            clip_id = %id,
            side = ?edit.side(),
            start_time,
            duration,
            "trim accepted"
        );
        clip.start_time = start_time;
        clip.duration = duration;
        clip.trim = trim;
        Ok(())
    }

    /// Splits a clip in two at `at`, returning the id of the new right half.
    ///
    /// `at` must lie strictly inside the clip.
    ///
    /// # Example
    /// ```
    /// use clipdeck_engine::{ClipMetadata, ClipStore, TrackKind};
    ///
    /// let mut store = ClipStore::new();
    /// let a = store.add_clip(TrackKind::Video, 10.0, ClipMetadata::media("a.mp4")).unwrap();
    /// let right = store.split_clip(a.id, 4.0).unwrap();
    /// assert_eq!(store.clip(a.id).unwrap().duration, 4.0);
    /// assert_eq!(store.clip(right).unwrap().start_time, 4.0);
    /// assert!(store.split_clip(a.id, 4.0).is_err());
    /// ```
    pub fn split_clip(&mut self, id: ClipId, at: f64) -> Result<ClipId> {
        let (track, index) = self.locate(id)?;
        let current = self.tracks[track.index()].clips[index].clone();
        if !current.contains_interior(at) {
            warn!(clip_id = %id, at, "split rejected: point outside clip interior");
            return Err(EngineError::InvalidSplitPoint {
                clip_id: id,
                at,
                start: current.start_time,
                end: current.end_time(),
            });
        }

        let left_duration = at - current.start_time;
        let right_duration = current.end_time() - at;
        let (left_trim, right_trim) = split_trim_range(current.trim, left_duration);
        let next_id = self.allocate_clip_id();

        let right = Clip {
            id: next_id,
            start_time: at,
            duration: right_duration,
            trim: right_trim,
            ..current.clone()
        };
        let left = Clip {
            duration: left_duration,
            trim: left_trim,
            ..current
        };

        debug!(
            clip_id = %id,
            next_clip_id = %next_id,
            at,
            left_duration,
            right_duration,
            "split accepted"
        );

        let clips = &mut self.tracks[track.index()].clips;
        clips[index] = left;
        clips.insert(index + 1, right);
        Ok(next_id)
    }

    /// Removes a clip and clears the selection when it pointed at it.
    pub fn delete_clip(&mut self, id: ClipId) -> Result<Clip> {
        let (track, index) = self.locate(id)?;
        let removed = self.tracks[track.index()].clips.remove(index);
        if self.selection == Some(id) {
            self.selection = None;
        }

        debug!(clip_id = %id, track = track.as_str(), clip_count = self.clip_count(), "clip deleted");
        Ok(removed)
    }

    pub fn select_clip(&mut self, id: ClipId) -> Result<()> {
        self.locate(id)?;
        self.selection = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn insert_clip(
        &mut self,
        track: TrackKind,
        start_time: f64,
        duration: f64,
        metadata: ClipMetadata,
    ) -> Result<Clip> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(EngineError::InvalidDuration { duration });
        }
        // A clip never plays past the end of its source media.
        let duration = match metadata.source_duration {
            Some(source) if source > 0.0 && duration > source => {
                debug!(duration, source, "clip duration capped to source length");
                source
            }
            _ => duration,
        };

        let clip = Clip::new(self.allocate_clip_id(), track, start_time, duration, metadata);
        debug!(
            clip_id = %clip.id,
            track = track.as_str(),
            start_time,
            duration,
            "clip added"
        );
        self.tracks[track.index()].clips.push(clip.clone());
        Ok(clip)
    }

    fn locate(&self, id: ClipId) -> Result<(TrackKind, usize)> {
        self.tracks
            .iter()
            .find_map(|track| {
                track
                    .clips
                    .iter()
                    .position(|clip| clip.id == id)
                    .map(|index| (track.kind, index))
            })
            .ok_or(EngineError::ClipNotFound { clip_id: id })
    }

    fn clip_mut(&mut self, id: ClipId) -> Result<&mut Clip> {
        let (track, index) = self.locate(id)?;
        Ok(&mut self.tracks[track.index()].clips[index])
    }

    fn allocate_clip_id(&mut self) -> ClipId {
        let id = ClipId(self.next_clip_id);
        self.next_clip_id += 1;
        id
    }
}

/// Clamps negative starts to the timeline origin. Non-finite starts are rejected.
fn clamp_time(t: f64) -> Result<f64> {
    if !t.is_finite() {
        return Err(EngineError::InvalidTime { time: t });
    }
    Ok(t.max(0.0))
}

fn split_trim_range(
    range: Option<TrimRange>,
    left_duration: f64,
) -> (Option<TrimRange>, Option<TrimRange>) {
    let Some(range) = range else {
        return (None, None);
    };

    let split = (range.trim_in + left_duration).clamp(range.trim_in, range.trim_out);
    let left = TrimRange {
        trim_out: split,
        ..range
    };
    let right = TrimRange {
        trim_in: split,
        ..range
    };
    (
        Some(left).filter(TrimRange::is_valid),
        Some(right).filter(TrimRange::is_valid),
    )
}

#[cfg(test)]
mod tests {
    use super::{ClipStore, TrimEdit};
    use crate::clip::{ClipId, ClipMetadata, TrackKind};
    use crate::error::EngineError;

    const MIN: f64 = 30.0 / 35.0;

    fn store_with_clip(duration: f64) -> (ClipStore, ClipId) {
        let mut store = ClipStore::new();
        let clip = store
            .add_clip(TrackKind::Video, duration, ClipMetadata::media("clip.mp4"))
            .expect("add clip");
        (store, clip.id)
    }

    #[test]
    fn add_clip_appends_after_last_ending_clip_of_the_track() {
        let mut store = ClipStore::new();
        store
            .add_clip_at(TrackKind::Audio, 20.0, 4.0, ClipMetadata::media("late"))
            .expect("add late clip");
        store
            .add_clip_at(TrackKind::Audio, 0.0, 3.0, ClipMetadata::media("early"))
            .expect("add early clip");

        let appended = store
            .add_clip(TrackKind::Audio, 2.0, ClipMetadata::media("next"))
            .expect("append");

        assert_eq!(appended.start_time, 24.0);
        assert_eq!(store.track_end(TrackKind::Video), 0.0);
    }

    #[test]
    fn tracks_append_independently() {
        let mut store = ClipStore::new();
        store
            .add_clip(TrackKind::Video, 10.0, ClipMetadata::media("v"))
            .expect("add video");

        let text = store
            .add_clip(TrackKind::Text, 5.0, ClipMetadata::text("Title"))
            .expect("add text");

        assert_eq!(text.start_time, 0.0);
        assert_eq!(store.timeline_end(), 10.0);
    }

    #[test]
    fn add_clip_at_allows_overlap_and_clamps_negative_start() {
        let (mut store, _) = store_with_clip(10.0);

        let overlapping = store
            .add_clip_at(TrackKind::Video, 5.0, 10.0, ClipMetadata::media("overlap"))
            .expect("overlap is allowed");
        let clamped = store
            .add_clip_at(TrackKind::Video, -3.0, 1.0, ClipMetadata::media("clamped"))
            .expect("negative start is clamped");

        assert_eq!(overlapping.start_time, 5.0);
        assert_eq!(clamped.start_time, 0.0);
        assert_eq!(store.track(TrackKind::Video).clips.len(), 3);
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        let mut store = ClipStore::new();

        for duration in [0.0, -1.0, f64::NAN] {
            let result = store.add_clip(TrackKind::Video, duration, ClipMetadata::media("bad"));
            assert!(matches!(result, Err(EngineError::InvalidDuration { .. })));
        }
        assert_eq!(store.clip_count(), 0);
    }

    #[test]
    fn move_clip_never_goes_below_zero() {
        let (mut store, id) = store_with_clip(10.0);

        for requested in [-5.0, -0.001, f64::NEG_INFINITY] {
            let applied = store.move_clip(id, requested).expect("move");
            assert_eq!(applied, 0.0);
        }
        assert_eq!(store.move_clip(id, 7.5).expect("move"), 7.5);
        assert_eq!(store.clip(id).expect("clip").start_time, 7.5);
    }

    #[test]
    fn move_unknown_clip_reports_not_found() {
        let mut store = ClipStore::new();

        let result = store.move_clip(ClipId(42), 1.0);
        assert!(matches!(
            result,
            Err(EngineError::ClipNotFound { clip_id: ClipId(42) })
        ));
    }

    #[test]
    fn right_trim_changes_only_duration() {
        let (mut store, id) = store_with_clip(10.0);

        store
            .trim_clip(id, TrimEdit::Right { new_duration: 6.0 }, MIN)
            .expect("trim");

        let clip = store.clip(id).expect("clip");
        assert_eq!(clip.start_time, 0.0);
        assert_eq!(clip.duration, 6.0);
    }

    #[test]
    fn left_trim_keeps_end_fixed() {
        let (mut store, id) = store_with_clip(10.0);
        store.move_clip(id, 2.0).expect("move");

        store
            .trim_clip(
                id,
                TrimEdit::Left {
                    new_start: 5.0,
                    new_duration: 7.0,
                },
                MIN,
            )
            .expect("trim");

        let clip = store.clip(id).expect("clip");
        assert_eq!(clip.start_time, 5.0);
        assert_eq!(clip.end_time(), 12.0);
    }

    #[test]
    fn left_trim_past_origin_is_clamped_with_end_fixed() {
        let (mut store, id) = store_with_clip(10.0);
        store.move_clip(id, 2.0).expect("move");

        store
            .trim_clip(
                id,
                TrimEdit::Left {
                    new_start: -1.0,
                    new_duration: 13.0,
                },
                MIN,
            )
            .expect("trim");

        let clip = store.clip(id).expect("clip");
        assert_eq!(clip.start_time, 0.0);
        assert_eq!(clip.duration, 12.0);
    }

    #[test]
    fn trim_below_floor_is_rejected_without_change() {
        let (mut store, id) = store_with_clip(10.0);

        let result = store.trim_clip(id, TrimEdit::Right { new_duration: MIN / 2.0 }, MIN);

        assert!(matches!(result, Err(EngineError::DegenerateTrim { .. })));
        assert_eq!(store.clip(id).expect("clip").duration, 10.0);
    }

    #[test]
    fn trim_never_produces_duration_below_floor() {
        let (mut store, id) = store_with_clip(10.0);

        for step in 0..200 {
            let requested = 10.0 - f64::from(step) * 0.07;
            let _ = store.trim_clip(id, TrimEdit::Right { new_duration: requested }, MIN);
            assert!(store.clip(id).expect("clip").duration >= MIN);
        }
    }

    #[test]
    fn trim_moves_source_range_with_the_edge() {
        let mut store = ClipStore::new();
        let clip = store
            .add_clip(
                TrackKind::Video,
                10.0,
                ClipMetadata::media("src.mp4").with_source_duration(10.0),
            )
            .expect("add");

        store
            .trim_clip(
                clip.id,
                TrimEdit::Left {
                    new_start: 3.0,
                    new_duration: 7.0,
                },
                MIN,
            )
            .expect("left trim");
        store
            .trim_clip(clip.id, TrimEdit::Right { new_duration: 5.0 }, MIN)
            .expect("right trim");

        let trim = store.clip(clip.id).expect("clip").trim.expect("trim range");
        assert_eq!(trim.trim_in, 3.0);
        assert_eq!(trim.trim_out, 8.0);
    }

    #[test]
    fn trim_beyond_source_media_is_rejected() {
        let mut store = ClipStore::new();
        let clip = store
            .add_clip(
                TrackKind::Video,
                10.0,
                ClipMetadata::media("src.mp4").with_source_duration(10.0),
            )
            .expect("add");

        let result = store.trim_clip(clip.id, TrimEdit::Right { new_duration: 12.0 }, MIN);

        assert!(matches!(result, Err(EngineError::TrimOutsideSource { .. })));
        assert_eq!(store.clip(clip.id).expect("clip").duration, 10.0);
    }

    #[test]
    fn split_preserves_total_duration_and_copies_metadata() {
        let mut store = ClipStore::new();
        let clip = store
            .add_clip(
                TrackKind::Video,
                10.0,
                ClipMetadata::media("a.mp4")
                    .with_thumbnail("thumb://a")
                    .with_source_duration(10.0),
            )
            .expect("add");

        let right_id = store.split_clip(clip.id, 4.0).expect("split");

        let left = store.clip(clip.id).expect("left");
        let right = store.clip(right_id).expect("right");
        assert_ne!(left.id, right.id);
        assert_eq!(left.duration + right.duration, 10.0);
        assert_eq!((left.start_time, left.end_time()), (0.0, 4.0));
        assert_eq!((right.start_time, right.end_time()), (4.0, 10.0));
        assert_eq!(right.name, "a.mp4");
        assert_eq!(right.thumbnail.as_deref(), Some("thumb://a"));
        assert_eq!(left.trim.expect("left trim").trim_out, 4.0);
        assert_eq!(right.trim.expect("right trim").trim_in, 4.0);
    }

    #[test]
    fn split_at_or_outside_edges_is_a_no_op() {
        let (mut store, id) = store_with_clip(10.0);
        let before = store.clone();

        for at in [-1.0, 0.0, 10.0, 15.0] {
            let result = store.split_clip(id, at);
            assert!(matches!(result, Err(EngineError::InvalidSplitPoint { .. })));
        }
        assert_eq!(store, before);
    }

    #[test]
    fn failed_split_does_not_consume_clip_id() {
        let (mut store, id) = store_with_clip(10.0);
        let _ = store.split_clip(id, 10.0);

        let right = store.split_clip(id, 5.0).expect("split");
        assert_eq!(right, ClipId(2));
    }

    #[test]
    fn delete_selected_clip_clears_selection() {
        let (mut store, id) = store_with_clip(10.0);
        store.select_clip(id).expect("select");

        let removed = store.delete_clip(id).expect("delete");

        assert_eq!(removed.id, id);
        assert_eq!(store.selected(), None);
        assert_eq!(store.clip_count(), 0);
    }

    #[test]
    fn delete_other_clip_keeps_selection() {
        let (mut store, id) = store_with_clip(10.0);
        let other = store
            .add_clip(TrackKind::Audio, 3.0, ClipMetadata::media("b"))
            .expect("add");
        store.select_clip(id).expect("select");

        store.delete_clip(other.id).expect("delete");

        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn select_unknown_clip_keeps_previous_selection() {
        let (mut store, id) = store_with_clip(10.0);
        store.select_clip(id).expect("select");

        assert!(store.select_clip(ClipId(99)).is_err());
        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn non_finite_start_is_rejected() {
        let (mut store, id) = store_with_clip(10.0);

        let moved = store.move_clip(id, f64::INFINITY);
        let added = store.add_clip_at(
            TrackKind::Audio,
            f64::NAN,
            4.0,
            ClipMetadata::media("a.wav"),
        );

        assert!(matches!(moved, Err(EngineError::InvalidTime { .. })));
        assert!(matches!(added, Err(EngineError::InvalidTime { .. })));
        assert_eq!(store.clip(id).expect("clip").start_time, 0.0);
        assert_eq!(store.track_end(TrackKind::Video), 10.0);
        assert_eq!(store.clip_count(), 1);
    }

    #[test]
    fn duration_is_capped_at_source_length() {
        let mut store = ClipStore::new();

        let clip = store
            .add_clip(
                TrackKind::Video,
                12.0,
                ClipMetadata::media("short.mp4").with_source_duration(8.0),
            )
            .expect("add");

        assert_eq!(clip.duration, 8.0);
        let trim = clip.trim.expect("trim range");
        assert_eq!((trim.trim_in, trim.trim_out), (0.0, 8.0));
        assert_eq!(store.track_end(TrackKind::Video), 8.0);
    }

    #[test]
    fn move_clip_to_track_keeps_timing() {
        let (mut store, id) = store_with_clip(10.0);
        store.move_clip(id, 3.0).expect("move");

        store
            .move_clip_to_track(id, TrackKind::Audio)
            .expect("reassign");

        let clip = store.clip(id).expect("clip");
        assert_eq!(clip.track, TrackKind::Audio);
        assert_eq!(clip.start_time, 3.0);
        assert!(store.track(TrackKind::Video).clips.is_empty());
    }
}
