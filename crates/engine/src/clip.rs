use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque clip identifier, never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl Display for ClipId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "clip-{}", self.0)
    }
}

/// The fixed set of timeline lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

impl TrackKind {
    /// Tracks in top-to-bottom display order.
    pub const ALL: [TrackKind; 3] = [TrackKind::Video, TrackKind::Audio, TrackKind::Text];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Video => 0,
            Self::Audio => 1,
            Self::Text => 2,
        }
    }
}

/// Type discriminant of a clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClipKind {
    Media,
    Text { content: String },
}

/// Display and source metadata supplied when a clip is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub name: String,
    pub thumbnail: Option<String>,
    /// Length of the underlying media, when known.
    pub source_duration: Option<f64>,
    pub kind: ClipKind,
}

impl ClipMetadata {
    pub fn media(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            thumbnail: None,
            source_duration: None,
            kind: ClipKind::Media,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            name: content.clone(),
            thumbnail: None,
            source_duration: None,
            kind: ClipKind::Text { content },
        }
    }

    pub fn with_source_duration(mut self, source_duration: f64) -> Self {
        self.source_duration = Some(source_duration);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// Portion of the source media a clip plays, in source seconds.
///
/// Always satisfies `0 <= trim_in < trim_out <= source_duration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub trim_in: f64,
    pub trim_out: f64,
    pub source_duration: f64,
}

impl TrimRange {
    pub(crate) fn is_valid(&self) -> bool {
        0.0 <= self.trim_in && self.trim_in < self.trim_out && self.trim_out <= self.source_duration
    }
}

/// A timed placement of media or text on one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub track: TrackKind,
    pub start_time: f64,
    pub duration: f64,
    pub trim: Option<TrimRange>,
    pub name: String,
    pub thumbnail: Option<String>,
    pub kind: ClipKind,
}

impl Clip {
    pub(crate) fn new(
        id: ClipId,
        track: TrackKind,
        start_time: f64,
        duration: f64,
        metadata: ClipMetadata,
    ) -> Self {
        let trim = metadata
            .source_duration
            .filter(|source| *source > 0.0)
            .map(|source_duration| TrimRange {
                trim_in: 0.0,
                trim_out: duration.min(source_duration),
                source_duration,
            });

        Self {
            id,
            track,
            start_time,
            duration,
            trim,
            name: metadata.name,
            thumbnail: metadata.thumbnail,
            kind: metadata.kind,
        }
    }

    /// Exclusive end of the occupied interval `[start_time, end_time)`.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Returns true when `t` lies strictly inside the clip, excluding both edges.
    pub fn contains_interior(&self, t: f64) -> bool {
        self.start_time < t && t < self.end_time()
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ClipKind::Text { .. })
    }
}
