//! UI-agnostic timeline core for the Clipdeck editor.

pub mod api;
pub mod clip;
pub mod config;
pub mod error;
pub mod host;
pub mod interaction;
pub mod playhead;
pub mod projector;
pub mod store;
pub mod time;

pub use api::{
    Command, Editor, EngineErrorKind, Event, MediaImport, MediaKind, Severity, UserMessage,
};
pub use clip::{Clip, ClipId, ClipKind, ClipMetadata, TrackKind, TrimRange};
pub use config::EditorConfig;
pub use error::{EngineError, Result};
pub use host::{EditorHost, dispatch};
pub use interaction::{PointerTarget, ToolMode, ToolbarState};
pub use playhead::{Playhead, TimelineLayout};
pub use projector::{ClipRect, RenderFrame};
pub use store::{ClipStore, Track, TrimEdit, TrimSide};
pub use time::{RulerTick, TimeScale, ZoomLevel};
