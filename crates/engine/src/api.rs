use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clip::{Clip, ClipId, ClipMetadata, TrackKind};
use crate::config::EditorConfig;
use crate::error::{EngineError, Result};
use crate::interaction::{
    Interaction, InteractionContext, InteractionEngine, PointerSession, PointerTarget, ToolMode,
    ToolbarState,
};
use crate::playhead::{Playhead, TimelineLayout};
use crate::projector::{RenderFrame, project};
use crate::store::{ClipStore, TrimEdit};
use crate::time::{TimeScale, ZoomLevel};

const DEFAULT_TEXT_CONTENT: &str = "Text";

/// Kind of media handed over by the import collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

impl MediaKind {
    /// Track a freshly imported item lands on.
    pub fn track(self) -> TrackKind {
        match self {
            Self::Video | Self::Image => TrackKind::Video,
            Self::Audio => TrackKind::Audio,
        }
    }
}

/// Metadata of an imported media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaImport {
    pub name: String,
    pub kind: MediaKind,
    /// Decoded length, when the importer could determine it.
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
}

impl MediaImport {
    pub fn new(name: impl Into<String>, kind: MediaKind, duration: Option<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            duration,
            thumbnail: None,
        }
    }

    fn known_duration(&self) -> Option<f64> {
        self.duration
            .filter(|duration| duration.is_finite() && *duration > 0.0)
    }

    fn metadata(&self) -> ClipMetadata {
        let mut metadata = ClipMetadata::media(self.name.clone());
        metadata.thumbnail = self.thumbnail.clone();
        // Still images have no source length to trim against.
        if self.kind != MediaKind::Image {
            metadata.source_duration = self.known_duration();
        }
        metadata
    }
}

/// Commands accepted by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Appends imported media to the track matching its kind.
    ImportMedia {
        media: MediaImport,
    },
    /// Places library media at surface position `x` on `track`.
    DropMedia {
        media: MediaImport,
        track: TrackKind,
        x: f64,
    },
    AddTextOverlay {
        content: String,
    },
    PointerDown {
        x: f64,
        target: PointerTarget,
    },
    PointerMove {
        x: f64,
    },
    PointerUp {
        x: f64,
    },
    /// Pointer capture was lost; ends the active session in place.
    PointerCancel,
    /// Splits the selected clip at the current playhead time.
    ///
    /// # Example
    /// ```
    /// use clipdeck_engine::{Command, Editor, MediaImport, MediaKind};
    ///
    /// let mut editor = Editor::with_defaults();
    /// let clip = editor
    ///     .import_media(MediaImport::new("a.mp4", MediaKind::Video, Some(10.0)))
    ///     .unwrap();
    /// editor.handle_command(Command::SelectClip { clip_id: clip.id }).unwrap();
    /// editor
    ///     .handle_command(Command::PlaybackTime { current: 4.0, duration: 10.0 })
    ///     .unwrap();
    /// editor.handle_command(Command::SplitSelected).unwrap();
    /// assert_eq!(editor.store().clip_count(), 2);
    /// ```
    SplitSelected,
    SplitClip {
        clip_id: ClipId,
        at: f64,
    },
    DeleteSelected,
    DeleteClip {
        clip_id: ClipId,
    },
    SelectClip {
        clip_id: ClipId,
    },
    ClearSelection,
    MoveClip {
        clip_id: ClipId,
        start_time: f64,
    },
    /// Trims with the minimum duration of the current zoom level.
    TrimClip {
        clip_id: ClipId,
        edit: TrimEdit,
    },
    MoveClipToTrack {
        clip_id: ClipId,
        track: TrackKind,
    },
    SetZoom {
        level: i64,
    },
    ZoomIn,
    ZoomOut,
    SetTool {
        tool: ToolMode,
    },
    /// Periodic transport report of playback position and media length.
    PlaybackTime {
        current: f64,
        duration: f64,
    },
}

/// Events emitted by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Rerender(RenderFrame),
    PlayheadMoved { time: f64, position_px: f64 },
    LayoutChanged(TimelineLayout),
    SeekRequested { time: f64 },
    ClipAdded(Clip),
    Message(UserMessage),
}

/// Category of a user-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    InvalidSelection,
    InvalidSplitPoint,
    DegenerateTrim,
    ClipNotFound,
    Other,
}

impl From<&EngineError> for EngineErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::InvalidSelection { .. } => Self::InvalidSelection,
            EngineError::InvalidSplitPoint { .. } => Self::InvalidSplitPoint,
            EngineError::DegenerateTrim { .. } | EngineError::TrimOutsideSource { .. } => {
                Self::DegenerateTrim
            }
            EngineError::ClipNotFound { .. } => Self::ClipNotFound,
            _ => Self::Other,
        }
    }
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Transient advisory shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub severity: Severity,
    pub text: String,
    pub kind: Option<EngineErrorKind>,
}

impl UserMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
            kind: None,
        }
    }

    pub fn from_error(error: &EngineError) -> Self {
        let kind = EngineErrorKind::from(error);
        let severity = match kind {
            EngineErrorKind::InvalidSelection
            | EngineErrorKind::InvalidSplitPoint
            | EngineErrorKind::DegenerateTrim => Severity::Warning,
            EngineErrorKind::ClipNotFound | EngineErrorKind::Other => Severity::Error,
        };
        Self {
            severity,
            text: error.to_string(),
            kind: Some(kind),
        }
    }
}

/// Timeline core: clip store, pointer interaction, zoom and playhead.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    scale: TimeScale,
    zoom: ZoomLevel,
    store: ClipStore,
    interaction: InteractionEngine,
    playhead: Playhead,
}

impl Editor {
    /// Creates an editor after validating `config`.
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let scale = TimeScale::from_config(&config);
        Ok(Self {
            zoom: scale.clamp_zoom(i64::from(config.initial_zoom)),
            playhead: Playhead::new(config.default_visible_duration),
            scale,
            config,
            store: ClipStore::new(),
            interaction: InteractionEngine::default(),
        })
    }

    /// Creates an editor with [`EditorConfig::default`].
    pub fn with_defaults() -> Self {
        let config = EditorConfig::default();
        let scale = TimeScale::from_config(&config);
        Self {
            zoom: ZoomLevel(config.initial_zoom),
            playhead: Playhead::new(config.default_visible_duration),
            scale,
            config,
            store: ClipStore::new(),
            interaction: InteractionEngine::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scale(&self) -> &TimeScale {
        &self.scale
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn store(&self) -> &ClipStore {
        &self.store
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn interaction(&self) -> &InteractionEngine {
        &self.interaction
    }

    pub fn toolbar(&self) -> ToolbarState {
        ToolbarState::new(
            self.interaction.tool(),
            self.store.selected().is_some(),
            self.zoom,
            &self.scale,
        )
    }

    /// Projects the current state for the drawing layer.
    pub fn render_frame(&self) -> RenderFrame {
        project(&self.store, &self.scale, self.zoom, &self.playhead)
    }

    /// Appends imported media and returns the created clip.
    pub fn import_media(&mut self, media: MediaImport) -> Result<Clip> {
        let duration = media
            .known_duration()
            .unwrap_or(self.config.default_media_duration);
        let clip = self
            .store
            .add_clip(media.kind.track(), duration, media.metadata())?;
        info!(clip_id = %clip.id, name = %clip.name, duration, "media imported");
        Ok(clip)
    }

    /// Applies one command and returns emitted events.
    pub fn handle_command(&mut self, command: Command) -> Result<Vec<Event>> {
        match command {
            Command::ImportMedia { media } => {
                let clip = self.import_media(media)?;
                let message = UserMessage::info(format!("Imported {}", clip.name));
                Ok(vec![
                    Event::ClipAdded(clip),
                    self.rerender(),
                    Event::Message(message),
                ])
            }
            Command::DropMedia { media, track, x } => self.drop_media(media, track, x),
            Command::AddTextOverlay { content } => self.add_text_overlay(content),
            Command::PointerDown { x, target } => {
                let interaction = self.with_pointer(|engine, ctx| engine.pointer_down(ctx, x, target));
                Ok(self.interaction_events(interaction))
            }
            Command::PointerMove { x } => {
                let interaction = self.with_pointer(|engine, ctx| engine.pointer_move(ctx, x));
                Ok(self.interaction_events(interaction))
            }
            Command::PointerUp { x } => {
                let interaction = self.with_pointer(|engine, ctx| engine.pointer_up(ctx, x));
                Ok(self.interaction_events(interaction))
            }
            Command::PointerCancel => {
                let interaction = self.interaction.pointer_cancel();
                Ok(self.interaction_events(interaction))
            }
            Command::SplitSelected => {
                let clip_id = self.require_selection("split")?;
                self.split(clip_id, self.playhead.current_time())
            }
            Command::SplitClip { clip_id, at } => self.split(clip_id, at),
            Command::DeleteSelected => {
                let clip_id = self.require_selection("delete")?;
                self.delete(clip_id)
            }
            Command::DeleteClip { clip_id } => self.delete(clip_id),
            Command::SelectClip { clip_id } => {
                self.store.select_clip(clip_id)?;
                Ok(vec![self.rerender()])
            }
            Command::ClearSelection => {
                self.store.clear_selection();
                Ok(vec![self.rerender()])
            }
            Command::MoveClip {
                clip_id,
                start_time,
            } => {
                self.store.move_clip(clip_id, start_time)?;
                Ok(vec![self.rerender()])
            }
            Command::TrimClip { clip_id, edit } => {
                let min_duration = self.scale.min_clip_duration(self.zoom);
                self.store.trim_clip(clip_id, edit, min_duration)?;
                Ok(vec![self.rerender()])
            }
            Command::MoveClipToTrack { clip_id, track } => {
                self.store.move_clip_to_track(clip_id, track)?;
                Ok(vec![self.rerender()])
            }
            Command::SetZoom { level } => Ok(self.set_zoom(level)),
            Command::ZoomIn => Ok(self.set_zoom(i64::from(self.zoom.get()) + 1)),
            Command::ZoomOut => Ok(self.set_zoom(i64::from(self.zoom.get()) - 1)),
            Command::SetTool { tool } => {
                self.interaction.set_tool(tool);
                debug!(?tool, "tool changed");
                Ok(Vec::new())
            }
            Command::PlaybackTime { current, duration } => {
                Ok(self.update_playback_time(current, duration))
            }
        }
    }

    fn drop_media(&mut self, media: MediaImport, track: TrackKind, x: f64) -> Result<Vec<Event>> {
        let start_time = self
            .scale
            .pixels_to_time(x - self.config.track_left_px, self.zoom);
        let duration = media
            .known_duration()
            .unwrap_or(self.config.default_media_duration);
        let clip = self
            .store
            .add_clip_at(track, start_time, duration, media.metadata())?;
        info!(clip_id = %clip.id, track = track.as_str(), start_time = clip.start_time, "media dropped");
        Ok(vec![Event::ClipAdded(clip), self.rerender()])
    }

    fn add_text_overlay(&mut self, content: String) -> Result<Vec<Event>> {
        let content = match content.trim() {
            "" => DEFAULT_TEXT_CONTENT.to_owned(),
            trimmed => trimmed.to_owned(),
        };
        let clip = self.store.add_clip(
            TrackKind::Text,
            self.config.text_clip_duration,
            ClipMetadata::text(content),
        )?;
        info!(clip_id = %clip.id, start_time = clip.start_time, "text overlay added");
        Ok(vec![
            Event::ClipAdded(clip),
            self.rerender(),
            Event::Message(UserMessage::info("Text overlay added")),
        ])
    }

    fn split(&mut self, clip_id: ClipId, at: f64) -> Result<Vec<Event>> {
        let next_clip_id = self.store.split_clip(clip_id, at)?;
        info!(clip_id = %clip_id, %next_clip_id, at, clip_count = self.store.clip_count(), "split applied");
        Ok(vec![
            self.rerender(),
            Event::Message(UserMessage::info("Clip split")),
        ])
    }

    fn delete(&mut self, clip_id: ClipId) -> Result<Vec<Event>> {
        let removed = self.store.delete_clip(clip_id)?;
        info!(clip_id = %clip_id, clip_count = self.store.clip_count(), "delete applied");
        Ok(vec![
            self.rerender(),
            Event::Message(UserMessage::info(format!("Deleted {}", removed.name))),
        ])
    }

    fn set_zoom(&mut self, level: i64) -> Vec<Event> {
        let zoom = self.scale.clamp_zoom(level);
        if zoom != self.zoom {
            debug!(from = self.zoom.get(), to = zoom.get(), "zoom changed");
        }
        self.zoom = zoom;
        vec![
            Event::LayoutChanged(self.playhead.layout(&self.scale, self.zoom)),
            self.rerender(),
        ]
    }

    fn update_playback_time(&mut self, current: f64, duration: f64) -> Vec<Event> {
        let update = self
            .playhead
            .update_time(current, duration, &self.scale, self.zoom);
        let mut events = vec![Event::PlayheadMoved {
            time: update.current_time,
            position_px: update.position_px,
        }];
        if let Some(layout) = update.layout {
            events.push(Event::LayoutChanged(layout));
            events.push(self.rerender());
        }
        events
    }

    fn interaction_events(&self, interaction: Interaction) -> Vec<Event> {
        match interaction {
            Interaction::Ignored | Interaction::TrimRejected { .. } => Vec::new(),
            Interaction::DragStarted { .. }
            | Interaction::TrimStarted { .. }
            | Interaction::SelectionCleared
            | Interaction::Moved { .. }
            | Interaction::Trimmed { .. } => vec![self.rerender()],
            Interaction::SeekRequested { time } => vec![Event::SeekRequested { time }],
            Interaction::Released(session) => match session {
                // The release may have applied the final position itself.
                PointerSession::Dragging(drag) if drag.moved => {
                    info!(clip_id = %drag.clip_id, from = drag.initial_start, "drag finished");
                    vec![self.rerender()]
                }
                PointerSession::Trimming(trim) => {
                    info!(clip_id = %trim.clip_id, side = ?trim.side, "trim finished");
                    Vec::new()
                }
                _ => Vec::new(),
            },
        }
    }

    fn with_pointer<F>(&mut self, handle: F) -> Interaction
    where
        F: FnOnce(&mut InteractionEngine, &mut InteractionContext<'_>) -> Interaction,
    {
        let mut ctx = InteractionContext {
            store: &mut self.store,
            scale: &self.scale,
            zoom: self.zoom,
            track_left_px: self.config.track_left_px,
            visible_duration: self.playhead.visible_duration(),
        };
        handle(&mut self.interaction, &mut ctx)
    }

    fn require_selection(&self, action: &'static str) -> Result<ClipId> {
        self.store
            .selected()
            .ok_or(EngineError::InvalidSelection { action })
    }

    fn rerender(&self) -> Event {
        Event::Rerender(self.render_frame())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_defaults()
    }
}
