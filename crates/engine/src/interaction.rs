use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clip::ClipId;
use crate::error::EngineError;
use crate::store::{ClipStore, TrimEdit, TrimSide};
use crate::time::{TimeScale, ZoomLevel};

/// Element under the pointer when a press starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    ClipBody(ClipId),
    TrimHandle { clip_id: ClipId, side: TrimSide },
    Ruler,
    Background,
}

/// Active toolbar tool. It never changes how pointer input is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Select,
    Razor,
    Text,
}

/// Which toolbar actions are currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarState {
    pub split: bool,
    pub delete: bool,
    pub add_text: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
}

impl ToolbarState {
    pub fn new(tool: ToolMode, has_selection: bool, zoom: ZoomLevel, scale: &TimeScale) -> Self {
        let (zoom_min, zoom_max) = scale.zoom_bounds();
        Self {
            split: has_selection && matches!(tool, ToolMode::Select | ToolMode::Razor),
            delete: has_selection && tool == ToolMode::Select,
            add_text: matches!(tool, ToolMode::Select | ToolMode::Text),
            zoom_in: zoom < zoom_max,
            zoom_out: zoom > zoom_min,
        }
    }
}

/// Ephemeral state of a clip drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub clip_id: ClipId,
    /// Pointer distance from the clip's left edge at press time.
    pub offset_px: f64,
    pub origin_x: f64,
    pub initial_start: f64,
    pub moved: bool,
}

/// Ephemeral state of an edge trim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimSession {
    pub clip_id: ClipId,
    pub side: TrimSide,
    pub origin_x: f64,
    pub initial_start: f64,
    pub initial_duration: f64,
}

/// The single pointer session slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSession {
    Dragging(DragSession),
    Trimming(TrimSession),
    Scrubbing,
}

/// Result of feeding one pointer event to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Ignored,
    DragStarted { clip_id: ClipId },
    TrimStarted { clip_id: ClipId, side: TrimSide },
    SelectionCleared,
    Moved { clip_id: ClipId, start_time: f64 },
    Trimmed { clip_id: ClipId },
    TrimRejected { clip_id: ClipId },
    SeekRequested { time: f64 },
    Released(PointerSession),
}

/// Everything a pointer event may read or mutate.
#[derive(Debug)]
pub struct InteractionContext<'a> {
    pub store: &'a mut ClipStore,
    pub scale: &'a TimeScale,
    pub zoom: ZoomLevel,
    pub track_left_px: f64,
    pub visible_duration: f64,
}

impl InteractionContext<'_> {
    fn surface_to_time(&self, x: f64) -> f64 {
        self.scale.pixels_to_time(x - self.track_left_px, self.zoom)
    }
}

/// Pointer state machine: `Idle -> {Dragging | Trimming | Scrubbing} -> Idle`.
///
/// Press starts a session, move updates the store, release or cancel always
/// ends it. A press while a session is active is ignored.
///
/// # Example
/// ```
/// use clipdeck_engine::interaction::{Interaction, InteractionContext, InteractionEngine, PointerTarget};
/// use clipdeck_engine::{ClipMetadata, ClipStore, EditorConfig, TimeScale, TrackKind, ZoomLevel};
///
/// let scale = TimeScale::from_config(&EditorConfig::default());
/// let mut store = ClipStore::new();
/// let clip = store.add_clip(TrackKind::Video, 10.0, ClipMetadata::media("a.mp4")).unwrap();
/// let mut engine = InteractionEngine::default();
/// let mut ctx = InteractionContext {
///     store: &mut store,
///     scale: &scale,
///     zoom: ZoomLevel(1),
///     track_left_px: 0.0,
///     visible_duration: 60.0,
/// };
///
/// engine.pointer_down(&mut ctx, 10.0, PointerTarget::ClipBody(clip.id));
/// let moved = engine.pointer_move(&mut ctx, 80.0);
/// assert_eq!(moved, Interaction::Moved { clip_id: clip.id, start_time: 2.0 });
/// engine.pointer_up(&mut ctx, 80.0);
/// assert!(engine.session().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InteractionEngine {
    session: Option<PointerSession>,
    tool: ToolMode,
}

impl InteractionEngine {
    pub fn session(&self) -> Option<&PointerSession> {
        self.session.as_ref()
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        self.tool = tool;
    }

    pub fn pointer_down(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        x: f64,
        target: PointerTarget,
    ) -> Interaction {
        if let Some(active) = &self.session {
            warn!(?active, ?target, "pointer down ignored: session still active");
            return Interaction::Ignored;
        }

        match target {
            PointerTarget::ClipBody(clip_id) => {
                let Some(clip) = ctx.store.clip(clip_id) else {
                    warn!(clip_id = %clip_id, "drag ignored: clip not found");
                    return Interaction::Ignored;
                };
                let clip_left_px = ctx.scale.time_to_pixels(clip.start_time, ctx.zoom);
                let session = DragSession {
                    clip_id,
                    offset_px: x - ctx.track_left_px - clip_left_px,
                    origin_x: x,
                    initial_start: clip.start_time,
                    moved: false,
                };
                if ctx.store.select_clip(clip_id).is_err() {
                    return Interaction::Ignored;
                }

                debug!(clip_id = %clip_id, offset_px = session.offset_px, "drag started");
                self.session = Some(PointerSession::Dragging(session));
                Interaction::DragStarted { clip_id }
            }
            PointerTarget::TrimHandle { clip_id, side } => {
                let Some(clip) = ctx.store.clip(clip_id) else {
                    warn!(clip_id = %clip_id, "trim ignored: clip not found");
                    return Interaction::Ignored;
                };
                let session = TrimSession {
                    clip_id,
                    side,
                    origin_x: x,
                    initial_start: clip.start_time,
                    initial_duration: clip.duration,
                };
                if ctx.store.select_clip(clip_id).is_err() {
                    return Interaction::Ignored;
                }

                debug!(clip_id = %clip_id, ?side, "trim started");
                self.session = Some(PointerSession::Trimming(session));
                Interaction::TrimStarted { clip_id, side }
            }
            PointerTarget::Ruler => {
                self.session = Some(PointerSession::Scrubbing);
                Interaction::SeekRequested {
                    time: seek_time(ctx, x),
                }
            }
            PointerTarget::Background => {
                if ctx.store.selected().is_none() {
                    return Interaction::Ignored;
                }
                ctx.store.clear_selection();
                Interaction::SelectionCleared
            }
        }
    }

    pub fn pointer_move(&mut self, ctx: &mut InteractionContext<'_>, x: f64) -> Interaction {
        let Some(session) = self.session.as_mut() else {
            return Interaction::Ignored;
        };

        match session {
            PointerSession::Dragging(drag) => {
                let clip_id = drag.clip_id;
                let new_start = ctx.surface_to_time(x - drag.offset_px);
                match ctx.store.move_clip(clip_id, new_start) {
                    Ok(start_time) => {
                        drag.moved |= x != drag.origin_x;
                        Interaction::Moved {
                            clip_id,
                            start_time,
                        }
                    }
                    Err(error) => self.abandon(error),
                }
            }
            PointerSession::Trimming(trim) => {
                let trim = *trim;
                let delta = ctx.scale.pixels_to_time(x - trim.origin_x, ctx.zoom);
                let edit = match trim.side {
                    TrimSide::Left => TrimEdit::Left {
                        new_start: trim.initial_start + delta,
                        new_duration: trim.initial_duration - delta,
                    },
                    TrimSide::Right => TrimEdit::Right {
                        new_duration: trim.initial_duration + delta,
                    },
                };
                let min_duration = ctx.scale.min_clip_duration(ctx.zoom);
                match ctx.store.trim_clip(trim.clip_id, edit, min_duration) {
                    Ok(()) => Interaction::Trimmed {
                        clip_id: trim.clip_id,
                    },
                    Err(
                        EngineError::DegenerateTrim { .. } | EngineError::TrimOutsideSource { .. },
                    ) => Interaction::TrimRejected {
                        clip_id: trim.clip_id,
                    },
                    Err(error) => self.abandon(error),
                }
            }
            PointerSession::Scrubbing => Interaction::SeekRequested {
                time: seek_time(ctx, x),
            },
        }
    }

    /// Ends the active session wherever the pointer was released.
    pub fn pointer_up(&mut self, ctx: &mut InteractionContext<'_>, x: f64) -> Interaction {
        // A release away from the press point with no intermediate moves.
        let unapplied_drag = matches!(
            &self.session,
            Some(PointerSession::Dragging(drag)) if x != drag.origin_x && !drag.moved
        );
        if unapplied_drag {
            let _ = self.pointer_move(ctx, x);
        }
        self.release()
    }

    /// Ends the active session without applying the release position.
    pub fn pointer_cancel(&mut self) -> Interaction {
        self.release()
    }

    fn release(&mut self) -> Interaction {
        match self.session.take() {
            Some(session) => {
                debug!(?session, "pointer session released");
                Interaction::Released(session)
            }
            None => Interaction::Ignored,
        }
    }

    fn abandon(&mut self, error: EngineError) -> Interaction {
        warn!(%error, "pointer session abandoned");
        self.session = None;
        Interaction::Ignored
    }
}

fn seek_time(ctx: &InteractionContext<'_>, x: f64) -> f64 {
    ctx.surface_to_time(x).clamp(0.0, ctx.visible_duration.max(0.0))
}
