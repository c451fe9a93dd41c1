use clipdeck_engine::{ClipRect, Command, PointerTarget, RenderFrame, TrackKind, TrimSide};
use iced::widget::canvas::{self, Path, Stroke};
use iced::widget::scrollable;
use iced::{Color, Element, Length, Pixels, Point, Rectangle, Size, Theme, mouse};

pub const RULER_HEIGHT: f32 = 24.0;
pub const TRACK_HEIGHT: f32 = 48.0;
pub const TRACK_GAP: f32 = 4.0;
/// Width of the grab zone at each clip edge.
pub const TRIM_HANDLE_PX: f32 = 6.0;

const BODY_INSET: f32 = 4.0;

/// Resolves what lies under a point in canvas space.
///
/// Clips later in the frame are drawn on top, so they win overlapping hits.
/// Trim handles take precedence over the clip body they belong to.
///
/// # Example
///
/// ```ignore
/// let target = hit_test(&frame, 0.0, 10.0, 5.0);
/// assert_eq!(target, PointerTarget::Ruler);
/// ```
pub fn hit_test(frame: &RenderFrame, track_left: f32, x: f32, y: f32) -> PointerTarget {
    if y < RULER_HEIGHT {
        return PointerTarget::Ruler;
    }
    let Some(track) = track_at(y) else {
        return PointerTarget::Background;
    };

    let local_x = x - track_left;
    for rect in frame.track_clips(track).collect::<Vec<_>>().into_iter().rev() {
        let left = rect.left_px as f32;
        let right = rect.right_px() as f32;
        if local_x < left || local_x > right {
            continue;
        }
        if local_x - left <= TRIM_HANDLE_PX {
            return PointerTarget::TrimHandle {
                clip_id: rect.id,
                side: TrimSide::Left,
            };
        }
        if right - local_x <= TRIM_HANDLE_PX {
            return PointerTarget::TrimHandle {
                clip_id: rect.id,
                side: TrimSide::Right,
            };
        }
        return PointerTarget::ClipBody(rect.id);
    }

    PointerTarget::Background
}

fn track_at(y: f32) -> Option<TrackKind> {
    let offset = y - RULER_HEIGHT;
    if offset < 0.0 {
        return None;
    }
    let lane = (offset / (TRACK_HEIGHT + TRACK_GAP)).floor() as usize;
    let within = offset - lane as f32 * (TRACK_HEIGHT + TRACK_GAP);
    if within > TRACK_HEIGHT {
        return None;
    }
    TrackKind::ALL.get(lane).copied()
}

fn lane_top(track: TrackKind) -> f32 {
    let lane = TrackKind::ALL
        .iter()
        .position(|kind| *kind == track)
        .unwrap_or_default();
    RULER_HEIGHT + lane as f32 * (TRACK_HEIGHT + TRACK_GAP)
}

fn timeline_height() -> f32 {
    RULER_HEIGHT + TrackKind::ALL.len() as f32 * (TRACK_HEIGHT + TRACK_GAP)
}

fn clip_color(rect: &ClipRect) -> Color {
    match rect.track {
        TrackKind::Video => Color::from_rgb8(55, 110, 188),
        TrackKind::Audio => Color::from_rgb8(64, 150, 98),
        TrackKind::Text => Color::from_rgb8(196, 140, 48),
    }
}

#[derive(Debug, Default)]
struct TimelineState {
    pressed: bool,
    last_x: f32,
}

#[derive(Debug)]
struct TimelineProgram<'a, Message> {
    frame: &'a RenderFrame,
    playhead_px: f64,
    track_left: f32,
    cache: &'a canvas::Cache,
    on_pointer: fn(Command) -> Message,
}

impl<Message> canvas::Program<Message> for TimelineProgram<'_, Message> {
    type State = TimelineState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        // Positions stay relative to the canvas even once the pointer leaves it.
        let cursor_x = cursor.position().map(|position| position.x - bounds.x);
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(position) = cursor.position_in(bounds) else {
                    return (canvas::event::Status::Ignored, None);
                };
                let target = hit_test(self.frame, self.track_left, position.x, position.y);
                state.pressed = true;
                state.last_x = position.x;
                let command = Command::PointerDown {
                    x: f64::from(position.x),
                    target,
                };
                (canvas::event::Status::Captured, Some((self.on_pointer)(command)))
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) if state.pressed => {
                let Some(x) = cursor_x else {
                    return (canvas::event::Status::Ignored, None);
                };
                state.last_x = x;
                let command = Command::PointerMove { x: f64::from(x) };
                (canvas::event::Status::Captured, Some((self.on_pointer)(command)))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if state.pressed =>
            {
                state.pressed = false;
                let x = cursor_x.unwrap_or(state.last_x);
                let command = Command::PointerUp { x: f64::from(x) };
                (canvas::event::Status::Captured, Some((self.on_pointer)(command)))
            }
            canvas::Event::Mouse(mouse::Event::CursorLeft) if state.pressed => {
                state.pressed = false;
                (
                    canvas::event::Status::Captured,
                    Some((self.on_pointer)(Command::PointerCancel)),
                )
            }
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let content = self.cache.draw(renderer, bounds.size(), |frame| {
            let background = Path::rectangle(Point::ORIGIN, frame.size());
            frame.fill(&background, Color::from_rgb8(22, 24, 29));

            let ruler = Path::rectangle(Point::ORIGIN, Size::new(frame.width(), RULER_HEIGHT));
            frame.fill(&ruler, Color::from_rgb8(34, 37, 44));
            for tick in &self.frame.ruler {
                let x = self.track_left + tick.x as f32;
                let line = Path::line(Point::new(x, RULER_HEIGHT - 8.0), Point::new(x, RULER_HEIGHT));
                frame.stroke(
                    &line,
                    Stroke::default()
                        .with_width(1.0)
                        .with_color(Color::from_rgb8(120, 126, 138)),
                );
                frame.fill_text(canvas::Text {
                    content: tick.label.clone(),
                    position: Point::new(x + 3.0, 3.0),
                    color: Color::from_rgb8(170, 176, 188),
                    size: Pixels(11.0),
                    ..canvas::Text::default()
                });
            }

            for track in TrackKind::ALL {
                let lane = Path::rectangle(
                    Point::new(0.0, lane_top(track)),
                    Size::new(frame.width(), TRACK_HEIGHT),
                );
                frame.fill(&lane, Color::from_rgb8(28, 31, 37));
            }

            for rect in &self.frame.clips {
                let top = lane_top(rect.track) + BODY_INSET;
                let origin = Point::new(self.track_left + rect.left_px as f32, top);
                let size = Size::new(
                    (rect.width_px as f32).max(1.0),
                    TRACK_HEIGHT - 2.0 * BODY_INSET,
                );
                let body = Path::rectangle(origin, size);
                frame.fill(&body, clip_color(rect));
                if rect.selected {
                    frame.stroke(
                        &body,
                        Stroke::default()
                            .with_width(2.0)
                            .with_color(Color::from_rgb8(240, 240, 240)),
                    );
                }
                frame.fill_text(canvas::Text {
                    content: rect.label.clone(),
                    position: Point::new(origin.x + TRIM_HANDLE_PX + 2.0, top + 4.0),
                    color: Color::WHITE,
                    size: Pixels(12.0),
                    ..canvas::Text::default()
                });
            }
        });

        let mut playhead_frame = canvas::Frame::new(renderer, bounds.size());
        let x = self.track_left + self.playhead_px as f32;
        let line = Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
        playhead_frame.stroke(
            &line,
            Stroke::default()
                .with_width(2.0)
                .with_color(Color::from_rgb8(255, 94, 77)),
        );

        vec![content, playhead_frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        let Some(position) = cursor.position_in(bounds) else {
            return mouse::Interaction::None;
        };
        match hit_test(self.frame, self.track_left, position.x, position.y) {
            PointerTarget::TrimHandle { .. } => mouse::Interaction::ResizingHorizontally,
            PointerTarget::ClipBody(_) if state.pressed => mouse::Interaction::Grabbing,
            PointerTarget::ClipBody(_) => mouse::Interaction::Grab,
            PointerTarget::Ruler => mouse::Interaction::Pointer,
            PointerTarget::Background => mouse::Interaction::None,
        }
    }
}

/// Renders the interactive multi-track timeline, `width` pixels wide inside a
/// horizontal scroller.
pub fn view<'a, Message>(
    frame: &'a RenderFrame,
    playhead_px: f64,
    track_left: f64,
    width: f64,
    cache: &'a canvas::Cache,
    on_pointer: fn(Command) -> Message,
) -> Element<'a, Message>
where
    Message: 'a,
{
    let canvas = canvas::Canvas::new(TimelineProgram {
        frame,
        playhead_px,
        track_left: track_left as f32,
        cache,
        on_pointer,
    })
    .width(Length::Fixed(width.max(1.0) as f32))
    .height(Length::Fixed(timeline_height()));

    scrollable(canvas)
        .direction(scrollable::Direction::Horizontal(
            scrollable::Scrollbar::new(),
        ))
        .width(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use clipdeck_engine::{
        ClipId, ClipRect, Command, PointerTarget, RenderFrame, TrackKind, TrimSide, ZoomLevel,
    };
    use iced::widget::canvas::{self, Program};
    use iced::{Point, Rectangle, mouse};

    use super::{RULER_HEIGHT, TRACK_GAP, TRACK_HEIGHT, TimelineProgram, TimelineState, hit_test};

    fn rect(id: u64, track: TrackKind, left_px: f64, width_px: f64) -> ClipRect {
        ClipRect {
            id: ClipId(id),
            track,
            left_px,
            width_px,
            selected: false,
            label: format!("clip {id}"),
            is_text: track == TrackKind::Text,
        }
    }

    fn frame(clips: Vec<ClipRect>) -> RenderFrame {
        RenderFrame {
            zoom: ZoomLevel(1),
            pixels_per_second: 35.0,
            clips,
            playhead_px: 0.0,
            content_width_px: 2_100.0,
            ruler: Vec::new(),
        }
    }

    fn lane_middle(lane: usize) -> f32 {
        RULER_HEIGHT + lane as f32 * (TRACK_HEIGHT + TRACK_GAP) + TRACK_HEIGHT / 2.0
    }

    fn bounds() -> Rectangle {
        Rectangle {
            x: 10.0,
            y: 0.0,
            width: 600.0,
            height: 200.0,
        }
    }

    #[test]
    fn ruler_strip_is_hit_above_the_tracks() {
        let frame = frame(vec![rect(1, TrackKind::Video, 0.0, 350.0)]);

        assert_eq!(hit_test(&frame, 0.0, 40.0, 5.0), PointerTarget::Ruler);
    }

    #[test]
    fn clip_edges_resolve_to_trim_handles() {
        let frame = frame(vec![rect(1, TrackKind::Video, 100.0, 200.0)]);
        let y = lane_middle(0);

        assert_eq!(
            hit_test(&frame, 0.0, 103.0, y),
            PointerTarget::TrimHandle {
                clip_id: ClipId(1),
                side: TrimSide::Left
            }
        );
        assert_eq!(
            hit_test(&frame, 0.0, 297.0, y),
            PointerTarget::TrimHandle {
                clip_id: ClipId(1),
                side: TrimSide::Right
            }
        );
        assert_eq!(
            hit_test(&frame, 0.0, 200.0, y),
            PointerTarget::ClipBody(ClipId(1))
        );
    }

    #[test]
    fn hit_respects_track_lane_and_left_offset() {
        let frame = frame(vec![
            rect(1, TrackKind::Video, 0.0, 100.0),
            rect(2, TrackKind::Audio, 0.0, 100.0),
        ]);

        assert_eq!(
            hit_test(&frame, 20.0, 70.0, lane_middle(1)),
            PointerTarget::ClipBody(ClipId(2))
        );
        assert_eq!(
            hit_test(&frame, 20.0, 70.0, lane_middle(2)),
            PointerTarget::Background
        );
        assert_eq!(
            hit_test(&frame, 20.0, 10.0, lane_middle(0)),
            PointerTarget::Background
        );
    }

    #[test]
    fn topmost_overlapping_clip_wins() {
        let frame = frame(vec![
            rect(1, TrackKind::Video, 0.0, 200.0),
            rect(2, TrackKind::Video, 100.0, 200.0),
        ]);

        assert_eq!(
            hit_test(&frame, 0.0, 150.0, lane_middle(0)),
            PointerTarget::ClipBody(ClipId(2))
        );
    }

    #[test]
    fn press_move_release_emit_pointer_commands() {
        let cache = canvas::Cache::new();
        let frame = frame(vec![rect(1, TrackKind::Video, 100.0, 200.0)]);
        let program = TimelineProgram {
            frame: &frame,
            playhead_px: 0.0,
            track_left: 0.0,
            cache: &cache,
            on_pointer: |command| command,
        };
        let mut state = TimelineState::default();
        let y = lane_middle(0);

        let (_, pressed) = program.update(
            &mut state,
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)),
            bounds(),
            mouse::Cursor::Available(Point::new(210.0, y)),
        );
        assert_eq!(
            pressed,
            Some(Command::PointerDown {
                x: 200.0,
                target: PointerTarget::ClipBody(ClipId(1))
            })
        );

        let (_, moved) = program.update(
            &mut state,
            canvas::Event::Mouse(mouse::Event::CursorMoved {
                position: Point::new(700.0, y),
            }),
            bounds(),
            mouse::Cursor::Available(Point::new(700.0, y)),
        );
        assert_eq!(moved, Some(Command::PointerMove { x: 690.0 }));

        let (_, released) = program.update(
            &mut state,
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)),
            bounds(),
            mouse::Cursor::Unavailable,
        );
        assert_eq!(released, Some(Command::PointerUp { x: 690.0 }));
        assert!(!state.pressed);
    }

    #[test]
    fn leaving_the_window_cancels_the_session() {
        let cache = canvas::Cache::new();
        let frame = frame(Vec::new());
        let program = TimelineProgram {
            frame: &frame,
            playhead_px: 0.0,
            track_left: 0.0,
            cache: &cache,
            on_pointer: |command| command,
        };
        let mut state = TimelineState {
            pressed: true,
            ..TimelineState::default()
        };

        let (_, message) = program.update(
            &mut state,
            canvas::Event::Mouse(mouse::Event::CursorLeft),
            bounds(),
            mouse::Cursor::Unavailable,
        );

        assert_eq!(message, Some(Command::PointerCancel));
    }

    #[test]
    fn mouse_interaction_reflects_target_under_cursor() {
        let cache = canvas::Cache::new();
        let frame = frame(vec![rect(1, TrackKind::Video, 100.0, 200.0)]);
        let program = TimelineProgram {
            frame: &frame,
            playhead_px: 0.0,
            track_left: 0.0,
            cache: &cache,
            on_pointer: |command| command,
        };
        let state = TimelineState::default();
        let y = lane_middle(0);

        let edge = program.mouse_interaction(
            &state,
            bounds(),
            mouse::Cursor::Available(Point::new(112.0, y)),
        );
        let body = program.mouse_interaction(
            &state,
            bounds(),
            mouse::Cursor::Available(Point::new(210.0, y)),
        );

        assert_eq!(edge, mouse::Interaction::ResizingHorizontally);
        assert_eq!(body, mouse::Interaction::Grab);
    }
}
