use tracing::warn;

use crate::api::{Command, Editor, Event, UserMessage};
use crate::clip::Clip;
use crate::playhead::TimelineLayout;
use crate::projector::RenderFrame;

/// Collaborators the editor calls out to: transport, drawing layer and toasts.
pub trait EditorHost {
    /// Asks the media transport to seek. The playhead moves on its next report.
    fn request_seek(&mut self, time: f64);

    /// Hands a fresh projection to the drawing layer.
    fn request_rerender(&mut self, frame: &RenderFrame);

    /// Shows a transient advisory.
    fn notify_user_message(&mut self, message: &UserMessage);

    fn playhead_moved(&mut self, _time: f64, _position_px: f64) {}

    fn layout_changed(&mut self, _layout: &TimelineLayout) {}

    fn clip_added(&mut self, _clip: &Clip) {}
}

/// Routes events to the matching host callbacks.
pub fn deliver<H>(events: Vec<Event>, host: &mut H)
where
    H: EditorHost + ?Sized,
{
    for event in events {
        match event {
            Event::Rerender(frame) => host.request_rerender(&frame),
            Event::PlayheadMoved { time, position_px } => host.playhead_moved(time, position_px),
            Event::LayoutChanged(layout) => host.layout_changed(&layout),
            Event::SeekRequested { time } => host.request_seek(time),
            Event::ClipAdded(clip) => host.clip_added(&clip),
            Event::Message(message) => host.notify_user_message(&message),
        }
    }
}

/// Applies `command` and forwards the outcome to `host`.
///
/// Rejected commands leave the editor untouched and surface as an advisory
/// message. Returns whether the command was accepted.
///
/// # Example
/// ```
/// use clipdeck_engine::host::{EditorHost, dispatch};
/// use clipdeck_engine::{Command, Editor, RenderFrame, Severity, UserMessage};
///
/// #[derive(Default)]
/// struct Toasts(Vec<UserMessage>);
///
/// impl EditorHost for Toasts {
///     fn request_seek(&mut self, _time: f64) {}
///     fn request_rerender(&mut self, _frame: &RenderFrame) {}
///     fn notify_user_message(&mut self, message: &UserMessage) {
///         self.0.push(message.clone());
///     }
/// }
///
/// let mut editor = Editor::with_defaults();
/// let mut host = Toasts::default();
/// assert!(!dispatch(&mut editor, Command::DeleteSelected, &mut host));
/// assert_eq!(host.0[0].severity, Severity::Warning);
/// ```
pub fn dispatch<H>(editor: &mut Editor, command: Command, host: &mut H) -> bool
where
    H: EditorHost + ?Sized,
{
    match editor.handle_command(command) {
        Ok(events) => {
            deliver(events, host);
            true
        }
        Err(error) => {
            warn!(%error, "command rejected");
            host.notify_user_message(&UserMessage::from_error(&error));
            false
        }
    }
}
