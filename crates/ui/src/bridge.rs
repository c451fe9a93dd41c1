use clipdeck_engine::{EditorHost, RenderFrame, Severity, TimelineLayout, UserMessage};
use tracing::debug;

/// Collects the editor's outbound requests during one update for the app to
/// apply afterwards.
#[derive(Debug, Default)]
pub struct HostBridge {
    frame: Option<RenderFrame>,
    pending_seek: Option<f64>,
    playhead: Option<(f64, f64)>,
    layout: Option<TimelineLayout>,
    messages: Vec<UserMessage>,
}

impl HostBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest projection since the last call; older ones are superseded.
    pub fn take_frame(&mut self) -> Option<RenderFrame> {
        self.frame.take()
    }

    /// Latest seek since the last call; intermediate seeks are coalesced.
    pub fn take_seek(&mut self) -> Option<f64> {
        self.pending_seek.take()
    }

    /// Latest `(time, position_px)` reported for the playhead.
    pub fn take_playhead(&mut self) -> Option<(f64, f64)> {
        self.playhead.take()
    }

    /// Latest duration-dependent layout since the last call.
    pub fn take_layout(&mut self) -> Option<TimelineLayout> {
        self.layout.take()
    }

    pub fn drain_messages(&mut self) -> Vec<UserMessage> {
        std::mem::take(&mut self.messages)
    }
}

impl EditorHost for HostBridge {
    fn request_seek(&mut self, time: f64) {
        self.pending_seek = Some(time);
    }

    fn request_rerender(&mut self, frame: &RenderFrame) {
        self.frame = Some(frame.clone());
    }

    fn notify_user_message(&mut self, message: &UserMessage) {
        if message.severity != Severity::Info {
            debug!(severity = ?message.severity, text = %message.text, "advisory");
        }
        self.messages.push(message.clone());
    }

    fn playhead_moved(&mut self, time: f64, position_px: f64) {
        self.playhead = Some((time, position_px));
    }

    fn layout_changed(&mut self, layout: &TimelineLayout) {
        debug!(
            visible_duration = layout.visible_duration,
            width_px = layout.width_px,
            "timeline layout changed"
        );
        self.layout = Some(*layout);
    }
}

#[cfg(test)]
mod tests {
    use clipdeck_engine::{Command, Editor, PointerTarget, dispatch};

    use super::HostBridge;

    #[test]
    fn coalesces_seeks_and_keeps_latest_frame() {
        let mut editor = Editor::with_defaults();
        let mut bridge = HostBridge::new();

        dispatch(
            &mut editor,
            Command::PointerDown {
                x: 35.0,
                target: PointerTarget::Ruler,
            },
            &mut bridge,
        );
        dispatch(&mut editor, Command::PointerMove { x: 70.0 }, &mut bridge);
        dispatch(
            &mut editor,
            Command::AddTextOverlay {
                content: "Title".to_owned(),
            },
            &mut bridge,
        );

        assert_eq!(bridge.take_seek(), Some(2.0));
        assert_eq!(bridge.take_seek(), None);
        let frame = bridge.take_frame().expect("frame");
        assert_eq!(frame.clips.len(), 1);
        assert!(bridge.take_frame().is_none());
    }

    #[test]
    fn drains_rejection_messages() {
        let mut editor = Editor::with_defaults();
        let mut bridge = HostBridge::new();

        dispatch(&mut editor, Command::SplitSelected, &mut bridge);

        let messages = bridge.drain_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("select a clip to split"));
        assert!(bridge.drain_messages().is_empty());
    }

    #[test]
    fn records_transport_position() {
        let mut editor = Editor::with_defaults();
        let mut bridge = HostBridge::new();

        dispatch(
            &mut editor,
            Command::PlaybackTime {
                current: 3.0,
                duration: 30.0,
            },
            &mut bridge,
        );

        assert_eq!(bridge.take_playhead(), Some((3.0, 105.0)));
        assert!(bridge.take_frame().is_some());
        let layout = bridge.take_layout().expect("layout");
        assert_eq!(layout.visible_duration, 30.0);
        assert_eq!(layout.width_px, 1_050.0);
    }
}
