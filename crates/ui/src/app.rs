use std::time::{Duration, Instant};

use clipdeck_engine::time::format_timecode;
use clipdeck_engine::{
    Command, Editor, EditorConfig, MediaImport, MediaKind, RenderFrame, TimelineLayout, ToolMode,
    dispatch,
};
use iced::widget::{button, canvas, column, row, slider, text, text_input};
use iced::{Element, Length, Subscription, Task};
use tracing::{info, warn};

use crate::bridge::HostBridge;
use crate::config;
use crate::transport::PlaybackClock;
use crate::widgets::timeline;

const TICK_INTERVAL: Duration = Duration::from_millis(33);

/// UI messages handled by the iced app update loop.
#[derive(Debug, Clone)]
pub enum Message {
    ImportNameChanged(String),
    ImportDurationChanged(String),
    ImportPressed(MediaKind),
    TextContentChanged(String),
    AddTextPressed,
    SplitPressed,
    DeletePressed,
    ZoomChanged(f64),
    ZoomInPressed,
    ZoomOutPressed,
    ToolSelected(ToolMode),
    PlayPausePressed,
    Timeline(Command),
    Tick(Instant),
}

/// Root UI state: the editor, its host callbacks and the simulated transport.
pub struct AppState {
    editor: Editor,
    host: HostBridge,
    clock: PlaybackClock,
    frame: RenderFrame,
    layout: TimelineLayout,
    playhead_px: f64,
    cache: canvas::Cache,
    import_name: String,
    import_duration: String,
    text_content: String,
    status: String,
}

impl AppState {
    /// Boots the app, applying the optional JSON config.
    pub fn boot() -> (Self, Task<Message>) {
        let (config, status) = match config::load_from_env() {
            Ok(Some(config)) => (config, String::from("config loaded")),
            Ok(None) => (EditorConfig::default(), String::from("ready")),
            Err(error) => {
                warn!(%error, "falling back to default config");
                (EditorConfig::default(), format!("{error}; using defaults"))
            }
        };

        (Self::with_config(config, status), Task::none())
    }

    fn with_config(config: EditorConfig, status: String) -> Self {
        let editor = match Editor::new(config) {
            Ok(editor) => editor,
            Err(error) => {
                warn!(%error, "editor config rejected");
                Editor::with_defaults()
            }
        };
        let frame = editor.render_frame();
        let layout = editor.playhead().layout(editor.scale(), editor.zoom());
        info!(zoom = editor.zoom().get(), "editor ready");

        Self {
            playhead_px: frame.playhead_px,
            frame,
            layout,
            editor,
            host: HostBridge::new(),
            clock: PlaybackClock::new(),
            cache: canvas::Cache::new(),
            import_name: String::new(),
            import_duration: String::new(),
            text_content: String::new(),
            status,
        }
    }

    /// Handles one UI message.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ImportNameChanged(name) => {
                self.import_name = name;
            }
            Message::ImportDurationChanged(duration) => {
                self.import_duration = duration;
            }
            Message::ImportPressed(kind) => {
                let name = self.import_name.trim().to_owned();
                if name.is_empty() {
                    self.status = String::from("import name is empty");
                } else {
                    // Unreadable lengths import with the default duration.
                    let duration = self.import_duration.trim().parse::<f64>().ok();
                    let media = MediaImport::new(name, kind, duration);
                    if self.apply(Command::ImportMedia { media }) {
                        self.import_name.clear();
                        self.import_duration.clear();
                    }
                }
            }
            Message::TextContentChanged(content) => {
                self.text_content = content;
            }
            Message::AddTextPressed => {
                let content = std::mem::take(&mut self.text_content);
                self.apply(Command::AddTextOverlay { content });
            }
            Message::SplitPressed => {
                self.apply(Command::SplitSelected);
            }
            Message::DeletePressed => {
                self.apply(Command::DeleteSelected);
            }
            Message::ZoomChanged(value) => {
                let level = value.round() as i64;
                if level != i64::from(self.editor.zoom().get()) {
                    self.apply(Command::SetZoom { level });
                }
            }
            Message::ZoomInPressed => {
                self.apply(Command::ZoomIn);
            }
            Message::ZoomOutPressed => {
                self.apply(Command::ZoomOut);
            }
            Message::ToolSelected(tool) => {
                self.apply(Command::SetTool { tool });
            }
            Message::PlayPausePressed => {
                self.clock.toggle();
                self.status = if self.clock.is_playing() {
                    String::from("playing")
                } else {
                    String::from("paused")
                };
            }
            Message::Timeline(command) => {
                self.apply(command);
            }
            Message::Tick(now) => {
                self.clock.advance(now);
                self.report_transport();
            }
        }

        Task::none()
    }

    fn apply(&mut self, command: Command) -> bool {
        let accepted = dispatch(&mut self.editor, command, &mut self.host);
        self.sync_host();
        accepted
    }

    fn sync_host(&mut self) {
        if let Some(frame) = self.host.take_frame() {
            self.playhead_px = frame.playhead_px;
            self.frame = frame;
            self.cache.clear();
        }
        if let Some(layout) = self.host.take_layout() {
            self.layout = layout;
        }
        if let Some((_, position_px)) = self.host.take_playhead() {
            self.playhead_px = position_px;
        }
        if let Some(message) = self.host.drain_messages().pop() {
            self.status = message.text;
        }

        self.clock.set_duration(self.editor.store().timeline_end());
        if let Some(time) = self.host.take_seek() {
            self.clock.seek(time);
            self.report_transport();
        }
    }

    /// Reports the transport position back to the editor, as a media element
    /// would after a seek or during playback.
    fn report_transport(&mut self) {
        self.apply(Command::PlaybackTime {
            current: self.clock.position(),
            duration: self.clock.duration(),
        });
    }

    /// Canvas width: the track origin plus the visible duration or the last
    /// clip end, whichever reaches further.
    fn timeline_width(&self) -> f64 {
        self.editor.config().track_left_px + self.frame.content_width_px.max(self.layout.width_px)
    }

    /// Renders the UI tree.
    pub fn view(&self) -> Element<'_, Message> {
        let toolbar = self.editor.toolbar();
        let tool = self.editor.interaction().tool();
        let (zoom_min, zoom_max) = self.editor.scale().zoom_bounds();

        let import_row = row![
            text_input("media name", &self.import_name).on_input(Message::ImportNameChanged),
            text_input("seconds", &self.import_duration)
                .on_input(Message::ImportDurationChanged)
                .width(Length::Fixed(90.0)),
            button("Video").on_press(Message::ImportPressed(MediaKind::Video)),
            button("Audio").on_press(Message::ImportPressed(MediaKind::Audio)),
            button("Image").on_press(Message::ImportPressed(MediaKind::Image)),
        ]
        .spacing(12);

        let edit_row = row![
            tool_button("Select", ToolMode::Select, tool),
            tool_button("Razor", ToolMode::Razor, tool),
            tool_button("Text", ToolMode::Text, tool),
            button("Split").on_press_maybe(toolbar.split.then_some(Message::SplitPressed)),
            button("Delete").on_press_maybe(toolbar.delete.then_some(Message::DeletePressed)),
            text_input("overlay text", &self.text_content).on_input(Message::TextContentChanged),
            button("Add text").on_press_maybe(toolbar.add_text.then_some(Message::AddTextPressed)),
        ]
        .spacing(12);

        let play_label = if self.clock.is_playing() {
            "Pause"
        } else {
            "Play"
        };
        let transport_row = row![
            button(play_label).on_press(Message::PlayPausePressed),
            text(format!(
                "{} / {}",
                format_timecode(self.editor.playhead().current_time()),
                format_timecode(self.clock.duration())
            )),
            button("-").on_press_maybe(toolbar.zoom_out.then_some(Message::ZoomOutPressed)),
            slider(
                f64::from(zoom_min.get())..=f64::from(zoom_max.get()),
                f64::from(self.editor.zoom().get()),
                Message::ZoomChanged
            )
            .step(1.0)
            .width(Length::Fixed(160.0)),
            button("+").on_press_maybe(toolbar.zoom_in.then_some(Message::ZoomInPressed)),
            text(format!(
                "Zoom {} | visible {}",
                self.editor.zoom().get(),
                format_timecode(self.layout.visible_duration)
            )),
        ]
        .spacing(12);

        column![
            import_row,
            edit_row,
            transport_row,
            timeline::view(
                &self.frame,
                self.playhead_px,
                self.editor.config().track_left_px,
                self.timeline_width(),
                &self.cache,
                Message::Timeline
            ),
            text(format!("Clips: {}", self.editor.store().clip_count())),
            text(format!("Status: {}", self.status)),
        ]
        .spacing(12)
        .padding(16)
        .into()
    }

    /// Drives the transport clock while playing.
    pub fn subscription(&self) -> Subscription<Message> {
        if self.clock.is_playing() {
            iced::time::every(TICK_INTERVAL).map(Message::Tick)
        } else {
            Subscription::none()
        }
    }
}

fn tool_button(label: &str, mode: ToolMode, active: ToolMode) -> Element<'_, Message> {
    let label = if mode == active {
        format!("[{label}]")
    } else {
        label.to_owned()
    };
    button(text(label))
        .on_press(Message::ToolSelected(mode))
        .into()
}
