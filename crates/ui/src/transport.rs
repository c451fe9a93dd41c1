use std::time::{Duration, Instant};

/// Simulated media transport driving the playhead.
///
/// It plays the timeline composition from `0` to `duration`, accepts seeks
/// and reports its position on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    position: f64,
    duration: f64,
    playing: bool,
    last_tick: Option<Instant>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
            playing: false,
            last_tick: None,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        self.position = self.position.min(self.duration);
    }

    pub fn seek(&mut self, time: f64) {
        self.position = time.clamp(0.0, self.duration);
    }

    /// Starts or pauses playback. Playing from the end restarts at zero.
    pub fn toggle(&mut self) {
        if self.playing {
            self.playing = false;
            self.last_tick = None;
            return;
        }
        if self.duration <= 0.0 {
            return;
        }
        if self.position >= self.duration {
            self.position = 0.0;
        }
        self.playing = true;
        self.last_tick = None;
    }

    /// Advances by the wall time elapsed since the previous tick.
    pub fn advance(&mut self, now: Instant) {
        if !self.playing {
            return;
        }

        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);
        self.position = (self.position + elapsed.as_secs_f64()).min(self.duration);
        if self.position >= self.duration {
            self.playing = false;
            self.last_tick = None;
        }
    }
}
