// src/overlay.rs
// Debug overlay text, refreshed every few frames so it stays readable.

use std::fmt::Write as _;

use crate::registry::RegistryCounts;
use crate::timing::{FpsCounter, FrameTimer, Phase, Timespan};

/// Everything the overlay shows for one refresh.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStats {
    pub frame: u64,
    pub counts: RegistryCounts,
    pub box_capacity: usize,
    pub paused: bool,
}

pub struct DebugOverlay {
    refresh_every: u64,
    text: String,
}

impl DebugOverlay {
    pub fn new(refresh_every: u64) -> Self {
        Self { refresh_every: refresh_every.max(1), text: String::new() }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Rebuilds the text on refresh frames. Returns true if it changed.
    pub fn update(&mut self, stats: &OverlayStats, fps: &FpsCounter, timer: &FrameTimer) -> bool {
        if stats.frame % self.refresh_every != 0 {
            return false;
        }
        let (rate, frame_ms) = fps.averaged();

        self.text.clear();
        // Writing into a String cannot fail.
        let _ = write!(
            self.text,
            "frames:{} frametime:{:.3}ms framerate:{:.1}fps boxcount:{}/{} simpaused:{}",
            stats.frame,
            frame_ms,
            rate,
            stats.counts.boxes,
            stats.box_capacity,
            u8::from(stats.paused),
        );
        for phase in Phase::ALL {
            let _ = write!(self.text, " {}:{}", phase.name(), Timespan::from(timer.span(phase)));
        }
        log::debug!("{}", self.text);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn stats(frame: u64) -> OverlayStats {
        OverlayStats {
            frame,
            counts: RegistryCounts { layout_boxes: 15, boxes: 3, balls: 1, joints: 2 },
            box_capacity: 1000,
            paused: true,
        }
    }

    #[test]
    fn refreshes_only_on_multiples() {
        let mut overlay = DebugOverlay::new(10);
        let fps = FpsCounter::new();
        let timer = FrameTimer::new();
        assert!(!overlay.update(&stats(7), &fps, &timer));
        assert!(overlay.text().is_empty());
        assert!(overlay.update(&stats(20), &fps, &timer));
        assert!(overlay.text().starts_with("frames:20 "));
    }

    #[test]
    fn shows_counts_and_phases() {
        let mut overlay = DebugOverlay::new(1);
        let mut fps = FpsCounter::new();
        fps.record(Duration::from_millis(8));
        overlay.update(&stats(1), &fps, &FrameTimer::new());
        let text = overlay.text();
        assert!(text.contains("boxcount:3/1000"));
        assert!(text.contains("simpaused:1"));
        assert!(text.contains("frametime:8.000ms"));
        assert!(text.contains("physics:0.000ms"));
    }
}
