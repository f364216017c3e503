// src/timing.rs
//! Wall-clock timing for the frame phases and a rolling frame-rate average.

use std::fmt;
use std::time::{Duration, Instant};

/// A duration split into display units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespan {
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
    pub micros: u64,
}

impl From<Duration> for Timespan {
    fn from(d: Duration) -> Self {
        let total_micros = d.as_micros() as u64;
        Self {
            minutes: total_micros / 60_000_000,
            seconds: (total_micros / 1_000_000) % 60,
            millis: (total_micros / 1_000) % 1_000,
            micros: total_micros % 1_000,
        }
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minutes > 0 {
            write!(f, "{}m ", self.minutes)?;
        }
        if self.minutes > 0 || self.seconds > 0 {
            write!(f, "{}s ", self.seconds)?;
        }
        write!(f, "{}.{:03}ms", self.millis, self.micros)
    }
}

/// Runs `f` and returns its result with the time it took.
#[inline]
pub fn benchmark<T>(f: impl FnOnce() -> T) -> (T, Timespan) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed().into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Physics,
    Draw,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Input, Phase::Physics, Phase::Draw];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Input => "input",
            Phase::Physics => "physics",
            Phase::Draw => "draw",
        }
    }
}

/// Per-phase spans of the most recent frame.
#[derive(Debug, Default)]
pub struct FrameTimer {
    started: [Option<Instant>; 3],
    spans: [Duration; 3],
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn begin(&mut self, phase: Phase) {
        self.started[phase.index()] = Some(Instant::now());
    }

    /// Ends `phase`. Ending a phase that was never begun records zero.
    #[inline]
    pub fn end(&mut self, phase: Phase) {
        let span = self.started[phase.index()]
            .take()
            .map(|s| s.elapsed())
            .unwrap_or_default();
        self.spans[phase.index()] = span;
    }

    /// Times `f` as `phase`.
    pub fn measure<T>(&mut self, phase: Phase, f: impl FnOnce() -> T) -> T {
        self.begin(phase);
        let out = f();
        self.end(phase);
        out
    }

    #[inline]
    pub fn span(&self, phase: Phase) -> Duration {
        self.spans[phase.index()]
    }

    pub fn total(&self) -> Duration {
        self.spans.iter().sum()
    }
}

/// Rolling average over the last 128 frame times.
pub struct FpsCounter {
    frame_times: [f32; 128], // ms
    index: usize,
    last_instant: Instant,
    frames: u64,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frame_times: [0.0; 128],
            index: 0,
            last_instant: Instant::now(),
            frames: 0,
        }
    }

    /// Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_instant);
        self.last_instant = now;
        self.record(dt);
    }

    /// Records a frame time directly.
    pub fn record(&mut self, dt: Duration) {
        self.frame_times[self.index] = dt.as_secs_f32() * 1000.0;
        self.index = (self.index + 1) % self.frame_times.len();
        self.frames += 1;
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Averaged (fps, frame time ms) over the buffer.
    pub fn averaged(&self) -> (f32, f32) {
        let mut sum = 0.0f32;
        let mut count = 0;
        for &v in &self.frame_times {
            if v > 0.0 {
                sum += v;
                count += 1;
            }
        }
        if count == 0 {
            return (0.0, 0.0);
        }
        let avg_ms = sum / count as f32;
        (1000.0 / avg_ms, avg_ms)
    }
}
