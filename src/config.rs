// src/config.rs
//! Sandbox configuration.
//!
//! Every value has a built-in default matching the stock scenario. A JSON file
//! named by `RAYBOX_CONFIG` may override any subset of fields; a missing or
//! broken file falls back to the defaults with a warning.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scene::SceneLayout;

/// Environment variable naming an optional JSON override file.
pub const CONFIG_ENV_VAR: &str = "RAYBOX_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Pixels per metre.
    pub ppm: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "RayBox2D".to_string(),
            width: 800,
            height: 400,
            ppm: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity_y: f32,
    /// Seconds advanced per frame.
    pub time_step: f32,
    pub sub_steps: u32,
    pub start_paused: bool,
    /// Drop one spawn-sized box into the scene right after it is built.
    pub prespawn: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: -10.0,
            time_step: 1.0 / 60.0,
            sub_steps: 4,
            start_paused: false,
            prespawn: true,
        }
    }
}

/// Maximum number of entities per registry collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacities {
    pub boxes: usize,
    pub layout_boxes: usize,
    pub balls: usize,
    pub joints: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            boxes: 1000,
            layout_boxes: 100,
            balls: 16,
            joints: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub cooldown_ms: u64,
    pub width: f32,
    pub height: f32,
    pub density: f32,
    pub friction: f32,
    /// Boxes created per accepted request.
    pub batch: usize,
    /// Max offset (metres) applied to every batch member after the first.
    pub jitter: f32,
    pub seed: u64,
}

impl SpawnConfig {
    #[inline]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 100,
            width: 0.1,
            height: 0.1,
            density: 1.0,
            friction: 0.3,
            batch: 1,
            jitter: 0.05,
            seed: 0x5EED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Refresh the overlay text every N frames.
    pub refresh_every: u64,
    /// Show overlay text in the window title.
    pub in_title: bool,
    pub draw_box_diagonals: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            refresh_every: 10,
            in_title: true,
            draw_box_diagonals: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub capacities: Capacities,
    pub spawn: SpawnConfig,
    pub layout: SceneLayout,
    pub overlay: OverlayConfig,
}

impl SandboxConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).context(format!("reading {}", path.display())))?;
        Self::from_json(&text).map_err(|e| e.context(format!("parsing {}", path.display())))
    }

    /// Load the file named by `RAYBOX_CONFIG`, or the defaults.
    ///
    /// Never fails: a bad file is reported and ignored.
    pub fn load() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", Path::new(&path).display());
                    config
                }
                Err(e) => {
                    log::warn!("{e}; using built-in defaults");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.window.ppm > 0.0) {
            return Err(Error::Config(format!("ppm must be positive, got {}", self.window.ppm)));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config("window size must be non-zero".into()));
        }
        if !(self.physics.time_step > 0.0) {
            return Err(Error::Config("time_step must be positive".into()));
        }
        if self.physics.sub_steps == 0 {
            return Err(Error::Config("sub_steps must be at least 1".into()));
        }
        if self.spawn.batch == 0 {
            return Err(Error::Config("spawn batch must be at least 1".into()));
        }
        if self.overlay.refresh_every == 0 {
            return Err(Error::Config("overlay refresh_every must be at least 1".into()));
        }

        let spawn = &self.spawn;
        let layout = &self.layout;
        let sizes = [
            ("spawn.width", spawn.width),
            ("spawn.height", spawn.height),
            ("layout.floor_thickness", layout.floor_thickness),
            ("layout.wall_thickness", layout.wall_thickness),
            ("layout.pillar_width", layout.pillar_width),
            ("layout.platform_size[0]", layout.platform_size[0]),
            ("layout.platform_size[1]", layout.platform_size[1]),
            ("layout.holder_size[0]", layout.holder_size[0]),
            ("layout.holder_size[1]", layout.holder_size[1]),
            ("layout.domino_size[0]", layout.domino_size[0]),
            ("layout.domino_size[1]", layout.domino_size[1]),
            ("layout.domino_growth[0]", layout.domino_growth[0]),
            ("layout.domino_growth[1]", layout.domino_growth[1]),
            ("layout.ball_radius", layout.ball_radius),
        ];
        for (name, value) in sizes {
            positive(name, value)?;
        }
        Ok(())
    }
}

/// Collider sizes and scale factors must be finite and above zero.
fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be positive, got {value}")))
    }
}
