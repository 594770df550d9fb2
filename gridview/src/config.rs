// config.rs - Viewer configuration
//
// Every section has a full set of defaults, so a config file only needs to
// name the values it changes. The file format is JSON; the path comes from
// `GRIDVIEW_CONFIG`.

use std::path::Path;

use egui::Color32;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS};

pub const CONFIG_ENV_VAR: &str = "GRIDVIEW_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub grid: GridConfig,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub palette: PaletteConfig,
    pub interaction: InteractionConfig,
    pub parameters: ParameterBounds,
}

/// Dimensions used until the host or the user supplies `width`/`height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub default_rows: usize,
    pub default_cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_rows: DEFAULT_ROWS,
            default_cols: DEFAULT_COLS,
        }
    }
}

/// World-space geometry of a cell; the pitch between cells is `cell_size + gutter`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub cell_size: f32,
    pub gutter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            gutter: 10.0,
        }
    }
}

impl LayoutConfig {
    pub fn pitch(&self) -> f32 {
        self.cell_size + self.gutter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub initial_zoom: f32,
    /// Zoom change per wheel line.
    pub wheel_percent: f32,
    /// Velocity multiplier applied every 16 ms of momentum.
    pub friction: f32,
    /// Momentum stops below this speed (screen px per ms).
    pub min_speed: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.05,
            max_zoom: 3.0,
            initial_zoom: 1.0,
            wheel_percent: 0.1,
            friction: 0.95,
            min_speed: 0.01,
        }
    }
}

/// Colors as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub alive: u32,
    pub dead: u32,
    pub background: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            alive: 0x235754,
            dead: 0x000F7E,
            background: 0x574536,
        }
    }
}

pub fn rgb(hex: u32) -> Color32 {
    Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hover_alpha: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { hover_alpha: 0.7 }
    }
}

/// Limits applied to every numeric simulation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    pub min: u32,
    pub max: u32,
    pub max_digits: usize,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            min: 1,
            max: 100,
            max_digits: 3,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects bounds that the grid, parameter and viewport code cannot clamp to.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.parameters;
        if p.min == 0 || p.min > p.max {
            return Err(ConfigError::Invalid(format!(
                "parameter bounds must satisfy 1 <= min <= max (min = {}, max = {})",
                p.min, p.max
            )));
        }
        if p.max_digits == 0 {
            return Err(ConfigError::Invalid("parameters.max_digits must be at least 1".into()));
        }

        let v = &self.viewport;
        if !(v.min_zoom.is_finite() && v.max_zoom.is_finite() && v.min_zoom > 0.0 && v.min_zoom <= v.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min_zoom <= max_zoom (min_zoom = {}, max_zoom = {})",
                v.min_zoom, v.max_zoom
            )));
        }
        let finite = [v.initial_zoom, v.wheel_percent, v.friction, v.min_speed];
        if finite.iter().any(|x| !x.is_finite()) {
            return Err(ConfigError::Invalid("viewport values must be finite".into()));
        }

        let l = &self.layout;
        if !(l.cell_size.is_finite() && l.gutter.is_finite() && l.cell_size > 0.0 && l.gutter >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "layout needs cell_size > 0 and gutter >= 0 (cell_size = {}, gutter = {})",
                l.cell_size, l.gutter
            )));
        }
        Ok(())
    }

    /// Loads from `GRIDVIEW_CONFIG` if set, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            info!("{} not set, using default configuration", CONFIG_ENV_VAR);
            return Self::default();
        };

        match Self::load(Path::new(&path)) {
            Ok(config) => {
                info!("Configuration loaded from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                Self::default()
            }
        }
    }
}
