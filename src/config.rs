//! Viewer configuration file
//!
//! ```toml
//! [canvas]
//! width = 1600
//! height = 900
//!
//! [viewport]
//! zoom_min = 0.5
//! zoom_max = 3.0
//!
//! [display]
//! show_grid = false
//! layer_filter = 2
//!
//! [metadata]
//! name = "Shop floor"
//!
//! [colors]
//! valid-fill = "#66bb6a"
//! ```
//!
//! Every section is optional.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{CanvasConfig, PackerConfig};
use crate::renderer::{DisplayOptions, SvgConfig};
use crate::stylesheet::{Stylesheet, TomlMetadata};
use crate::viewport::ViewportConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TomlViewerConfig {
    canvas: CanvasConfig,
    packer: PackerConfig,
    viewport: ViewportConfig,
    display: DisplayOptions,
    metadata: Option<TomlMetadata>,
    colors: HashMap<String, String>,
}

/// Everything the view needs besides the layout itself
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub canvas: CanvasConfig,
    pub packer: PackerConfig,
    pub viewport: ViewportConfig,
    pub display: DisplayOptions,
    pub svg: SvgConfig,
    pub stylesheet: Stylesheet,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            packer: PackerConfig::default(),
            viewport: ViewportConfig::default(),
            display: DisplayOptions::default(),
            svg: SvgConfig::default(),
            stylesheet: Stylesheet::default(),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate a TOML config
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlViewerConfig = toml::from_str(content)?;
        let stylesheet = if parsed.metadata.is_none() && parsed.colors.is_empty() {
            Stylesheet::default()
        } else {
            Stylesheet::from_parts(parsed.metadata, parsed.colors)
        };
        let config = Self {
            canvas: parsed.canvas,
            packer: parsed.packer,
            viewport: parsed.viewport,
            display: parsed.display,
            svg: SvgConfig::default(),
            stylesheet,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    pub fn with_svg(mut self, svg: SvgConfig) -> Self {
        self.svg = svg;
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Reject values that would make scaling or zooming meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {}", value),
                })
            }
        }

        positive("canvas.width", self.canvas.width)?;
        positive("canvas.height", self.canvas.height)?;
        positive("canvas.max_scale", self.canvas.max_scale)?;
        positive("canvas.min_surface_mm", self.canvas.min_surface_mm)?;
        if !(self.canvas.margin_mm.is_finite() && self.canvas.margin_mm >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "canvas.margin_mm",
                reason: "must be zero or positive".to_string(),
            });
        }

        positive("viewport.zoom_min", self.viewport.zoom_min)?;
        positive("viewport.zoom_max", self.viewport.zoom_max)?;
        if self.viewport.zoom_min > self.viewport.zoom_max {
            return Err(ConfigError::Invalid {
                field: "viewport.zoom_min",
                reason: format!(
                    "{} is larger than zoom_max {}",
                    self.viewport.zoom_min, self.viewport.zoom_max
                ),
            });
        }
        positive("viewport.zoom_step", self.viewport.zoom_step)?;
        positive("viewport.wheel_step", self.viewport.wheel_step)?;
        if !(self.viewport.fit_margin > 0.0 && self.viewport.fit_margin <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "viewport.fit_margin",
                reason: "must be in (0, 1]".to_string(),
            });
        }

        positive("display.grid_step_mm", self.display.grid_step_mm)?;
        if let Some(layer) = self.display.layer_filter {
            if !(1..=2).contains(&layer) {
                return Err(ConfigError::Invalid {
                    field: "display.layer_filter",
                    reason: format!("layer must be 1 or 2, got {}", layer),
                });
            }
        }
        Ok(())
    }
}
