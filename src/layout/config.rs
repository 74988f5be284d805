//! Configuration for surface scaling and fallback packing

use serde::{Deserialize, Serialize};

/// How the surface is fitted into the drawing area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Drawing area width in screen units
    pub width: f64,

    /// Drawing area height in screen units
    pub height: f64,

    /// Margin around the surface, in millimeters
    pub margin_mm: f64,

    /// Upper bound for the mm-to-screen scale
    pub max_scale: f64,

    /// Surface size substituted for scale computation when the surface is unusable
    pub min_surface_mm: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin_mm: 50.0,
            max_scale: 0.8,
            min_surface_mm: 100.0,
        }
    }
}

impl CanvasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the drawing area size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the margin around the surface
    pub fn with_margin_mm(mut self, margin_mm: f64) -> Self {
        self.margin_mm = margin_mm;
        self
    }

    /// Set the scale cap
    pub fn with_max_scale(mut self, max_scale: f64) -> Self {
        self.max_scale = max_scale;
        self
    }
}

/// Grid parameters for the fallback packer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
    /// Offset of the grid from the surface edges
    pub content_padding: f64,

    /// Gap between neighbouring cells
    pub cell_gap: f64,

    pub min_cell_width: f64,

    pub min_cell_height: f64,

    /// Lower bound on the number of columns
    pub min_columns: usize,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            content_padding: 10.0,
            cell_gap: 8.0,
            min_cell_width: 40.0,
            min_cell_height: 30.0,
            min_columns: 2,
        }
    }
}

impl PackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_padding(mut self, padding: f64) -> Self {
        self.content_padding = padding;
        self
    }

    pub fn with_cell_gap(mut self, gap: f64) -> Self {
        self.cell_gap = gap;
        self
    }
}
