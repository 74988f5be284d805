//! Configuration for scene composition and SVG output

use serde::{Deserialize, Serialize};

/// Which layers of the scene are drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Background grid over the surface
    pub show_grid: bool,

    /// Grid spacing in millimeters
    pub grid_step_mm: f64,

    /// Millimeter labels along the top and left surface edges
    pub show_rulers: bool,

    /// Dashed guide inset from the surface border
    pub show_safety_margin: bool,

    pub safety_margin_mm: f64,

    /// Tooltip for the hovered placement
    pub show_tooltips: bool,

    pub show_legend: bool,

    pub show_stats: bool,

    /// Only draw placements on this layer ("piano")
    pub layer_filter: Option<u8>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            grid_step_mm: 100.0,
            show_rulers: true,
            show_safety_margin: false,
            safety_margin_mm: 20.0,
            show_tooltips: true,
            show_legend: true,
            show_stats: true,
            layer_filter: None,
        }
    }
}

impl DisplayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    pub fn with_rulers(mut self, show: bool) -> Self {
        self.show_rulers = show;
        self
    }

    pub fn with_safety_margin(mut self, margin_mm: Option<f64>) -> Self {
        match margin_mm {
            Some(margin) => {
                self.show_safety_margin = true;
                self.safety_margin_mm = margin;
            }
            None => self.show_safety_margin = false,
        }
        self
    }

    pub fn with_tooltips(mut self, show: bool) -> Self {
        self.show_tooltips = show;
        self
    }

    pub fn with_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    pub fn with_stats(mut self, show: bool) -> Self {
        self.show_stats = show;
        self
    }

    pub fn with_layer_filter(mut self, layer: Option<u8>) -> Self {
        self.layer_filter = layer;
        self
    }
}

/// Configuration options for SVG output
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Whether to include XML declaration and standalone attributes
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "nv-" for "nv-placement")
    pub class_prefix: Option<String>,

    pub font_family: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            pretty_print: true,
            class_prefix: Some("nv-".to_string()),
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SvgConfig::default();
        assert!(config.standalone);
        assert!(config.pretty_print);
        assert_eq!(config.class_prefix, Some("nv-".to_string()));

        let display = DisplayOptions::default();
        assert!(display.show_grid);
        assert!(display.show_tooltips);
        assert!(!display.show_safety_margin);
        assert_eq!(display.layer_filter, None);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SvgConfig::new()
            .with_standalone(false)
            .with_pretty_print(false)
            .with_class_prefix("my-");

        assert!(!config.standalone);
        assert!(!config.pretty_print);
        assert_eq!(config.class_prefix, Some("my-".to_string()));

        let display = DisplayOptions::new()
            .with_grid(false)
            .with_safety_margin(Some(30.0))
            .with_layer_filter(Some(2));
        assert!(!display.show_grid);
        assert!(display.show_safety_margin);
        assert_eq!(display.safety_margin_mm, 30.0);
        assert_eq!(display.layer_filter, Some(2));
    }
}
