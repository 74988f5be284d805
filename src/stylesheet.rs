//! Stylesheet system for the layout color palette
//!
//! Colors are looked up by symbolic token (`valid-fill`, `surface-stroke`,
//! `selection`, ...). A stylesheet may override any subset of tokens; the
//! rest resolve through the built-in palette and then a category default,
//! so every lookup yields a color.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::types::VisualState;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Fill and stroke for one visual state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateColors {
    pub fill: String,
    pub stroke: String,
}

/// Fixed color lookup for each visual state
pub fn color_for(state: VisualState) -> StateColors {
    let (fill, stroke) = match state {
        VisualState::Valid => ("#4caf50", "#2e7d32"),
        VisualState::Rotated => ("#ffc107", "#ff8f00"),
        VisualState::Excluded => ("#f44336", "#c62828"),
        VisualState::OutOfBounds => ("#ff9800", "#e65100"),
    };
    StateColors {
        fill: fill.to_string(),
        stroke: stroke.to_string(),
    }
}

/// A stylesheet mapping symbolic colors to concrete values
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Color mappings: token name -> hex color
    pub colors: HashMap<String, String>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TomlMetadata {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

/// Default palette
const DEFAULT_PALETTE: &str = r##"
[colors]
# Placement states
valid-fill = "#4caf50"
valid-stroke = "#2e7d32"
rotated-fill = "#ffc107"
rotated-stroke = "#ff8f00"
excluded-fill = "#f44336"
excluded-stroke = "#c62828"
out-of-bounds-fill = "#ff9800"
out-of-bounds-stroke = "#e65100"

# Surface and guides
surface-fill = "#f5f5f5"
surface-stroke = "#333333"
grid = "#e0e0e0"
ruler = "#999999"
safety-margin = "#ff9800"

# Text
text-1 = "#333333"
text-2 = "#666666"
text-dark = "#1a1a1a"
text-light = "#ffffff"

# Interaction
selection = "#2196f3"
hover = "#1565c0"

# Overlays
background-1 = "#ffffff"
background-2 = "#fafafa"
panel-border = "#cccccc"
status-warning = "#ff9800"
status-error = "#f44336"
"##;

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load stylesheet from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;
        Ok(Self::from_parts(parsed.metadata, parsed.colors))
    }

    pub(crate) fn from_parts(metadata: Option<TomlMetadata>, colors: HashMap<String, String>) -> Self {
        let metadata = metadata.unwrap_or_default();
        Stylesheet {
            name: metadata.name,
            description: metadata.description,
            colors,
        }
    }

    /// Resolve a symbolic color token to a concrete value
    ///
    /// Returns None if the token is not defined in this stylesheet.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(|s| s.as_str())
    }

    /// Resolve a symbolic color token with fallback to default palette
    ///
    /// Fallback order:
    /// 1. Check this stylesheet for exact token
    /// 2. Check default palette for exact token
    /// 3. Use category default (state tokens use [`color_for`])
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        for state in VisualState::ALL {
            if let Some(rest) = token.strip_prefix(state.token()) {
                let colors = color_for(state);
                return if rest.starts_with("-stroke") {
                    colors.stroke
                } else {
                    colors.fill
                };
            }
        }
        if token.starts_with("surface") {
            return "#f5f5f5".to_string();
        }
        if token.starts_with("background") {
            return "#ffffff".to_string();
        }
        if token.starts_with("text") {
            return "#333333".to_string();
        }
        if token.starts_with("status") {
            return "#666666".to_string();
        }

        // Unknown category - return dark gray
        "#333333".to_string()
    }

    /// Fill and stroke for a visual state, honoring overrides
    pub fn state_colors(&self, state: VisualState) -> StateColors {
        StateColors {
            fill: self.resolve_or_default(&format!("{}-fill", state.token())),
            stroke: self.resolve_or_default(&format!("{}-stroke", state.token())),
        }
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_str(DEFAULT_PALETTE).expect("Default palette should be valid TOML")
    }
}
