//! Nesting View - layout rendering and viewport engine for autoclave nesting
//!
//! This library turns the layout payload returned by the nesting optimizer
//! (a surface in millimeters plus tool placements) into an interactive,
//! zoomable 2D view: classification of every placement, adaptive labels,
//! a fallback grid when the optimizer returns no coordinates, and SVG/PNG
//! output.
//!
//! # Example
//!
//! ```rust
//! use nesting_view::render;
//!
//! let svg = render(r#"{
//!     "success": true,
//!     "layoutData": {
//!         "surface": { "lengthMm": 3000, "widthMm": 1500 },
//!         "placements": [{ "itemId": 1, "x": 10, "y": 10, "width": 400, "height": 300 }]
//!     }
//! }"#).unwrap();
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains(r#"id="item-1""#));
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod source;
pub mod stylesheet;
pub mod view;
pub mod viewport;

pub use config::{ConfigError, ViewerConfig};
pub use error::{ExportError, LoadError};
pub use layout::{
    classify, CanvasConfig, LayoutStats, NestingLayout, PackerConfig, Placement, PlacementSource,
    Surface, VisualState,
};
pub use renderer::{
    compose, render_svg, DisplayOptions, ExportOptions, PointerEvent, Scene, SceneInput,
    Selection, SvgConfig, ViewCommand, ViewEvent,
};
pub use source::{
    JsonFileSource, LayoutParams, LayoutRequest, LayoutResponse, LayoutSession, LayoutSource,
    RequestToken, Resolution, ViewStatus,
};
pub use stylesheet::{color_for, Stylesheet};
pub use view::NestingView;
pub use viewport::{Viewport, ViewportConfig, ViewportState};

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Render a layout response (or bare payload) to SVG with default configuration
pub fn render(json: &str) -> Result<String, RenderError> {
    render_with_config(json, &ViewerConfig::default())
}

/// Render a layout response to SVG at the configured default view
///
/// # Example
///
/// ```rust
/// use nesting_view::{render_with_config, DisplayOptions, ViewerConfig};
///
/// let config = ViewerConfig::new().with_display(DisplayOptions::new().with_grid(false));
/// let svg = render_with_config(r#"{ "surface": { "lengthMm": 1000, "widthMm": 800 }, "items": [{ "itemId": 4 }] }"#, &config).unwrap();
/// assert!(svg.contains("nv-placement"));
/// ```
pub fn render_with_config(json: &str, config: &ViewerConfig) -> Result<String, RenderError> {
    let payload = LayoutResponse::from_json(json)?.into_payload()?;
    let layout = NestingLayout::from_payload(&payload, &config.canvas, &config.packer);
    let viewport = Viewport::new(config.viewport);

    let scene = compose(&SceneInput {
        layout: &layout,
        viewport: viewport.state(),
        canvas: &config.canvas,
        display: &config.display,
        stylesheet: &config.stylesheet,
        selection: &Selection::default(),
    });
    Ok(render_svg(&scene, &config.svg))
}
