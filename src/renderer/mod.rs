//! Layout renderer
//!
//! Composes a [`NestingLayout`](crate::layout::NestingLayout), the viewport
//! state and the display options into a [`Scene`], serializes scenes to SVG,
//! and turns pointer input back into viewport transitions and selection
//! events.

pub mod config;
pub mod export;
pub mod interaction;
pub mod label;
pub mod scene;
pub mod svg;

pub use config::{DisplayOptions, SvgConfig};
pub use export::{export_png, png_data_uri, ExportOptions};
pub use interaction::{Interaction, PointerEvent, Selection, ViewCommand, ViewEvent};
pub use label::{dynamic_font_size, is_text_visible, truncate, LabelLine, LabelLineKind, LabelPlan};
pub use scene::{
    compose, tooltip_lines, DrawCommand, PlacedShape, Scene, SceneInput, SceneStatus, TextAnchor,
    ViewTransform,
};
pub use svg::{escape_xml, render_svg};
