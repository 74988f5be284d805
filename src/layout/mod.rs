//! Nesting layout model
//!
//! This module holds the typed data model for one nesting (surface,
//! placements, summary metrics), the normalization step that builds it from
//! the collaborator payload, the mm-to-screen transform, and the fallback
//! grid packer used when the optimizer returns no coordinates.

pub mod config;
pub mod normalize;
pub mod packer;
pub mod transform;
pub mod types;

pub use config::{CanvasConfig, PackerConfig};
pub use normalize::{
    normalize, normalize_all, normalize_surface, LayoutPayload, RawPlacement, RawSurface,
    MIN_PLACEMENT_HEIGHT, MIN_PLACEMENT_WIDTH,
};
pub use packer::{available_area, pack, pack_on_surface, GridCell, GridPlan};
pub use transform::{fit_scale, ScreenTransform};
pub use types::*;
