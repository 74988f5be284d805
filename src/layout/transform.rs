//! Millimeter to screen coordinate mapping.
//!
//! The surface is drawn at `margin_px + mm * scale` on both axes. The scale
//! is the largest value that fits the surface plus its margin inside the
//! drawing area, capped at [`CanvasConfig::max_scale`] so small surfaces are
//! not blown up past the display budget.
//!
//! Screen coordinates produced here are *content* coordinates: the viewport
//! zoom and pan are applied on top of them.

use crate::layout::config::CanvasConfig;
use crate::layout::types::{BoundingBox, Point, Surface};

/// Uniform scale plus margin offset from mm to screen units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    /// Screen units per millimeter
    pub scale: f64,
    /// Offset applied to both axes, in screen units
    pub margin_px: f64,
}

impl ScreenTransform {
    pub fn new(scale: f64, margin_px: f64) -> Self {
        Self { scale, margin_px }
    }

    /// Fit a surface into the configured drawing area.
    ///
    /// Unusable surface dimensions are replaced by `min_surface_mm` first.
    pub fn fit(surface: &Surface, canvas: &CanvasConfig) -> Self {
        let (length, width) = surface.scale_extent(canvas.min_surface_mm);
        let margin_mm = canvas.margin_mm.max(0.0);
        let scale = fit_scale(
            length,
            width,
            canvas.width,
            canvas.height,
            margin_mm,
            canvas.max_scale,
        );
        Self::new(scale, margin_mm * scale)
    }

    pub fn point_to_screen(&self, point: Point) -> Point {
        Point::new(
            self.margin_px + point.x * self.scale,
            self.margin_px + point.y * self.scale,
        )
    }

    /// Inverse of [`point_to_screen`](Self::point_to_screen)
    pub fn point_to_mm(&self, point: Point) -> Point {
        if self.scale <= 0.0 {
            return Point::default();
        }
        Point::new(
            (point.x - self.margin_px) / self.scale,
            (point.y - self.margin_px) / self.scale,
        )
    }

    pub fn length_to_screen(&self, mm: f64) -> f64 {
        mm * self.scale
    }

    /// Map a millimeter rectangle to screen units
    pub fn to_screen(&self, bounds_mm: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.margin_px + bounds_mm.x * self.scale,
            self.margin_px + bounds_mm.y * self.scale,
            bounds_mm.width * self.scale,
            bounds_mm.height * self.scale,
        )
    }
}

/// `min(target_w / (length + 2·margin), target_h / (width + 2·margin))`, capped at `max_scale`.
///
/// Returns a small positive scale for degenerate inputs instead of 0, NaN or infinity.
pub fn fit_scale(
    length_mm: f64,
    width_mm: f64,
    target_width: f64,
    target_height: f64,
    margin_mm: f64,
    max_scale: f64,
) -> f64 {
    let span_x = length_mm + 2.0 * margin_mm;
    let span_y = width_mm + 2.0 * margin_mm;
    if !(span_x > 0.0 && span_y > 0.0) {
        return max_scale.max(f64::EPSILON);
    }
    let scale = (target_width / span_x).min(target_height / span_y);
    let cap = if max_scale > 0.0 { max_scale } else { f64::INFINITY };
    if scale.is_finite() && scale > 0.0 {
        scale.min(cap)
    } else {
        f64::EPSILON
    }
}
