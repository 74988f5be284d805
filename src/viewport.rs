//! Zoom and pan state for the layout view.
//!
//! Screen coordinates relate to content coordinates by
//! `screen = content * zoom + pan`. Every transition is applied
//! synchronously and the last one wins; a drag that keeps moving after
//! [`Viewport::reset`] or [`Viewport::end_drag`] is ignored because
//! `continue_drag` checks `is_dragging` first.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::layout::types::Point;

/// Limits and step sizes for viewport transitions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Zoom delta for toolbar zoom in/out
    pub zoom_step: f64,
    /// Zoom delta per wheel notch
    pub wheel_step: f64,
    /// Fraction of the viewport used by fit-to-bounds
    pub fit_margin: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 5.0,
            zoom_step: 0.2,
            wheel_step: 0.1,
            fit_margin: 0.9,
        }
    }
}

impl ViewportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrower zoom range for views of a single small surface
    pub fn bounded() -> Self {
        Self {
            zoom_min: 0.5,
            zoom_max: 3.0,
            ..Self::default()
        }
    }

    pub fn with_zoom_range(mut self, min: f64, max: f64) -> Self {
        self.zoom_min = min;
        self.zoom_max = max;
        self
    }

    pub fn with_zoom_step(mut self, step: f64) -> Self {
        self.zoom_step = step;
        self
    }

    pub fn with_wheel_step(mut self, step: f64) -> Self {
        self.wheel_step = step;
        self
    }

    /// Zoom range is finite, positive and ordered
    pub fn is_valid(&self) -> bool {
        self.zoom_min.is_finite()
            && self.zoom_max.is_finite()
            && self.zoom_min > 0.0
            && self.zoom_min <= self.zoom_max
    }
}

/// Current view transform plus drag bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub is_dragging: bool,
    /// `pointer - pan` captured when the drag started
    pub drag_anchor: Point,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            is_dragging: false,
            drag_anchor: Point::default(),
        }
    }
}

impl ViewportState {
    pub fn screen_to_content(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    pub fn content_to_screen(&self, content: Point) -> Point {
        Point::new(
            content.x * self.zoom + self.pan_x,
            content.y * self.zoom + self.pan_y,
        )
    }
}

/// Viewport controller: owns the state and applies transitions to it
#[derive(Debug, Clone)]
pub struct Viewport {
    config: ViewportConfig,
    state: ViewportState,
    layout_key: Option<String>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    /// Create a controller. An invalid zoom range is replaced by the default one.
    pub fn new(config: ViewportConfig) -> Self {
        let config = if config.is_valid() {
            config
        } else {
            warn!(?config, "invalid zoom range, using defaults");
            ViewportConfig::default()
        };
        let mut viewport = Self {
            config,
            state: ViewportState::default(),
            layout_key: None,
        };
        viewport.reset();
        viewport
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn pan(&self) -> Point {
        Point::new(self.state.pan_x, self.state.pan_y)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.state.zoom;
        }
        zoom.clamp(self.config.zoom_min, self.config.zoom_max)
    }

    /// Change zoom by `delta`, clamped to the configured range.
    ///
    /// With a center point the content under that screen point stays fixed;
    /// without one the pan offset is left alone.
    pub fn zoom_by(&mut self, delta: f64, center: Option<Point>) {
        let old_zoom = self.state.zoom;
        let new_zoom = self.clamp_zoom(old_zoom + delta);

        if let Some(center) = center {
            let ratio = new_zoom / old_zoom;
            self.state.pan_x = center.x - (center.x - self.state.pan_x) * ratio;
            self.state.pan_y = center.y - (center.y - self.state.pan_y) * ratio;
        }
        self.state.zoom = new_zoom;
        trace!(old_zoom, new_zoom, "zoom");
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.config.zoom_step, None);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-self.config.zoom_step, None);
    }

    /// Jump to an explicit view; zoom is clamped, any drag is cancelled
    pub fn set_view(&mut self, zoom: f64, pan: Point) {
        self.state = ViewportState {
            zoom: self.clamp_zoom(zoom),
            pan_x: pan.x,
            pan_y: pan.y,
            ..ViewportState::default()
        };
    }

    pub fn begin_drag(&mut self, screen_x: f64, screen_y: f64) {
        self.state.is_dragging = true;
        self.state.drag_anchor = Point::new(screen_x - self.state.pan_x, screen_y - self.state.pan_y);
    }

    /// Move the pan with the pointer; no effect unless a drag is active
    pub fn continue_drag(&mut self, screen_x: f64, screen_y: f64) {
        if !self.state.is_dragging {
            return;
        }
        self.state.pan_x = screen_x - self.state.drag_anchor.x;
        self.state.pan_y = screen_y - self.state.drag_anchor.y;
    }

    pub fn end_drag(&mut self) {
        self.state.is_dragging = false;
    }

    pub fn reset(&mut self) {
        self.state = ViewportState {
            zoom: self.clamp_zoom(1.0),
            ..ViewportState::default()
        };
    }

    /// Scale `content` to fill the viewport (less the fit margin) and center it.
    pub fn fit_to_bounds(
        &mut self,
        viewport_width: f64,
        viewport_height: f64,
        content_width: f64,
        content_height: f64,
    ) {
        if !(content_width > 0.0 && content_height > 0.0)
            || !(viewport_width > 0.0 && viewport_height > 0.0)
        {
            self.reset();
            return;
        }
        let scale = (viewport_width / content_width).min(viewport_height / content_height)
            * self.config.fit_margin;
        let zoom = self.clamp_zoom(scale);
        self.state = ViewportState {
            zoom,
            pan_x: (viewport_width - content_width * zoom) / 2.0,
            pan_y: (viewport_height - content_height * zoom) / 2.0,
            is_dragging: false,
            drag_anchor: Point::default(),
        };
    }

    /// Record the identity of the displayed layout, resetting the view when it changed.
    ///
    /// Returns `true` when a reset happened.
    pub fn observe_layout(&mut self, key: &str) -> bool {
        if self.layout_key.as_deref() == Some(key) {
            return false;
        }
        self.layout_key = Some(key.to_string());
        self.reset();
        true
    }

    pub fn screen_to_content(&self, screen: Point) -> Point {
        self.state.screen_to_content(screen)
    }

    pub fn content_to_screen(&self, content: Point) -> Point {
        self.state.content_to_screen(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zoom_about_cursor_keeps_point_fixed() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(0.0, 0.0);
        viewport.continue_drag(30.0, -10.0);
        viewport.end_drag();

        let cursor = Point::new(200.0, 150.0);
        let before = viewport.screen_to_content(cursor);
        viewport.zoom_by(0.5, Some(cursor));
        let after = viewport.screen_to_content(cursor);

        assert!(approx_eq(viewport.zoom(), 1.5));
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_toolbar_zoom_leaves_pan() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(10.0, 10.0);
        viewport.continue_drag(50.0, 70.0);
        viewport.end_drag();
        viewport.zoom_in();
        assert!(approx_eq(viewport.zoom(), 1.2));
        assert_eq!(viewport.pan(), Point::new(40.0, 60.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::new(ViewportConfig::bounded());
        for _ in 0..50 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom(), 3.0);
        for _ in 0..50 {
            viewport.zoom_by(-1.0, Some(Point::new(5.0, 5.0)));
        }
        assert_eq!(viewport.zoom(), 0.5);
    }

    #[test]
    fn test_drag_updates_pan_from_anchor() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(100.0, 100.0);
        viewport.continue_drag(130.0, 80.0);
        assert_eq!(viewport.pan(), Point::new(30.0, -20.0));
        viewport.end_drag();
        viewport.begin_drag(10.0, 10.0);
        viewport.continue_drag(20.0, 20.0);
        assert_eq!(viewport.pan(), Point::new(40.0, -10.0));
    }

    #[test]
    fn test_stale_drag_after_reset_is_ignored() {
        let mut viewport = Viewport::default();
        viewport.begin_drag(0.0, 0.0);
        viewport.reset();
        viewport.continue_drag(300.0, 300.0);
        assert_eq!(viewport.pan(), Point::new(0.0, 0.0));
        assert!(!viewport.state().is_dragging);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut viewport = Viewport::default();
        viewport.fit_to_bounds(1000.0, 500.0, 2000.0, 500.0);
        // min(0.5, 1.0) * 0.9
        assert!(approx_eq(viewport.zoom(), 0.45));
        assert!(approx_eq(viewport.pan().x, (1000.0 - 900.0) / 2.0));
        assert!(approx_eq(viewport.pan().y, (500.0 - 225.0) / 2.0));
    }

    #[test]
    fn test_fit_to_empty_content_resets() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        viewport.fit_to_bounds(800.0, 600.0, 0.0, 100.0);
        assert_eq!(*viewport.state(), ViewportState::default());
    }

    #[test]
    fn test_observe_layout_resets_on_change_only() {
        let mut viewport = Viewport::default();
        assert!(viewport.observe_layout("n1"));
        viewport.zoom_in();
        assert!(!viewport.observe_layout("n1"));
        assert!(approx_eq(viewport.zoom(), 1.2));
        assert!(viewport.observe_layout("n2"));
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn test_set_view_clamps_zoom() {
        let mut viewport = Viewport::new(ViewportConfig::bounded());
        viewport.set_view(10.0, Point::new(5.0, -5.0));
        assert_eq!(viewport.zoom(), 3.0);
        assert_eq!(viewport.pan(), Point::new(5.0, -5.0));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let viewport = Viewport::new(ViewportConfig::default().with_zoom_range(3.0, 1.0));
        assert_eq!(*viewport.config(), ViewportConfig::default());
    }
}
