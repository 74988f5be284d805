//! Pointer and toolbar input → viewport transitions and selection events

use tracing::trace;

use crate::layout::Point;
use crate::renderer::scene::Scene;
use crate::viewport::Viewport;

/// Pointer travel below which a press/release pair counts as a click
pub const CLICK_TOLERANCE_PX: f64 = 3.0;

/// Selected and hovered item ids. Hover is transient display state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub selected_id: Option<i64>,
    pub hovered_id: Option<i64>,
}

impl Selection {
    /// Select `id`, or deselect it when it is already selected
    pub fn toggle(&mut self, id: i64) {
        self.selected_id = if self.selected_id == Some(id) {
            None
        } else {
            Some(id)
        };
    }
}

/// Raw pointer input in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Leave,
    /// Negative `delta_y` zooms in
    Wheel { x: f64, y: f64, delta_y: f64 },
}

/// Toolbar actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    ZoomIn,
    ZoomOut,
    Reset,
    Fit,
}

/// Outcome of an input event, for the embedding screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    ItemClicked(i64),
    SelectionChanged(Option<i64>),
    HoverChanged(Option<i64>),
    /// Zoom or pan changed; the scene needs recomposing
    ViewChanged,
    RetryRequested,
}

#[derive(Debug, Clone)]
pub struct Interaction {
    selection: Selection,
    press: Option<Point>,
    click_tolerance: f64,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            press: None,
            click_tolerance: CLICK_TOLERANCE_PX,
        }
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_click_tolerance(mut self, tolerance: f64) -> Self {
        self.click_tolerance = tolerance;
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn select(&mut self, id: Option<i64>) {
        self.selection.selected_id = id;
    }

    pub fn hover(&mut self, id: Option<i64>) {
        self.selection.hovered_id = id;
    }

    /// Forget selection, hover and any pending press
    pub fn clear(&mut self) {
        self.selection = Selection::default();
        self.press = None;
    }

    /// Apply one pointer event
    pub fn handle(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        scene: &Scene,
    ) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        match event {
            PointerEvent::Down { x, y } => {
                self.press = Some(Point::new(x, y));
                if scene.is_ready() {
                    viewport.begin_drag(x, y);
                }
            }
            PointerEvent::Move { x, y } => {
                if viewport.state().is_dragging {
                    let before = viewport.pan();
                    viewport.continue_drag(x, y);
                    if viewport.pan() != before {
                        events.push(ViewEvent::ViewChanged);
                    }
                } else if scene.is_ready() {
                    let hovered = scene.shape_at(viewport.screen_to_content(Point::new(x, y)));
                    if hovered != self.selection.hovered_id {
                        self.selection.hovered_id = hovered;
                        events.push(ViewEvent::HoverChanged(hovered));
                    }
                }
            }
            PointerEvent::Up { x, y } => {
                viewport.end_drag();
                let point = Point::new(x, y);
                let Some(start) = self.press.take() else {
                    return events;
                };
                let travel = ((point.x - start.x).powi(2) + (point.y - start.y).powi(2)).sqrt();
                if travel > self.click_tolerance {
                    return events;
                }
                if !scene.is_ready() {
                    if scene.hits_retry(point) {
                        events.push(ViewEvent::RetryRequested);
                    }
                    return events;
                }
                self.click(scene.shape_at(viewport.screen_to_content(point)), &mut events);
            }
            PointerEvent::Leave => {
                viewport.end_drag();
                self.press = None;
                if self.selection.hovered_id.take().is_some() {
                    events.push(ViewEvent::HoverChanged(None));
                }
            }
            PointerEvent::Wheel { x, y, delta_y } => {
                if !scene.is_ready() || delta_y == 0.0 || delta_y.is_nan() {
                    return events;
                }
                let step = viewport.config().wheel_step;
                let delta = if delta_y < 0.0 { step } else { -step };
                let before = viewport.zoom();
                viewport.zoom_by(delta, Some(Point::new(x, y)));
                if viewport.zoom() != before {
                    events.push(ViewEvent::ViewChanged);
                }
            }
        }
        trace!(?event, ?events, "pointer");
        events
    }

    fn click(&mut self, hit: Option<i64>, events: &mut Vec<ViewEvent>) {
        match hit {
            Some(id) => {
                events.push(ViewEvent::ItemClicked(id));
                self.selection.toggle(id);
                events.push(ViewEvent::SelectionChanged(self.selection.selected_id));
            }
            None => {
                if self.selection.selected_id.take().is_some() {
                    events.push(ViewEvent::SelectionChanged(None));
                }
            }
        }
    }

    /// Apply a toolbar command
    pub fn apply(
        &mut self,
        command: ViewCommand,
        viewport: &mut Viewport,
        scene: &Scene,
    ) -> Vec<ViewEvent> {
        let before = *viewport.state();
        match command {
            ViewCommand::ZoomIn => viewport.zoom_in(),
            ViewCommand::ZoomOut => viewport.zoom_out(),
            ViewCommand::Reset => viewport.reset(),
            ViewCommand::Fit => viewport.fit_to_bounds(
                scene.width,
                scene.height,
                scene.content.width,
                scene.content.height,
            ),
        }
        if *viewport.state() != before {
            vec![ViewEvent::ViewChanged]
        } else {
            vec![]
        }
    }
}
