//! Scene composition
//!
//! [`compose`] is a pure function of the layout, the viewport state, the
//! display options and the current selection. It produces a [`Scene`]: two
//! ordered lists of draw commands plus the hit-test shapes. Nothing here
//! touches a rendering surface; [`super::svg`] serializes a scene.
//!
//! Paint order, back to front:
//! 1. grid and rulers
//! 2. surface border and label
//! 3. safety margin guide
//! 4. placements, in input order
//! 5. selection outline
//! 6. fixed overlays (legend, stats, unplaced warning, tooltip)
//!
//! Steps 1–5 live in [`Scene::world`] and move with pan/zoom; step 6 lives
//! in [`Scene::overlay`] and does not.

use tracing::warn;

use crate::layout::{
    BoundingBox, CanvasConfig, NestingLayout, Placement, PlacementSource, Point, ScreenTransform,
    VisualState, MIN_PLACEMENT_HEIGHT, MIN_PLACEMENT_WIDTH,
};
use crate::renderer::config::DisplayOptions;
use crate::renderer::interaction::Selection;
use crate::renderer::label::LabelPlan;
use crate::stylesheet::Stylesheet;
use crate::viewport::ViewportState;

const MAX_GRID_LINES: usize = 500;
const OVERLAY_FONT: f64 = 12.0;
const OVERLAY_LINE: f64 = 16.0;
const OVERLAY_PADDING: f64 = 10.0;
const OVERLAY_INSET: f64 = 12.0;
const UNPLACED_LISTED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectCommand {
    pub id: Option<String>,
    pub class: &'static str,
    pub bounds: BoundingBox,
    /// `"none"` for outlines
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub dash: Option<String>,
    pub opacity: f64,
    pub corner_radius: f64,
}

impl RectCommand {
    pub fn new(class: &'static str, bounds: BoundingBox) -> Self {
        Self {
            id: None,
            class,
            bounds,
            fill: "none".to_string(),
            stroke: "none".to_string(),
            stroke_width: 0.0,
            dash: None,
            opacity: 1.0,
            corner_radius: 0.0,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn stroke(mut self, stroke: impl Into<String>, width: f64) -> Self {
        self.stroke = stroke.into();
        self.stroke_width = width;
        self
    }

    pub fn dash(mut self, dash: impl Into<String>) -> Self {
        self.dash = Some(dash.into());
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn rounded(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineCommand {
    pub class: &'static str,
    pub from: Point,
    pub to: Point,
    pub stroke: String,
    pub stroke_width: f64,
    pub dash: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub class: &'static str,
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    pub anchor: TextAnchor,
    pub fill: String,
    pub bold: bool,
}

impl TextCommand {
    pub fn new(
        class: &'static str,
        position: Point,
        content: impl Into<String>,
        font_size: f64,
        fill: impl Into<String>,
    ) -> Self {
        Self {
            class,
            position,
            content: content.into(),
            font_size,
            anchor: TextAnchor::Start,
            fill: fill.into(),
            bold: false,
        }
    }

    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// One drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect(RectCommand),
    Line(LineCommand),
    Text(TextCommand),
}

/// Pan/zoom applied to the world layer: `screen = content * zoom + pan`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl ViewTransform {
    pub fn identity() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

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

    pub fn bounds_to_screen(&self, bounds: &BoundingBox) -> BoundingBox {
        let origin = self.content_to_screen(Point::new(bounds.x, bounds.y));
        BoundingBox::new(
            origin.x,
            origin.y,
            bounds.width * self.zoom,
            bounds.height * self.zoom,
        )
    }
}

impl From<&ViewportState> for ViewTransform {
    fn from(state: &ViewportState) -> Self {
        let zoom = if state.zoom.is_finite() && state.zoom > 0.0 {
            state.zoom
        } else {
            1.0
        };
        Self {
            zoom,
            pan_x: state.pan_x,
            pan_y: state.pan_y,
        }
    }
}

/// What the canvas area shows
#[derive(Debug, Clone, PartialEq)]
pub enum SceneStatus {
    Ready,
    Loading,
    Error { message: String, retryable: bool },
    InvalidLayout { reason: String },
    /// The nesting has no items at all
    Empty,
}

/// A drawn placement, kept for hit testing
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedShape {
    pub item_id: i64,
    pub state: VisualState,
    /// Content-space rectangle
    pub bounds: BoundingBox,
    pub label: LabelPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub view: ViewTransform,
    pub status: SceneStatus,
    /// Canvas background color
    pub background: String,
    /// Extent of the drawing in content coordinates (surface plus margins)
    pub content: BoundingBox,
    /// Commands affected by pan/zoom, in paint order
    pub world: Vec<DrawCommand>,
    /// Fixed-position commands drawn over the world layer
    pub overlay: Vec<DrawCommand>,
    pub shapes: Vec<PlacedShape>,
    /// Screen rectangle of the retry button on a retryable error panel
    pub retry_button: Option<BoundingBox>,
}

impl Scene {
    fn empty(
        width: f64,
        height: f64,
        view: ViewTransform,
        status: SceneStatus,
        background: String,
    ) -> Self {
        Self {
            width,
            height,
            view,
            status,
            background,
            content: BoundingBox::zero(),
            world: Vec::new(),
            overlay: Vec::new(),
            shapes: Vec::new(),
            retry_button: None,
        }
    }

    /// A replacement panel shown instead of the canvas
    pub fn status_panel(
        status: SceneStatus,
        width: f64,
        height: f64,
        stylesheet: &Stylesheet,
    ) -> Self {
        let mut scene = Self::empty(
            width,
            height,
            ViewTransform::identity(),
            status.clone(),
            stylesheet.resolve_or_default("background-1"),
        );
        let center = Point::new(width / 2.0, height / 2.0);
        let text = stylesheet.resolve_or_default("text-1");

        scene.overlay.push(DrawCommand::Rect(
            RectCommand::new("panel", BoundingBox::new(0.0, 0.0, width, height))
                .fill(stylesheet.resolve_or_default("background-2"))
                .stroke(stylesheet.resolve_or_default("panel-border"), 1.0),
        ));

        let (title, detail, accent) = match &status {
            SceneStatus::Ready => return scene,
            SceneStatus::Loading => ("Loading layout…".to_string(), None, text.clone()),
            SceneStatus::Empty => ("No tools in this nesting".to_string(), None, text.clone()),
            SceneStatus::Error { message, .. } => (
                "Could not load layout".to_string(),
                Some(message.clone()),
                stylesheet.resolve_or_default("status-error"),
            ),
            SceneStatus::InvalidLayout { reason } => (
                "Invalid layout".to_string(),
                Some(reason.clone()),
                stylesheet.resolve_or_default("status-warning"),
            ),
        };

        scene.overlay.push(DrawCommand::Text(
            TextCommand::new("panel-title", center, title, 16.0, accent)
                .anchor(TextAnchor::Middle)
                .bold(),
        ));
        if let Some(detail) = detail {
            scene.overlay.push(DrawCommand::Text(
                TextCommand::new(
                    "panel-message",
                    Point::new(center.x, center.y + 22.0),
                    detail,
                    OVERLAY_FONT,
                    stylesheet.resolve_or_default("text-2"),
                )
                .anchor(TextAnchor::Middle),
            ));
        }

        if let SceneStatus::Error {
            retryable: true, ..
        } = status
        {
            let button = BoundingBox::new(center.x - 50.0, center.y + 40.0, 100.0, 32.0);
            scene.overlay.push(DrawCommand::Rect(
                RectCommand::new("retry", button)
                    .fill(stylesheet.resolve_or_default("selection"))
                    .rounded(4.0),
            ));
            scene.overlay.push(DrawCommand::Text(
                TextCommand::new(
                    "retry-label",
                    Point::new(button.center().x, button.center().y + 4.0),
                    "Retry",
                    13.0,
                    stylesheet.resolve_or_default("text-light"),
                )
                .anchor(TextAnchor::Middle)
                .bold(),
            ));
            scene.retry_button = Some(button);
        }

        scene
    }

    pub fn is_ready(&self) -> bool {
        self.status == SceneStatus::Ready
    }

    pub fn shape(&self, item_id: i64) -> Option<&PlacedShape> {
        self.shapes.iter().find(|s| s.item_id == item_id)
    }

    /// Item under a screen point; the last drawn shape wins on overlap
    pub fn hit_test(&self, screen: Point) -> Option<i64> {
        self.shape_at(self.view.screen_to_content(screen))
    }

    /// Item under a content-space point
    pub fn shape_at(&self, content: Point) -> Option<i64> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.bounds.contains(content))
            .map(|s| s.item_id)
    }

    /// True when the point is on the retry button of an error panel
    pub fn hits_retry(&self, screen: Point) -> bool {
        self.retry_button.is_some_and(|b| b.contains(screen))
    }
}

/// Everything the composer reads
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub layout: &'a NestingLayout,
    pub viewport: &'a ViewportState,
    pub canvas: &'a CanvasConfig,
    pub display: &'a DisplayOptions,
    pub stylesheet: &'a Stylesheet,
    pub selection: &'a Selection,
}

/// Compose the scene for one frame
pub fn compose(input: &SceneInput<'_>) -> Scene {
    let layout = input.layout;
    let (width, height) = (input.canvas.width, input.canvas.height);

    if !layout.surface.is_valid() {
        warn!(
            length_mm = layout.surface.length_mm,
            width_mm = layout.surface.width_mm,
            "surface is not usable, showing invalid layout panel"
        );
        let reason = format!(
            "Surface dimensions {} × {} mm are not usable",
            format_number(layout.surface.length_mm),
            format_number(layout.surface.width_mm)
        );
        return Scene::status_panel(
            SceneStatus::InvalidLayout { reason },
            width,
            height,
            input.stylesheet,
        );
    }
    if layout.is_empty() {
        return Scene::status_panel(SceneStatus::Empty, width, height, input.stylesheet);
    }

    let view = ViewTransform::from(input.viewport);
    let transform = ScreenTransform::fit(&layout.surface, input.canvas);
    let mut scene = Scene::empty(
        width,
        height,
        view,
        SceneStatus::Ready,
        input.stylesheet.resolve_or_default("background-1"),
    );
    let composer = Composer {
        input,
        transform,
        zoom: view.zoom,
    };
    let area = composer.surface_box();
    scene.content = BoundingBox::new(
        0.0,
        0.0,
        area.right() + transform.margin_px,
        area.bottom() + transform.margin_px,
    );

    composer.surface_fill(&mut scene);
    composer.grid(&mut scene);
    composer.surface(&mut scene);
    composer.safety_margin(&mut scene);
    composer.placements(&mut scene);
    composer.selection_outline(&mut scene);
    composer.legend(&mut scene);
    composer.stats(&mut scene);
    composer.unplaced_warning(&mut scene);
    composer.tooltip(&mut scene);

    scene
}

/// Grow tiny rectangles to the minimum drawn size, keeping the top-left corner
fn drawn_bounds(bounds: BoundingBox) -> BoundingBox {
    BoundingBox::new(
        bounds.x,
        bounds.y,
        bounds.width.max(MIN_PLACEMENT_WIDTH),
        bounds.height.max(MIN_PLACEMENT_HEIGHT),
    )
}

struct Composer<'a> {
    input: &'a SceneInput<'a>,
    transform: ScreenTransform,
    zoom: f64,
}

impl Composer<'_> {
    fn color(&self, token: &str) -> String {
        self.input.stylesheet.resolve_or_default(token)
    }

    /// Screen-constant length expressed in content units
    fn px(&self, screen: f64) -> f64 {
        screen / self.zoom
    }

    fn surface_box(&self) -> BoundingBox {
        self.transform.to_screen(&self.input.layout.surface.bounds())
    }

    fn surface_fill(&self, scene: &mut Scene) {
        scene.world.push(DrawCommand::Rect(
            RectCommand::new("surface-fill", self.surface_box()).fill(self.color("surface-fill")),
        ));
    }

    fn grid(&self, scene: &mut Scene) {
        let display = self.input.display;
        let step = display.grid_step_mm;
        if !(display.show_grid || display.show_rulers) || !(step.is_finite() && step > 0.0) {
            return;
        }
        let surface = &self.input.layout.surface;
        let area = self.surface_box();
        let xs = grid_offsets(surface.length_mm, step);
        let ys = grid_offsets(surface.width_mm, step);

        if display.show_grid {
            let stroke = self.color("grid");
            for x in xs.iter().filter(|x| **x > 0.0) {
                let sx = self.transform.point_to_screen(Point::new(*x, 0.0)).x;
                scene.world.push(DrawCommand::Line(LineCommand {
                    class: "grid",
                    from: Point::new(sx, area.y),
                    to: Point::new(sx, area.bottom()),
                    stroke: stroke.clone(),
                    stroke_width: self.px(1.0),
                    dash: None,
                }));
            }
            for y in ys.iter().filter(|y| **y > 0.0) {
                let sy = self.transform.point_to_screen(Point::new(0.0, *y)).y;
                scene.world.push(DrawCommand::Line(LineCommand {
                    class: "grid",
                    from: Point::new(area.x, sy),
                    to: Point::new(area.right(), sy),
                    stroke: stroke.clone(),
                    stroke_width: self.px(1.0),
                    dash: None,
                }));
            }
        }

        if display.show_rulers {
            let fill = self.color("ruler");
            let font = self.px(9.0);
            for x in &xs {
                let sx = self.transform.point_to_screen(Point::new(*x, 0.0)).x;
                scene.world.push(DrawCommand::Text(
                    TextCommand::new(
                        "ruler",
                        Point::new(sx, area.y - self.px(4.0)),
                        format_number(*x),
                        font,
                        fill.clone(),
                    )
                    .anchor(TextAnchor::Middle),
                ));
            }
            for y in ys.iter().filter(|y| **y > 0.0) {
                let sy = self.transform.point_to_screen(Point::new(0.0, *y)).y;
                scene.world.push(DrawCommand::Text(
                    TextCommand::new(
                        "ruler",
                        Point::new(area.x - self.px(4.0), sy + self.px(3.0)),
                        format_number(*y),
                        font,
                        fill.clone(),
                    )
                    .anchor(TextAnchor::End),
                ));
            }
        }
    }

    fn surface(&self, scene: &mut Scene) {
        let surface = &self.input.layout.surface;
        let area = self.surface_box();
        scene.world.push(DrawCommand::Rect(
            RectCommand::new("surface", area)
                .id("surface")
                .stroke(self.color("surface-stroke"), self.px(2.0)),
        ));

        let title = match (surface.name.is_empty(), surface.code.is_empty()) {
            (false, false) => format!("{} ({})", surface.name, surface.code),
            (false, true) => surface.name.clone(),
            (true, false) => surface.code.clone(),
            (true, true) => "Surface".to_string(),
        };
        let lift = if self.input.display.show_rulers { 18.0 } else { 6.0 };
        scene.world.push(DrawCommand::Text(
            TextCommand::new(
                "surface-label",
                Point::new(area.x, area.y - self.px(lift)),
                format!(
                    "{} · {} × {} mm",
                    title,
                    format_number(surface.length_mm),
                    format_number(surface.width_mm)
                ),
                self.px(13.0),
                self.color("text-1"),
            )
            .bold(),
        ));
    }

    fn safety_margin(&self, scene: &mut Scene) {
        let display = self.input.display;
        if !display.show_safety_margin || !(display.safety_margin_mm > 0.0) {
            return;
        }
        let inset = self.transform.length_to_screen(display.safety_margin_mm);
        scene.world.push(DrawCommand::Rect(
            RectCommand::new("safety-margin", self.surface_box().inset(inset))
                .stroke(self.color("safety-margin"), self.px(1.0))
                .dash("8 4"),
        ));
    }

    fn placements(&self, scene: &mut Scene) {
        let layout = self.input.layout;
        let selection = self.input.selection;
        let text_fill = self.color("text-dark");

        for placement in &layout.positioned {
            if let Some(layer) = self.input.display.layer_filter {
                if placement.layer != layer {
                    continue;
                }
            }
            let state = placement.classify(&layout.surface);
            let colors = self.input.stylesheet.state_colors(state);
            let bounds = drawn_bounds(self.transform.to_screen(&placement.bounds()));
            let hovered = selection.hovered_id == Some(placement.item_id);

            let (stroke, stroke_width) = if hovered {
                (self.color("hover"), self.px(3.0))
            } else {
                (colors.stroke, self.px(1.5))
            };
            let mut rect = RectCommand::new("placement", bounds)
                .id(format!("item-{}", placement.item_id))
                .fill(colors.fill)
                .stroke(stroke, stroke_width)
                .opacity(0.85);
            if placement.layer == 2 {
                rect = rect.dash("6 3");
            }
            scene.world.push(DrawCommand::Rect(rect));

            let label = LabelPlan::for_rect(
                placement,
                bounds.width * self.zoom,
                bounds.height * self.zoom,
            );
            self.label_text(scene, &bounds, &label, &text_fill);

            scene.shapes.push(PlacedShape {
                item_id: placement.item_id,
                state,
                bounds,
                label,
            });
        }
    }

    fn label_text(&self, scene: &mut Scene, bounds: &BoundingBox, label: &LabelPlan, fill: &str) {
        if !label.is_visible() {
            return;
        }
        let font = self.px(label.font_size);
        let line_height = font * 1.25;
        let center = bounds.center();
        let first = center.y - (label.lines.len() as f64 - 1.0) * line_height / 2.0 + font * 0.35;

        for (i, line) in label.lines.iter().enumerate() {
            let mut text = TextCommand::new(
                "placement-label",
                Point::new(center.x, first + i as f64 * line_height),
                line.text.clone(),
                font,
                fill,
            )
            .anchor(TextAnchor::Middle);
            if i == 0 {
                text = text.bold();
            }
            scene.world.push(DrawCommand::Text(text));
        }
    }

    fn selection_outline(&self, scene: &mut Scene) {
        let Some(selected) = self.input.selection.selected_id else {
            return;
        };
        let Some(bounds) = scene.shape(selected).map(|s| s.bounds) else {
            return;
        };
        scene.world.push(DrawCommand::Rect(
            RectCommand::new("selection", bounds.inset(-self.px(3.0)))
                .id("selection")
                .stroke(self.color("selection"), self.px(3.0)),
        ));
    }

    fn panel(
        &self,
        scene: &mut Scene,
        class: &'static str,
        origin: Point,
        lines: &[String],
        accent: Option<String>,
    ) {
        let width = panel_width(lines);
        let height = lines.len() as f64 * OVERLAY_LINE + OVERLAY_PADDING;
        let border = accent.clone().unwrap_or_else(|| self.color("panel-border"));
        scene.overlay.push(DrawCommand::Rect(
            RectCommand::new(class, BoundingBox::new(origin.x, origin.y, width, height))
                .fill(self.color("background-1"))
                .stroke(border, 1.0)
                .opacity(0.95)
                .rounded(4.0),
        ));
        let text_fill = accent.unwrap_or_else(|| self.color("text-1"));
        for (i, line) in lines.iter().enumerate() {
            scene.overlay.push(DrawCommand::Text(TextCommand::new(
                "overlay-text",
                Point::new(
                    origin.x + OVERLAY_PADDING,
                    origin.y + OVERLAY_LINE * (i as f64 + 1.0) - 2.0,
                ),
                line.clone(),
                OVERLAY_FONT,
                text_fill.clone(),
            )));
        }
    }

    fn legend(&self, scene: &mut Scene) {
        if !self.input.display.show_legend {
            return;
        }
        let counts = self.input.layout.state_counts();
        let rows = VisualState::ALL.len() as f64;
        let height = rows * OVERLAY_LINE + OVERLAY_PADDING;
        let origin = Point::new(OVERLAY_INSET, scene.height - OVERLAY_INSET - height);
        let lines: Vec<String> = VisualState::ALL
            .iter()
            .map(|state| format!("    {} ({})", state.label(), counts.get(*state)))
            .collect();
        self.panel(scene, "legend", origin, &lines, None);

        for (i, state) in VisualState::ALL.iter().enumerate() {
            let colors = self.input.stylesheet.state_colors(*state);
            let swatch = BoundingBox::new(
                origin.x + OVERLAY_PADDING,
                origin.y + OVERLAY_LINE * i as f64 + 5.0,
                12.0,
                12.0,
            );
            scene.overlay.push(DrawCommand::Rect(
                RectCommand::new("legend-swatch", swatch)
                    .fill(colors.fill)
                    .stroke(colors.stroke, 1.0),
            ));
        }
    }

    fn stats(&self, scene: &mut Scene) {
        if !self.input.display.show_stats {
            return;
        }
        let layout = self.input.layout;
        let mut lines = vec![
            format!("Efficiency: {:.1}%", layout.stats.efficiency()),
            format!(
                "Valves: {} / {}",
                layout.stats.used_valves, layout.stats.total_valves
            ),
            format!(
                "Tools placed: {} / {}",
                layout.positioned.len(),
                layout.items.len()
            ),
        ];
        if layout.source == PlacementSource::Fallback {
            lines.push("Preview grid (no optimizer positions)".to_string());
        }
        let origin = Point::new(scene.width - OVERLAY_INSET - panel_width(&lines), OVERLAY_INSET);
        self.panel(scene, "stats", origin, &lines, None);
    }

    fn unplaced_warning(&self, scene: &mut Scene) {
        let layout = self.input.layout;
        let unplaced = layout.unplaced();
        let out_of_bounds = scene
            .shapes
            .iter()
            .filter(|s| s.state == VisualState::OutOfBounds)
            .count();
        if unplaced.is_empty() && out_of_bounds == 0 {
            return;
        }

        let mut lines = Vec::new();
        if !unplaced.is_empty() {
            lines.push(format!("⚠ {} not placed", plural(unplaced.len(), "tool")));
            let mut codes: Vec<String> = unplaced
                .iter()
                .take(UNPLACED_LISTED)
                .map(|p| p.display_code())
                .collect();
            if unplaced.len() > UNPLACED_LISTED {
                codes.push(format!("+{} more", unplaced.len() - UNPLACED_LISTED));
            }
            lines.push(codes.join(", "));
        }
        if out_of_bounds > 0 {
            lines.push(format!("⚠ {} out of bounds", plural(out_of_bounds, "tool")));
        }

        let height = lines.len() as f64 * OVERLAY_LINE + OVERLAY_PADDING;
        let origin = Point::new(
            scene.width - OVERLAY_INSET - panel_width(&lines),
            scene.height - OVERLAY_INSET - height,
        );
        let accent = Some(self.color("status-warning"));
        self.panel(scene, "unplaced-warning", origin, &lines, accent);
    }

    fn tooltip(&self, scene: &mut Scene) {
        if !self.input.display.show_tooltips {
            return;
        }
        let Some(hovered) = self.input.selection.hovered_id else {
            return;
        };
        let Some((shape_bounds, state)) = scene.shape(hovered).map(|s| (s.bounds, s.state)) else {
            return;
        };
        let Some(placement) = self.input.layout.find(hovered) else {
            return;
        };

        let lines = tooltip_lines(placement, state);
        let width = panel_width(&lines);
        let height = lines.len() as f64 * OVERLAY_LINE + OVERLAY_PADDING;
        let target = scene.view.bounds_to_screen(&shape_bounds);

        let mut x = target.right() + 8.0;
        if x + width > scene.width {
            x = target.x - width - 8.0;
        }
        let x = x.clamp(0.0, (scene.width - width).max(0.0));
        let y = target.y.clamp(0.0, (scene.height - height).max(0.0));
        self.panel(scene, "tooltip", Point::new(x, y), &lines, None);
    }
}

/// Offsets `0, step, 2·step, …` up to `extent`, capped at a sane count
fn grid_offsets(extent: f64, step: f64) -> Vec<f64> {
    let count = ((extent / step).floor() as usize).min(MAX_GRID_LINES);
    (0..=count).map(|k| k as f64 * step).filter(|v| *v <= extent).collect()
}

fn panel_width(lines: &[String]) -> f64 {
    let chars = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    chars * OVERLAY_FONT * 0.58 + 2.0 * OVERLAY_PADDING
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Whole numbers without decimals, everything else with one
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Tooltip text for a placement; every number comes from the mm values
pub fn tooltip_lines(placement: &Placement, state: VisualState) -> Vec<String> {
    let mut lines = vec![if placement.identifier_code.trim().is_empty() {
        format!("#{}", placement.item_id)
    } else {
        format!("{} (#{})", placement.identifier_code, placement.item_id)
    }];
    if !placement.secondary_code.is_empty() {
        lines.push(format!("Code: {}", placement.secondary_code));
    }
    lines.push(format!(
        "Size: {} × {} mm",
        format_number(placement.width_mm),
        format_number(placement.height_mm)
    ));
    lines.push(format!(
        "Position: {}, {} mm",
        format_number(placement.x_mm),
        format_number(placement.y_mm)
    ));
    lines.push(format!("Area: {:.1} cm²", placement.area_cm2()));
    lines.push(format!("Layer: {}", placement.layer));
    if placement.weight_kg > 0.0 {
        lines.push(format!("Weight: {} kg", format_number(placement.weight_kg)));
    }
    match state {
        VisualState::Rotated => lines.push("Rotated 90°".to_string()),
        VisualState::OutOfBounds => lines.push("Out of bounds".to_string()),
        VisualState::Excluded => lines.push("Excluded by optimizer".to_string()),
        VisualState::Valid => {}
    }
    lines
}
