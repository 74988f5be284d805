//! SVG serialization of a composed scene

use crate::renderer::scene::{DrawCommand, LineCommand, RectCommand, Scene, TextCommand};

use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            elements: vec![],
            indent: 1,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn dash_attr(dash: &Option<String>) -> String {
        dash.as_ref()
            .map(|d| format!(r#" stroke-dasharray="{}""#, d))
            .unwrap_or_default()
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, rect: &RectCommand) {
        let prefix = self.prefix();
        let id_attr = rect
            .id
            .as_ref()
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        let radius = if rect.corner_radius > 0.0 {
            format!(r#" rx="{}""#, num(rect.corner_radius))
        } else {
            String::new()
        };
        let stroke = if rect.stroke == "none" || rect.stroke_width <= 0.0 {
            String::new()
        } else {
            format!(
                r#" stroke="{}" stroke-width="{}"{}"#,
                escape_xml(&rect.stroke),
                num(rect.stroke_width),
                Self::dash_attr(&rect.dash)
            )
        };
        let opacity = if rect.opacity < 1.0 {
            format!(r#" opacity="{}""#, num(rect.opacity))
        } else {
            String::new()
        };

        self.elements.push(format!(
            r#"{}<rect{} class="{}{}" x="{}" y="{}" width="{}" height="{}"{} fill="{}"{}{}/>"#,
            self.indent_str(),
            id_attr,
            prefix,
            rect.class,
            num(rect.bounds.x),
            num(rect.bounds.y),
            num(rect.bounds.width),
            num(rect.bounds.height),
            radius,
            escape_xml(&rect.fill),
            stroke,
            opacity
        ));
    }

    /// Add a line element
    pub fn add_line(&mut self, line: &LineCommand) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<line class="{}{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"{}/>"#,
            self.indent_str(),
            prefix,
            line.class,
            num(line.from.x),
            num(line.from.y),
            num(line.to.x),
            num(line.to.y),
            escape_xml(&line.stroke),
            num(line.stroke_width),
            Self::dash_attr(&line.dash)
        ));
    }

    /// Add a text element
    pub fn add_text(&mut self, text: &TextCommand) {
        let prefix = self.prefix();
        let weight = if text.bold {
            r#" font-weight="bold""#
        } else {
            ""
        };
        self.elements.push(format!(
            r#"{}<text class="{}{}" x="{}" y="{}" text-anchor="{}" font-size="{}" fill="{}"{}>{}</text>"#,
            self.indent_str(),
            prefix,
            text.class,
            num(text.position.x),
            num(text.position.y),
            text.anchor.as_svg(),
            num(text.font_size),
            escape_xml(&text.fill),
            weight,
            escape_xml(&text.content)
        ));
    }

    pub fn add_command(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Rect(rect) => self.add_rect(rect),
            DrawCommand::Line(line) => self.add_line(line),
            DrawCommand::Text(text) => self.add_text(text),
        }
    }

    /// Add a group element with an optional transform
    pub fn start_group(&mut self, class: &str, transform: Option<String>) {
        let prefix = self.prefix();
        let transform_attr = transform
            .map(|t| format!(r#" transform="{}""#, t))
            .unwrap_or_default();

        self.elements.push(format!(
            r#"{}<g class="{}{}"{}>"#,
            self.indent_str(),
            prefix,
            class,
            transform_attr
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    pub fn build(self, width: f64, height: f64, background: &str) -> String {
        let nl = self.newline();
        let mut svg = String::new();

        // XML declaration for standalone
        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
            w = num(width),
            h = num(height),
            font = escape_xml(&self.config.font_family)
        ));
        svg.push_str(nl);

        let indent = if self.config.pretty_print { "  " } else { "" };
        svg.push_str(&format!(
            r#"{}<rect class="{}background" width="{}" height="{}" fill="{}"/>"#,
            indent,
            self.prefix(),
            num(width),
            num(height),
            escape_xml(background)
        ));
        svg.push_str(nl);

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render a scene to an SVG string.
///
/// The world layer is wrapped in a single pan/zoom transform; overlays are
/// drawn after it in screen coordinates.
pub fn render_svg(scene: &Scene, config: &SvgConfig) -> String {
    let mut builder = SvgBuilder::new(config.clone());

    if !scene.world.is_empty() {
        let view = scene.view;
        builder.start_group(
            "world",
            Some(format!(
                "translate({} {}) scale({})",
                num(view.pan_x),
                num(view.pan_y),
                num(view.zoom)
            )),
        );
        for command in &scene.world {
            builder.add_command(command);
        }
        builder.end_group();
    }

    if !scene.overlay.is_empty() {
        builder.start_group("overlay", None);
        for command in &scene.overlay {
            builder.add_command(command);
        }
        builder.end_group();
    }

    builder.build(scene.width, scene.height, &scene.background)
}

/// Round to three decimals and drop the trailing zeros
fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

/// Escape special XML characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BoundingBox, Point};
    use crate::renderer::scene::{SceneStatus, ViewTransform};
    use crate::stylesheet::Stylesheet;

    fn scene() -> Scene {
        let mut scene = Scene::status_panel(SceneStatus::Loading, 400.0, 300.0, &Stylesheet::default());
        scene.status = SceneStatus::Ready;
        scene.overlay.clear();
        scene.view = ViewTransform {
            zoom: 2.0,
            pan_x: 10.0,
            pan_y: -5.5,
        };
        scene.world.push(DrawCommand::Rect(
            RectCommand::new("placement", BoundingBox::new(1.0, 2.0, 30.0, 40.0))
                .id("item-7")
                .fill("#4caf50")
                .stroke("#2e7d32", 1.5)
                .dash("6 3")
                .opacity(0.85),
        ));
        scene.overlay.push(DrawCommand::Text(TextCommand::new(
            "overlay-text",
            Point::new(5.0, 15.0),
            "A & <B>",
            12.0,
            "#333333",
        )));
        scene
    }

    #[test]
    fn test_num() {
        assert_eq!(num(50.0), "50");
        assert_eq!(num(0.1 + 0.2), "0.3");
        assert_eq!(num(-0.0), "0");
        assert_eq!(num(1.23456), "1.235");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_world_group_carries_view_transform() {
        let svg = render_svg(&scene(), &SvgConfig::default());
        assert!(svg.contains(r#"<g class="nv-world" transform="translate(10 -5.5) scale(2)">"#));
        assert!(svg.contains(r#"id="item-7""#));
        assert!(svg.contains(r#"stroke-dasharray="6 3""#));
        assert!(svg.contains(r#"opacity="0.85""#));
    }

    #[test]
    fn test_overlay_after_world() {
        let svg = render_svg(&scene(), &SvgConfig::default());
        let world = svg.find("nv-world").unwrap();
        let overlay = svg.find("nv-overlay").unwrap();
        assert!(world < overlay);
        assert!(svg.contains("A &amp; &lt;B&gt;"));
    }

    #[test]
    fn test_compact_output_without_prefix() {
        let config = SvgConfig::default()
            .with_standalone(false)
            .with_pretty_print(false)
            .without_class_prefix();
        let svg = render_svg(&scene(), &config);
        assert!(!svg.contains('\n'));
        assert!(!svg.starts_with("<?xml"));
        assert!(svg.contains(r#"class="placement""#));
    }

    #[test]
    fn test_colors_are_escaped() {
        let mut scene = scene();
        scene.background = r##"#fff" onload="x"##.to_string();
        scene.world.push(DrawCommand::Rect(
            RectCommand::new("placement", BoundingBox::new(0.0, 0.0, 5.0, 5.0))
                .fill(r#"red" x="1"#)
                .stroke("a<b", 1.0),
        ));
        let svg = render_svg(&scene, &SvgConfig::default());
        assert!(svg.contains(r##"fill="#fff&quot; onload=&quot;x""##));
        assert!(svg.contains(r#"fill="red&quot; x=&quot;1""#));
        assert!(svg.contains(r#"stroke="a&lt;b""#));
        assert!(!svg.contains(r#"onload="x""#));
    }

    #[test]
    fn test_root_dimensions() {
        let svg = render_svg(&scene(), &SvgConfig::default());
        assert!(svg.contains(r#"width="400" height="300" viewBox="0 0 400 300""#));
        assert!(svg.ends_with("</svg>"));
    }
}
