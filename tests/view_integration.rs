//! End-to-end tests: wire payload → layout → scene → SVG, and the view session

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use serde_json::json;

use nesting_view::layout::{GridPlan, LayoutPayload, PackerConfig};
use nesting_view::renderer::{tooltip_lines, DrawCommand, SceneStatus};
use nesting_view::{
    classify, CanvasConfig, JsonFileSource, LayoutRequest, LayoutResponse, LoadError,
    NestingLayout, NestingView, Placement, PlacementSource, PointerEvent, Resolution, Surface,
    ViewerConfig, VisualState,
};

fn response(surface_length: f64, placements: serde_json::Value) -> LayoutResponse {
    serde_json::from_value(json!({
        "success": true,
        "layoutData": {
            "autoclave": { "nome": "Autoclave A", "lunghezza": surface_length, "larghezza_piano": 800 },
            "tools": [
                { "tool_id": 1, "part_number": "T-1", "descrizione": "Spar" },
                { "tool_id": 2, "part_number": "T-2" },
                { "tool_id": 3, "part_number": "T-3" }
            ],
            "positions": placements,
            "totalValves": "12",
            "usedValves": 5
        }
    }))
    .unwrap()
}

fn scenario_placements() -> serde_json::Value {
    json!([
        { "tool_id": 1, "x": 0, "y": 0, "width": 100, "height": 100 },
        { "tool_id": 2, "x": 900, "y": 700, "width": 150, "height": 150, "piano": 2 },
        { "tool_id": 3, "x": 200, "y": 200, "width": 50, "height": 50, "excluded": "true" }
    ])
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("nesting-view-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_classification_scenario() {
    let surface = Surface::new(1000.0, 800.0);
    let placements = [
        Placement::new(1, 0.0, 0.0, 100.0, 100.0),
        Placement::new(2, 900.0, 700.0, 150.0, 150.0),
        Placement::new(3, 200.0, 200.0, 50.0, 50.0).with_excluded(true),
    ];
    let states: Vec<_> = placements.iter().map(|p| classify(p, &surface)).collect();
    assert_eq!(
        states,
        vec![VisualState::Valid, VisualState::OutOfBounds, VisualState::Excluded]
    );
}

#[test]
fn test_fallback_grid_scenario() {
    let plan = GridPlan::compute(5, 400.0, 300.0, &PackerConfig::default());
    assert_eq!((plan.cols, plan.rows), (2, 3));
    assert_eq!((plan.cells[3].col, plan.cells[3].row), (1, 1));
}

#[test]
fn test_italian_wire_names_are_normalized() {
    let payload = response(1000.0, scenario_placements()).into_payload().unwrap();
    let layout = NestingLayout::from_payload(&payload, &CanvasConfig::default(), &PackerConfig::default());

    assert_eq!(layout.surface.name, "Autoclave A");
    assert_eq!(layout.surface.length_mm, 1000.0);
    assert_eq!(layout.stats.total_valves, 12);
    let ids: Vec<_> = layout.positioned.iter().map(|p| p.item_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(layout.positioned[1].layer, 2);
    let unplaced: Vec<_> = layout.unplaced().iter().map(|p| p.item_id).collect();
    assert_eq!(unplaced, vec![3]);
}

#[test]
fn test_empty_placements_use_fallback() {
    let payload: LayoutPayload = serde_json::from_value(json!({
        "surface": { "lengthMm": 2000, "widthMm": 1000 },
        "items": [{ "itemId": 1 }, { "itemId": 2 }, { "itemId": 3 }]
    }))
    .unwrap();
    let layout = NestingLayout::from_payload(&payload, &CanvasConfig::default(), &PackerConfig::default());
    assert_eq!(layout.source, PlacementSource::Fallback);
    assert_eq!(layout.positioned.len(), 3);
    assert!(layout.positioned.iter().all(|p| p.layer == 1 && !p.excluded));
    assert!(layout.unplaced().is_empty());
}

#[test]
fn test_stale_response_never_replaces_newer_layout() {
    let mut view = NestingView::default();
    let a = view.request(LayoutRequest::new("A"));
    let b = view.request(LayoutRequest::new("B"));

    assert_eq!(view.resolve(b, Ok(response(2000.0, scenario_placements()))), Resolution::Applied);
    assert_eq!(view.resolve(a, Ok(response(1000.0, scenario_placements()))), Resolution::Stale);

    assert_eq!(view.layout().unwrap().surface.length_mm, 2000.0);
}

#[test]
fn test_fetch_error_shows_retry_panel() {
    let mut view = NestingView::default();
    let failing = |_: &LayoutRequest| -> Result<LayoutResponse, LoadError> {
        Err(LoadError::Transport("503 Service Unavailable".to_string()))
    };
    view.load(&failing, LayoutRequest::new("9"));

    let scene = view.scene();
    assert_eq!(
        scene.status,
        SceneStatus::Error {
            message: "transport error: 503 Service Unavailable".to_string(),
            retryable: true,
        }
    );
    let button = scene.retry_button.unwrap();
    let center = button.center();
    view.handle_pointer(PointerEvent::Down { x: center.x, y: center.y });
    let events = view.handle_pointer(PointerEvent::Up { x: center.x, y: center.y });
    assert_eq!(events, vec![nesting_view::ViewEvent::RetryRequested]);
}

#[test]
fn test_invalid_surface_renders_panel() {
    let mut view = NestingView::default();
    let source = |_: &LayoutRequest| -> Result<LayoutResponse, LoadError> {
        Ok(response(0.0, scenario_placements()))
    };
    view.load(&source, LayoutRequest::new("1"));
    let scene = view.scene();
    assert!(matches!(scene.status, SceneStatus::InvalidLayout { .. }));
    assert!(view.svg().contains("Invalid layout"));
}

#[test]
fn test_hover_draws_tooltip_with_mm_values() {
    let mut view = NestingView::default();
    let source = |_: &LayoutRequest| -> Result<LayoutResponse, LoadError> {
        Ok(response(1000.0, scenario_placements()))
    };
    view.load(&source, LayoutRequest::new("1"));
    view.hover(Some(1));

    let scene = view.scene();
    let tooltip: Vec<_> = scene
        .overlay
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text(t) if t.content.starts_with("Size") => Some(t.content.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(tooltip, vec!["Size: 100 × 100 mm".to_string()]);
}

#[test]
fn test_layer_two_is_dashed() {
    let mut view = NestingView::default();
    let source = |_: &LayoutRequest| -> Result<LayoutResponse, LoadError> {
        Ok(response(1000.0, scenario_placements()))
    };
    view.load(&source, LayoutRequest::new("1"));
    let scene = view.scene();
    let dashes: Vec<_> = scene
        .world
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect(r) if r.class == "placement" => Some(r.dash.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(dashes, vec![None, Some("6 3".to_string())]);
}

#[test]
fn test_tooltip_content() {
    let placement = Placement::new(7, 10.0, 20.0, 120.0, 80.0)
        .with_codes("T-100", "S-1")
        .with_layer(2)
        .with_weight(12.5)
        .with_rotated(true);
    let state = classify(&placement, &Surface::new(1000.0, 800.0));
    insta::assert_snapshot!(tooltip_lines(&placement, state).join("\n"), @r"
    T-100 (#7)
    Code: S-1
    Size: 120 × 80 mm
    Position: 10, 20 mm
    Area: 96.0 cm²
    Layer: 2
    Weight: 12.5 kg
    Rotated 90°
    ");
}

#[test]
fn test_json_file_source_reads_directory() {
    let dir = temp_dir("dir-source");
    let body = serde_json::to_string(&response(1500.0, scenario_placements())).unwrap();
    fs::write(dir.join("42.json"), body).unwrap();

    let mut view = NestingView::default();
    view.load(&JsonFileSource::new(&dir), LayoutRequest::new("42"));
    assert_eq!(view.layout().unwrap().surface.length_mm, 1500.0);

    view.load(&JsonFileSource::new(&dir), LayoutRequest::new("missing"));
    assert!(!view.scene().is_ready());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_config_file_drives_view() {
    let dir = temp_dir("config");
    let path = dir.join("viewer.toml");
    fs::write(
        &path,
        r##"
[canvas]
width = 800
height = 600

[display]
show_legend = false
show_stats = false

[colors]
valid-fill = "#123456"
"##,
    )
    .unwrap();
    let config = ViewerConfig::from_file(&path).unwrap();
    let mut view = NestingView::new(config);
    let source = |_: &LayoutRequest| -> Result<LayoutResponse, LoadError> {
        Ok(response(1000.0, scenario_placements()))
    };
    view.load(&source, LayoutRequest::new("1"));

    let svg = view.svg();
    assert!(svg.contains(r#"width="800" height="600""#));
    assert!(svg.contains("#123456"));
    assert!(!svg.contains("nv-legend"));
    assert!(!svg.contains("Efficiency"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_small_tool_near_edge_stays_in_bounds() {
    let payload: LayoutPayload = serde_json::from_value(json!({
        "surface": { "lengthMm": 1000, "widthMm": 800 },
        "placements": [{ "itemId": 1, "x": 985, "y": 0, "width": 10, "height": 10 }]
    }))
    .unwrap();
    let layout = NestingLayout::from_payload(&payload, &CanvasConfig::default(), &PackerConfig::default());
    let placement = &layout.positioned[0];
    assert_eq!((placement.width_mm, placement.height_mm), (10.0, 10.0));

    let state = classify(placement, &layout.surface);
    assert_eq!(state, VisualState::Valid);
    let lines = tooltip_lines(placement, state);
    assert_eq!(lines[1], "Size: 10 × 10 mm");
    assert_eq!(lines[3], "Area: 1.0 cm²");
}
