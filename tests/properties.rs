//! Property-based invariant tests
//!
//! Verifies:
//! 1. classify precedence: Excluded > OutOfBounds > Rotated > Valid
//! 2. font size is monotonic in rectangle area and stays in [6, 16]
//! 3. text is visible iff w ≥ 40, h ≥ 20 and font ≥ 8
//! 4. fallback packer places every item deterministically inside the available area
//! 5. zooming about a point keeps that point fixed
//! 6. zoom never leaves the configured range

use nesting_view::layout::{pack, GridPlan, PackerConfig, Placement, Point, Surface, VisualState};
use nesting_view::renderer::{dynamic_font_size, is_text_visible};
use nesting_view::{classify, Viewport, ViewportConfig};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_placement() -> impl Strategy<Value = Placement> {
    (
        0.0f64..2000.0,
        0.0f64..2000.0,
        20.0f64..800.0,
        15.0f64..800.0,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(x, y, w, h, rotated, excluded)| {
            Placement::new(1, x, y, w, h)
                .with_rotated(rotated)
                .with_excluded(excluded)
        })
}

fn arb_config() -> impl Strategy<Value = ViewportConfig> {
    prop_oneof![Just(ViewportConfig::default()), Just(ViewportConfig::bounded())]
}

fn items(count: usize) -> Vec<Placement> {
    (0..count)
        .map(|i| Placement::new(i as i64 + 1, 0.0, 0.0, 50.0, 50.0))
        .collect()
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn classify_follows_precedence(placement in arb_placement()) {
        let surface = Surface::new(1000.0, 800.0);
        let out = placement.x_mm + placement.width_mm > 1000.0
            || placement.y_mm + placement.height_mm > 800.0;
        let expected = if placement.excluded {
            VisualState::Excluded
        } else if out {
            VisualState::OutOfBounds
        } else if placement.rotated {
            VisualState::Rotated
        } else {
            VisualState::Valid
        };
        prop_assert_eq!(classify(&placement, &surface), expected);
    }

    #[test]
    fn font_size_is_monotonic_and_bounded(
        w1 in 0.0f64..500.0,
        h1 in 0.0f64..500.0,
        w2 in 0.0f64..500.0,
        h2 in 0.0f64..500.0,
    ) {
        let (a, b) = (dynamic_font_size(w1, h1), dynamic_font_size(w2, h2));
        prop_assert!((6.0..=16.0).contains(&a));
        prop_assert!((6.0..=16.0).contains(&b));
        if w1 * h1 <= w2 * h2 {
            prop_assert!(a <= b + EPS);
        } else {
            prop_assert!(b <= a + EPS);
        }
    }

    #[test]
    fn text_visibility_gate(w in 0.0f64..200.0, h in 0.0f64..200.0, f in 0.0f64..20.0) {
        prop_assert_eq!(is_text_visible(w, h, f), w >= 40.0 && h >= 20.0 && f >= 8.0);
    }

    #[test]
    fn fallback_packer_is_total_and_deterministic(
        count in 1usize..60,
        width in 2000.0f64..6000.0,
        height in 2000.0f64..6000.0,
    ) {
        let config = PackerConfig::default();
        let input = items(count);

        let first = GridPlan::compute(count, width, height, &config);
        let second = GridPlan::compute(count, width, height, &config);
        prop_assert_eq!(&first.cells, &second.cells);

        let placed = pack(&input, width, height, &config);
        prop_assert_eq!(placed.len(), count);
        for (placement, item) in placed.iter().zip(&input) {
            prop_assert_eq!(placement.item_id, item.item_id);
            prop_assert_eq!(placement.layer, 1);
            prop_assert!(placement.x_mm + placement.width_mm <= config.content_padding + width + EPS);
            prop_assert!(placement.y_mm + placement.height_mm <= config.content_padding + height + EPS);
        }
    }

    #[test]
    fn zoom_about_point_keeps_point_fixed(
        config in arb_config(),
        delta in -3.0f64..3.0,
        cx in -500.0f64..1500.0,
        cy in -500.0f64..1500.0,
        pan_x in -300.0f64..300.0,
        pan_y in -300.0f64..300.0,
    ) {
        let mut viewport = Viewport::new(config);
        viewport.set_view(1.0, Point::new(pan_x, pan_y));
        let cursor = Point::new(cx, cy);
        let before = viewport.screen_to_content(cursor);
        viewport.zoom_by(delta, Some(cursor));
        let after = viewport.screen_to_content(cursor);
        prop_assert!((before.x - after.x).abs() < EPS);
        prop_assert!((before.y - after.y).abs() < EPS);
    }

    #[test]
    fn zoom_stays_in_range(
        config in arb_config(),
        deltas in prop::collection::vec(-2.0f64..2.0, 1..40),
    ) {
        let mut viewport = Viewport::new(config);
        for delta in deltas {
            viewport.zoom_by(delta, Some(Point::new(100.0, 100.0)));
            prop_assert!(viewport.zoom() >= config.zoom_min);
            prop_assert!(viewport.zoom() <= config.zoom_max);
        }
    }
}
