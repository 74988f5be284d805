//! Core types for nesting layouts
//!
//! All placement geometry is expressed in millimeters on the surface plane,
//! with the origin at the top-left corner of the surface, X along the surface
//! length and Y along its width.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if this bounding box contains a point (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Shrink the box by `amount` on every side; negative amounts grow it.
    /// The size never goes below zero.
    pub fn inset(&self, amount: f64) -> BoundingBox {
        BoundingBox::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// The autoclave work plane that placements are nested onto.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Surface {
    pub id: i64,
    pub name: String,
    pub code: String,
    /// Extent along X
    pub length_mm: f64,
    /// Extent along Y ("larghezza piano")
    pub width_mm: f64,
}

impl Surface {
    pub fn new(length_mm: f64, width_mm: f64) -> Self {
        Self {
            length_mm,
            width_mm,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        is_positive(self.length_mm) && is_positive(self.width_mm)
    }

    /// Surface extent used for scale computation.
    ///
    /// Unusable dimensions are replaced by `min_mm` so callers never divide by zero.
    pub fn scale_extent(&self, min_mm: f64) -> (f64, f64) {
        let fallback = if is_positive(min_mm) { min_mm } else { 100.0 };
        let length = if is_positive(self.length_mm) {
            self.length_mm
        } else {
            fallback
        };
        let width = if is_positive(self.width_mm) {
            self.width_mm
        } else {
            fallback
        };
        (length, width)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(0.0, 0.0, self.length_mm, self.width_mm)
    }

    pub fn area_cm2(&self) -> f64 {
        if self.is_valid() {
            self.length_mm * self.width_mm / 100.0
        } else {
            0.0
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Visual classification of a placement, derived from geometry and flags.
///
/// Precedence when several apply: `Excluded` > `OutOfBounds` > `Rotated` > `Valid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualState {
    Valid,
    Rotated,
    Excluded,
    OutOfBounds,
}

impl VisualState {
    /// All states in legend order
    pub const ALL: [VisualState; 4] = [
        VisualState::Valid,
        VisualState::Rotated,
        VisualState::OutOfBounds,
        VisualState::Excluded,
    ];

    /// Stylesheet token prefix for this state
    pub fn token(&self) -> &'static str {
        match self {
            VisualState::Valid => "valid",
            VisualState::Rotated => "rotated",
            VisualState::Excluded => "excluded",
            VisualState::OutOfBounds => "out-of-bounds",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisualState::Valid => "Valid",
            VisualState::Rotated => "Rotated",
            VisualState::Excluded => "Excluded",
            VisualState::OutOfBounds => "Out of bounds",
        }
    }
}

/// One tool positioned (or explicitly not positioned) on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub item_id: i64,
    /// Top-left corner
    pub x_mm: f64,
    pub y_mm: f64,
    /// Footprint after rotation
    pub width_mm: f64,
    pub height_mm: f64,
    pub rotated: bool,
    /// Shelf level ("piano"), 1 or 2
    pub layer: u8,
    pub weight_kg: f64,
    pub priority: i32,
    /// Marked unplaceable by the optimizer; the position is meaningless
    pub excluded: bool,
    pub identifier_code: String,
    pub secondary_code: String,
    pub short_description: String,
}

impl Placement {
    pub fn new(item_id: i64, x_mm: f64, y_mm: f64, width_mm: f64, height_mm: f64) -> Self {
        Self {
            item_id,
            x_mm,
            y_mm,
            width_mm,
            height_mm,
            rotated: false,
            layer: 1,
            weight_kg: 0.0,
            priority: 0,
            excluded: false,
            identifier_code: String::new(),
            secondary_code: String::new(),
            short_description: String::new(),
        }
    }

    pub fn with_rotated(mut self, rotated: bool) -> Self {
        self.rotated = rotated;
        self
    }

    pub fn with_excluded(mut self, excluded: bool) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = weight_kg;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_codes(mut self, identifier: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.identifier_code = identifier.into();
        self.secondary_code = secondary.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = description.into();
        self
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x_mm, self.y_mm, self.width_mm, self.height_mm)
    }

    /// Footprint area in cm², from the millimeter dimensions
    pub fn area_cm2(&self) -> f64 {
        self.width_mm * self.height_mm / 100.0
    }

    /// Identifier code, or `#<id>` when the code is blank
    pub fn display_code(&self) -> String {
        if self.identifier_code.trim().is_empty() {
            format!("#{}", self.item_id)
        } else {
            self.identifier_code.clone()
        }
    }

    pub fn is_out_of_bounds(&self, surface: &Surface) -> bool {
        self.x_mm + self.width_mm > surface.length_mm
            || self.y_mm + self.height_mm > surface.width_mm
    }

    pub fn classify(&self, surface: &Surface) -> VisualState {
        classify(self, surface)
    }
}

/// Derive the visual state of a placement on a surface.
///
/// Exclusion short-circuits the bounds check: an excluded item has no
/// meaningful position.
pub fn classify(placement: &Placement, surface: &Surface) -> VisualState {
    if placement.excluded {
        VisualState::Excluded
    } else if placement.is_out_of_bounds(surface) {
        VisualState::OutOfBounds
    } else if placement.rotated {
        VisualState::Rotated
    } else {
        VisualState::Valid
    }
}

/// Where the positioned set of a layout came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementSource {
    /// Explicit coordinates returned by the optimizer
    #[default]
    Optimizer,
    /// Grid computed locally because the optimizer returned no coordinates
    Fallback,
}

/// Summary metrics reported alongside a layout
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutStats {
    pub used_area_cm2: f64,
    pub total_area_cm2: f64,
    pub used_valves: u32,
    pub total_valves: u32,
}

impl LayoutStats {
    /// Used area as a percentage of total area; 0 when the total is unknown
    pub fn efficiency(&self) -> f64 {
        if self.total_area_cm2 > 0.0 && self.used_area_cm2.is_finite() {
            self.used_area_cm2 / self.total_area_cm2 * 100.0
        } else {
            0.0
        }
    }
}

/// Number of drawn placements per visual state, plus unplaced items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateCounts {
    pub valid: usize,
    pub rotated: usize,
    pub out_of_bounds: usize,
    pub excluded: usize,
}

impl StateCounts {
    pub fn get(&self, state: VisualState) -> usize {
        match state {
            VisualState::Valid => self.valid,
            VisualState::Rotated => self.rotated,
            VisualState::OutOfBounds => self.out_of_bounds,
            VisualState::Excluded => self.excluded,
        }
    }

    fn bump(&mut self, state: VisualState) {
        match state {
            VisualState::Valid => self.valid += 1,
            VisualState::Rotated => self.rotated += 1,
            VisualState::OutOfBounds => self.out_of_bounds += 1,
            VisualState::Excluded => self.excluded += 1,
        }
    }
}

/// One complete nesting: a surface, every item, and the positioned subset.
///
/// Invariant: every positioned placement has a matching entry (same `item_id`)
/// in `items`. Items without a positioned counterpart are the unplaced set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestingLayout {
    pub surface: Surface,
    pub items: Vec<Placement>,
    pub positioned: Vec<Placement>,
    pub stats: LayoutStats,
    pub source: PlacementSource,
}

impl NestingLayout {
    /// Build a layout, appending any positioned placement missing from `items`.
    ///
    /// Excluded placements are moved out of the positioned set.
    pub fn new(
        surface: Surface,
        mut items: Vec<Placement>,
        positioned: Vec<Placement>,
        stats: LayoutStats,
    ) -> Self {
        let (positioned, excluded): (Vec<_>, Vec<_>) =
            positioned.into_iter().partition(|p| !p.excluded);

        let mut known: HashSet<i64> = items.iter().map(|p| p.item_id).collect();
        for placement in positioned.iter().chain(excluded.iter()) {
            if known.insert(placement.item_id) {
                items.push(placement.clone());
            }
        }

        Self {
            surface,
            items,
            positioned,
            stats,
            source: PlacementSource::Optimizer,
        }
    }

    pub fn with_source(mut self, source: PlacementSource) -> Self {
        self.source = source;
        self
    }

    pub fn positioned_ids(&self) -> HashSet<i64> {
        self.positioned.iter().map(|p| p.item_id).collect()
    }

    /// Items the optimizer could not place, in item order
    pub fn unplaced(&self) -> Vec<&Placement> {
        let positioned = self.positioned_ids();
        self.items
            .iter()
            .filter(|p| !positioned.contains(&p.item_id))
            .collect()
    }

    /// Look up a placement by id, preferring its positioned form
    pub fn find(&self, item_id: i64) -> Option<&Placement> {
        self.positioned
            .iter()
            .find(|p| p.item_id == item_id)
            .or_else(|| self.items.iter().find(|p| p.item_id == item_id))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.positioned.is_empty()
    }

    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for placement in &self.positioned {
            counts.bump(placement.classify(&self.surface));
        }
        counts.excluded += self.unplaced().len();
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface::new(1000.0, 800.0)
    }

    #[test]
    fn test_classify_scenario() {
        let surface = surface();
        let placements = [
            Placement::new(1, 0.0, 0.0, 100.0, 100.0),
            Placement::new(2, 900.0, 700.0, 150.0, 150.0),
            Placement::new(3, 200.0, 200.0, 50.0, 50.0).with_excluded(true),
        ];
        let states: Vec<_> = placements.iter().map(|p| classify(p, &surface)).collect();
        assert_eq!(
            states,
            vec![
                VisualState::Valid,
                VisualState::OutOfBounds,
                VisualState::Excluded
            ]
        );
    }

    #[test]
    fn test_excluded_wins_over_out_of_bounds() {
        let p = Placement::new(1, 990.0, 0.0, 100.0, 10.0)
            .with_excluded(true)
            .with_rotated(true);
        assert_eq!(p.classify(&surface()), VisualState::Excluded);
    }

    #[test]
    fn test_out_of_bounds_wins_over_rotated() {
        let p = Placement::new(1, 0.0, 750.0, 100.0, 100.0).with_rotated(true);
        assert_eq!(p.classify(&surface()), VisualState::OutOfBounds);
    }

    #[test]
    fn test_flush_with_edge_is_in_bounds() {
        let p = Placement::new(1, 900.0, 700.0, 100.0, 100.0).with_rotated(true);
        assert_eq!(p.classify(&surface()), VisualState::Rotated);
    }

    #[test]
    fn test_scale_extent_substitutes_minimum() {
        let broken = Surface::new(0.0, -5.0);
        assert!(!broken.is_valid());
        assert_eq!(broken.scale_extent(100.0), (100.0, 100.0));
        assert_eq!(surface().scale_extent(100.0), (1000.0, 800.0));
    }

    #[test]
    fn test_layout_keeps_positioned_subset_of_items() {
        let items = vec![Placement::new(1, 0.0, 0.0, 50.0, 50.0)];
        let positioned = vec![
            Placement::new(1, 0.0, 0.0, 50.0, 50.0),
            Placement::new(2, 100.0, 0.0, 50.0, 50.0),
        ];
        let layout = NestingLayout::new(surface(), items, positioned, LayoutStats::default());
        assert_eq!(layout.items.len(), 2);
        assert!(layout.unplaced().is_empty());
    }

    #[test]
    fn test_excluded_placement_is_unplaced() {
        let positioned = vec![
            Placement::new(1, 0.0, 0.0, 50.0, 50.0),
            Placement::new(2, 0.0, 0.0, 50.0, 50.0).with_excluded(true),
        ];
        let layout = NestingLayout::new(surface(), vec![], positioned, LayoutStats::default());
        assert_eq!(layout.positioned.len(), 1);
        let unplaced: Vec<_> = layout.unplaced().iter().map(|p| p.item_id).collect();
        assert_eq!(unplaced, vec![2]);
        assert_eq!(layout.state_counts().excluded, 1);
    }

    #[test]
    fn test_efficiency() {
        let stats = LayoutStats {
            used_area_cm2: 250.0,
            total_area_cm2: 1000.0,
            used_valves: 2,
            total_valves: 4,
        };
        assert_eq!(stats.efficiency(), 25.0);
        assert_eq!(LayoutStats::default().efficiency(), 0.0);
    }

    #[test]
    fn test_display_code_falls_back_to_id() {
        let p = Placement::new(42, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(p.display_code(), "#42");
        assert_eq!(p.with_codes("T-1", "").display_code(), "T-1");
    }
}
