//! Deterministic grid placement used when the optimizer returns no coordinates.
//!
//! Items keep their input order: item `i` goes to column `i mod cols`,
//! row `i / cols`. Every item is placed; the fallback never excludes.

use tracing::debug;

use crate::layout::config::PackerConfig;
use crate::layout::types::{BoundingBox, Placement, Surface};

/// Grid coordinates assigned to one input item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub index: usize,
    pub col: usize,
    pub row: usize,
}

/// Grid dimensions and cell assignment for a given item count
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub cols: usize,
    pub rows: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub cells: Vec<GridCell>,
}

impl GridPlan {
    /// Plan a grid for `count` items inside the available area.
    pub fn compute(
        count: usize,
        available_width: f64,
        available_height: f64,
        config: &PackerConfig,
    ) -> Self {
        let cols = ((count as f64).sqrt().floor() as usize).max(config.min_columns.max(1));
        let rows = count.div_ceil(cols);
        let gap = config.cell_gap.max(0.0);

        let cell_width = cell_extent(available_width, cols, gap, config.min_cell_width);
        let cell_height = cell_extent(available_height, rows, gap, config.min_cell_height);

        let cells = (0..count)
            .map(|index| GridCell {
                index,
                col: index % cols,
                row: index / cols,
            })
            .collect();

        Self {
            cols,
            rows,
            cell_width,
            cell_height,
            cells,
        }
    }

    /// Rectangle of a cell, offset by the content padding
    pub fn cell_bounds(&self, cell: &GridCell, config: &PackerConfig) -> BoundingBox {
        let gap = config.cell_gap.max(0.0);
        BoundingBox::new(
            config.content_padding + cell.col as f64 * (self.cell_width + gap),
            config.content_padding + cell.row as f64 * (self.cell_height + gap),
            self.cell_width,
            self.cell_height,
        )
    }
}

fn cell_extent(available: f64, slots: usize, gap: f64, minimum: f64) -> f64 {
    if slots == 0 {
        return minimum;
    }
    let available = if available.is_finite() { available } else { 0.0 };
    let raw = (available - (slots as f64 - 1.0) * gap) / slots as f64;
    raw.max(minimum)
}

/// Place every item on a grid inside `available_width × available_height`.
///
/// Output order matches input order. Each placement takes the size of its
/// cell, lands on layer 1 and is never excluded; identity and display
/// fields are carried over from the input.
pub fn pack(
    items: &[Placement],
    available_width: f64,
    available_height: f64,
    config: &PackerConfig,
) -> Vec<Placement> {
    let plan = GridPlan::compute(items.len(), available_width, available_height, config);
    debug!(
        items = items.len(),
        cols = plan.cols,
        rows = plan.rows,
        cell_width = plan.cell_width,
        cell_height = plan.cell_height,
        "packing items on fallback grid"
    );

    items
        .iter()
        .zip(plan.cells.iter())
        .map(|(item, cell)| {
            let bounds = plan.cell_bounds(cell, config);
            Placement {
                x_mm: bounds.x,
                y_mm: bounds.y,
                width_mm: bounds.width,
                height_mm: bounds.height,
                layer: 1,
                excluded: false,
                ..item.clone()
            }
        })
        .collect()
}

/// Area available to the grid on a surface: the surface minus the content
/// padding on every side.
pub fn available_area(surface: &Surface, min_surface_mm: f64, config: &PackerConfig) -> (f64, f64) {
    let (length, width) = surface.scale_extent(min_surface_mm);
    let padding = config.content_padding.max(0.0);
    (
        (length - 2.0 * padding).max(0.0),
        (width - 2.0 * padding).max(0.0),
    )
}

/// [`pack`] using the area available on `surface`
pub fn pack_on_surface(
    items: &[Placement],
    surface: &Surface,
    min_surface_mm: f64,
    config: &PackerConfig,
) -> Vec<Placement> {
    let (width, height) = available_area(surface, min_surface_mm, config);
    pack(items, width, height, config)
}
