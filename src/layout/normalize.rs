//! Conversion of the untrusted wire payload into typed layout data.
//!
//! The collaborator API is loosely typed: numbers may arrive as strings,
//! booleans as `"true"`/`"false"`, and fields may be missing or null.
//! Everything is coerced here, once; nothing downstream sees a raw value.
//! Normalization never fails. Unusable values are replaced by safe
//! defaults and logged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::layout::config::{CanvasConfig, PackerConfig};
use crate::layout::packer::pack_on_surface;
use crate::layout::types::{LayoutStats, NestingLayout, Placement, PlacementSource, Surface};

/// Smallest width a placement is drawn with; also the stand-in for a
/// missing or non-positive width
pub const MIN_PLACEMENT_WIDTH: f64 = 20.0;

/// Smallest height a placement is drawn with; also the stand-in for a
/// missing or non-positive height
pub const MIN_PLACEMENT_HEIGHT: f64 = 15.0;

/// A placement as received from the collaborator API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlacement {
    #[serde(default, alias = "id", alias = "tool_id", alias = "toolId")]
    pub item_id: Value,
    #[serde(default, alias = "xMm", alias = "x_mm")]
    pub x: Value,
    #[serde(default, alias = "yMm", alias = "y_mm")]
    pub y: Value,
    #[serde(default, alias = "widthMm", alias = "width_mm")]
    pub width: Value,
    #[serde(default, alias = "heightMm", alias = "height_mm")]
    pub height: Value,
    #[serde(default, alias = "rotation")]
    pub rotated: Value,
    #[serde(default, alias = "piano")]
    pub layer: Value,
    #[serde(default, alias = "weight", alias = "peso")]
    pub weight_kg: Value,
    #[serde(default)]
    pub priority: Value,
    #[serde(default)]
    pub excluded: Value,
    #[serde(default, alias = "part_number", alias = "partNumber")]
    pub identifier_code: Value,
    #[serde(default)]
    pub secondary_code: Value,
    #[serde(default, alias = "description", alias = "descrizione")]
    pub short_description: Value,
}

/// The surface as received from the collaborator API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSurface {
    #[serde(default)]
    pub id: Value,
    #[serde(default, alias = "nome")]
    pub name: Value,
    #[serde(default, alias = "codice")]
    pub code: Value,
    #[serde(default, alias = "length", alias = "lunghezza")]
    pub length_mm: Value,
    #[serde(default, alias = "width", alias = "larghezza_piano")]
    pub width_mm: Value,
}

/// The `layoutData` object of a layout response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPayload {
    #[serde(default, alias = "autoclave")]
    pub surface: Option<RawSurface>,
    #[serde(default, alias = "tools")]
    pub items: Option<Vec<RawPlacement>>,
    #[serde(default, alias = "positions")]
    pub placements: Option<Vec<RawPlacement>>,
    #[serde(default)]
    pub used_area_cm2: Value,
    #[serde(default)]
    pub total_area_cm2: Value,
    #[serde(default)]
    pub used_valves: Value,
    #[serde(default)]
    pub total_valves: Value,
}

/// Finite number from a JSON number or numeric string
pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

pub(crate) fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Native boolean or the strings `"true"` / `"false"` (case-insensitive)
pub(crate) fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

pub(crate) fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn number_or_zero(value: &Value, field: &'static str, index: usize) -> f64 {
    coerce_f64(value).unwrap_or_else(|| {
        if !value.is_null() {
            debug!(index, field, raw = %value, "non-numeric value defaulted to 0");
        }
        0.0
    })
}

/// Real sizes pass through untouched; only unusable ones take `fallback`
fn dimension(value: &Value, fallback: f64, field: &'static str, index: usize) -> f64 {
    let raw = number_or_zero(value, field, index);
    if raw > 0.0 {
        return raw;
    }
    trace!(index, field, raw, fallback, "degenerate dimension replaced");
    fallback
}

/// Normalize one wire placement.
///
/// `index` is the position in the source list; it only matters when the
/// item id is missing, in which case the placement gets the synthetic id
/// `-(index + 1)` so ids stay unique without colliding with real ones.
pub fn normalize(raw: &RawPlacement, index: usize) -> Placement {
    let item_id = coerce_i64(&raw.item_id).unwrap_or_else(|| {
        let synthetic = -(index as i64) - 1;
        debug!(index, synthetic, "placement without item id");
        synthetic
    });

    let layer = match coerce_i64(&raw.layer) {
        Some(n) if n >= 2 => 2,
        _ => 1,
    };

    let priority = coerce_i64(&raw.priority)
        .map(|p| p.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        .unwrap_or(0);

    Placement {
        item_id,
        x_mm: number_or_zero(&raw.x, "x", index).max(0.0),
        y_mm: number_or_zero(&raw.y, "y", index).max(0.0),
        width_mm: dimension(&raw.width, MIN_PLACEMENT_WIDTH, "width", index),
        height_mm: dimension(&raw.height, MIN_PLACEMENT_HEIGHT, "height", index),
        rotated: coerce_bool(&raw.rotated),
        layer,
        weight_kg: number_or_zero(&raw.weight_kg, "weight", index).max(0.0),
        priority,
        excluded: coerce_bool(&raw.excluded),
        identifier_code: coerce_string(&raw.identifier_code),
        secondary_code: coerce_string(&raw.secondary_code),
        short_description: coerce_string(&raw.short_description),
    }
}

/// Normalize a list of wire placements, preserving order
pub fn normalize_all(raws: &[RawPlacement]) -> Vec<Placement> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| normalize(raw, index))
        .collect()
}

/// Normalize the surface. Dimensions are kept as received (0 when unusable)
/// so the renderer can flag an invalid layout.
pub fn normalize_surface(raw: &RawSurface) -> Surface {
    Surface {
        id: coerce_i64(&raw.id).unwrap_or(0),
        name: coerce_string(&raw.name),
        code: coerce_string(&raw.code),
        length_mm: coerce_f64(&raw.length_mm).unwrap_or(0.0),
        width_mm: coerce_f64(&raw.width_mm).unwrap_or(0.0),
    }
}

fn count(value: &Value) -> u32 {
    coerce_i64(value)
        .map(|n| n.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

impl NestingLayout {
    /// Build a layout from a wire payload.
    ///
    /// When the payload carries items but no placements, every item is
    /// placed by the fallback grid packer.
    pub fn from_payload(
        payload: &LayoutPayload,
        canvas: &CanvasConfig,
        packer: &PackerConfig,
    ) -> Self {
        let surface = payload
            .surface
            .as_ref()
            .map(normalize_surface)
            .unwrap_or_default();

        let items = normalize_all(payload.items.as_deref().unwrap_or_default());
        let placements = normalize_all(payload.placements.as_deref().unwrap_or_default());

        let total_area = coerce_f64(&payload.total_area_cm2)
            .filter(|a| *a > 0.0)
            .unwrap_or_else(|| surface.area_cm2());
        let stats = LayoutStats {
            used_area_cm2: coerce_f64(&payload.used_area_cm2).unwrap_or(0.0).max(0.0),
            total_area_cm2: total_area,
            used_valves: count(&payload.used_valves),
            total_valves: count(&payload.total_valves),
        };

        if placements.is_empty() && !items.is_empty() {
            debug!(items = items.len(), "no placements returned, using fallback grid");
            let positioned = pack_on_surface(&items, &surface, canvas.min_surface_mm, packer);
            return NestingLayout::new(surface, items, positioned, stats)
                .with_source(PlacementSource::Fallback);
        }

        NestingLayout::new(surface, items, placements, stats)
    }
}
