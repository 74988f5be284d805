//! Label density and font sizing from on-screen rectangle size.
//!
//! Font size is a logarithmic interpolation of the rectangle area between
//! 100 (6 px) and 10 000 (16 px) square screen units. Text is drawn only
//! when the rectangle is at least 40×20 and the font at least 8 px; the
//! secondary code appears from 10 px, the description from 12 px on
//! rectangles taller than 80. A rectangle too small for text is drawn as a
//! plain colored block.

use crate::layout::types::Placement;

pub const MIN_FONT_SIZE: f64 = 6.0;
pub const MAX_FONT_SIZE: f64 = 16.0;
const MIN_AREA: f64 = 100.0;
const MAX_AREA: f64 = 10_000.0;

pub const MIN_TEXT_WIDTH: f64 = 40.0;
pub const MIN_TEXT_HEIGHT: f64 = 20.0;
pub const MIN_READABLE_FONT: f64 = 8.0;
const SECONDARY_FONT: f64 = 10.0;
const DESCRIPTION_FONT: f64 = 12.0;
const DESCRIPTION_MIN_HEIGHT: f64 = 80.0;
/// Screen width budgeted per description character
const CHAR_WIDTH: f64 = 6.0;

/// Font size for a rectangle of the given screen size, in [6, 16]
pub fn dynamic_font_size(width: f64, height: f64) -> f64 {
    let area = width * height;
    let area = if area.is_finite() { area } else { MIN_AREA };
    let t = (area.clamp(MIN_AREA, MAX_AREA).log10() - MIN_AREA.log10())
        / (MAX_AREA.log10() - MIN_AREA.log10());
    (MIN_FONT_SIZE + (MAX_FONT_SIZE - MIN_FONT_SIZE) * t).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

pub fn is_text_visible(width: f64, height: f64, font_size: f64) -> bool {
    width >= MIN_TEXT_WIDTH && height >= MIN_TEXT_HEIGHT && font_size >= MIN_READABLE_FONT
}

/// Cut `text` to at most `max_chars` characters, ending in `…` when shortened
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelLineKind {
    Identifier,
    Secondary,
    Description,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLine {
    pub kind: LabelLineKind,
    pub text: String,
}

/// What text a rectangle carries and at which size
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlan {
    pub font_size: f64,
    /// Empty when the rectangle is too small for text
    pub lines: Vec<LabelLine>,
}

impl LabelPlan {
    /// Plan the label of `placement` drawn as a `width × height` screen rectangle
    pub fn for_rect(placement: &Placement, width: f64, height: f64) -> Self {
        let font_size = dynamic_font_size(width, height);
        let mut lines = Vec::new();

        if is_text_visible(width, height, font_size) {
            lines.push(LabelLine {
                kind: LabelLineKind::Identifier,
                text: placement.display_code(),
            });

            if font_size >= SECONDARY_FONT && !placement.secondary_code.is_empty() {
                lines.push(LabelLine {
                    kind: LabelLineKind::Secondary,
                    text: placement.secondary_code.clone(),
                });
            }

            if font_size >= DESCRIPTION_FONT
                && height > DESCRIPTION_MIN_HEIGHT
                && !placement.short_description.is_empty()
            {
                let max_chars = (width / CHAR_WIDTH).floor() as usize;
                let text = truncate(&placement.short_description, max_chars);
                if !text.is_empty() {
                    lines.push(LabelLine {
                        kind: LabelLineKind::Description,
                        text,
                    });
                }
            }
        }

        Self { font_size, lines }
    }

    pub fn is_visible(&self) -> bool {
        !self.lines.is_empty()
    }
}
