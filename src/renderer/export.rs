//! Raster export of rendered SVG

use base64::Engine;

use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Device pixels per SVG unit
    pub scale: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ExportOptions {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Rasterize an SVG document to PNG bytes
#[cfg(feature = "png")]
pub fn export_png(svg: &str, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| ExportError::Svg(e.to_string()))?;
    let scale = if options.scale.is_finite() && options.scale > 0.0 {
        options.scale
    } else {
        1.0
    };
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(ExportError::Allocation { width, height })?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    let png = pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    tracing::info!(width, height, bytes = png.len(), "exported png");
    Ok(png)
}

#[cfg(not(feature = "png"))]
pub fn export_png(_svg: &str, _options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unsupported)
}

/// `data:image/png;base64,…` for embedding or download links
pub fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_prefix() {
        assert_eq!(png_data_uri(b"abc"), "data:image/png;base64,YWJj");
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_export_png_signature() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#4caf50"/></svg>"##;
        let png = export_png(svg, &ExportOptions::default().with_scale(2.0)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_export_rejects_malformed_svg() {
        let result = export_png("<svg", &ExportOptions::default());
        assert!(matches!(result, Err(ExportError::Svg(_))));
    }
}
