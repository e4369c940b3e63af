//! Uploaded file handling and image metadata extraction.
//!
//! Only the image header is decoded here, so metadata extraction stays cheap
//! regardless of pixel count. Files that are not decodable images (a PDF
//! marksheet, say) yield metadata without dimensions instead of an error.
//!
//! # DPI estimate
//!
//! Uploaded JPEG/PNG files rarely carry trustworthy density information, so
//! the DPI is *estimated*: the pixel width is divided by an assumed printed
//! width (3.5 cm by default, the passport photo width). This is an
//! approximation, not an EXIF read, and it is only as good as the assumed
//! reference width. See [`reference_width_cm`] for how the engine picks it.

use std::io::Cursor;
use std::path::Path;

use serde::Serialize;

use crate::error::CoreError;
use crate::rules::{DimensionParams, Rule, RuleCategory};

/// Printed width assumed when no physical dimension rule says otherwise.
pub const DEFAULT_REFERENCE_WIDTH_CM: f64 = 3.5;

/// DPI used when no estimate is available.
pub const FALLBACK_DPI: u32 = 96;

pub const CM_PER_INCH: f64 = 2.54;

const INCHES_PER_CM: f64 = 0.393701;

// ---------------------------------------------------------------------------
// Uploaded file
// ---------------------------------------------------------------------------

/// A file-like upload: name, declared media type, and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    /// Declared media type, e.g. `image/jpeg`. Not sniffed from content.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring the media type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                CoreError::Validation(format!("Path has no file name: {}", path.display()))
            })?;
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// ---------------------------------------------------------------------------
// Image metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Pixel width, `None` when the file is not a decodable image.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: u64,
    pub format: String,
    pub estimated_dpi: Option<u32>,
    pub reference_width_cm: f64,
    pub has_alpha: bool,
}

impl ImageMetadata {
    pub fn extract(file: &UploadedFile, reference_width_cm: f64) -> Self {
        let dimensions = match read_dimensions(&file.bytes) {
            Ok(dims) => Some(dims),
            Err(e) => {
                tracing::debug!(file = %file.name, error = %e, "File is not a decodable image");
                None
            }
        };

        Self {
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            file_size: file.size(),
            format: file.media_type.clone(),
            estimated_dpi: dimensions.map(|(w, _)| estimate_dpi(w, reference_width_cm)),
            reference_width_cm,
            has_alpha: file.media_type == "image/png",
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    /// The DPI estimate, or [`FALLBACK_DPI`] when there is none.
    pub fn dpi_or_fallback(&self) -> u32 {
        match self.estimated_dpi {
            Some(dpi) if dpi > 0 => dpi,
            _ => FALLBACK_DPI,
        }
    }

    /// JSON snapshot used for auto-correction before/after records.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "width": self.width,
            "height": self.height,
            "fileSize": self.file_size,
            "format": self.format,
            "estimatedDpi": self.estimated_dpi,
            "hasAlpha": self.has_alpha,
        })
    }
}

/// Decode only the header to get pixel dimensions.
pub fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), CoreError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Estimated DPI for an image printed `reference_width_cm` wide.
pub fn estimate_dpi(pixel_width: u32, reference_width_cm: f64) -> u32 {
    let width_inches = reference_width_cm * INCHES_PER_CM;
    if width_inches <= 0.0 {
        return FALLBACK_DPI;
    }
    (f64::from(pixel_width) / width_inches).round() as u32
}

/// Convert a pixel length to centimetres at `dpi`.
pub fn pixels_to_cm(pixels: u32, dpi: u32) -> f64 {
    f64::from(pixels) * CM_PER_INCH / f64::from(dpi)
}

/// Printed width to assume for the DPI estimate of a document.
///
/// The first physical dimension rule in `rules` supplies the width, so a
/// 4 cm signature is not measured against the 3.5 cm photo width. Without
/// such a rule the `default` applies.
pub fn reference_width_cm(rules: &[Rule], default: f64) -> f64 {
    let declared = rules
        .iter()
        .filter(|rule| rule.category == RuleCategory::Dimension)
        .find_map(|rule| match rule.params::<DimensionParams>() {
            Ok(DimensionParams::Physical(p)) => Some(p.width_cm()),
            _ => None,
        });

    match declared {
        Some(width) => {
            if (width - default).abs() > f64::EPSILON {
                tracing::debug!(
                    reference_width_cm = width,
                    default_width_cm = default,
                    "Using declared document width for DPI estimate",
                );
            }
            width
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::png_bytes;
    use serde_json::json;

    fn dimension_rule(parameters: serde_json::Value) -> Rule {
        serde_json::from_value(json!({
            "id": "dim",
            "category": "dimension",
            "name": "Dimension",
            "description": "",
            "validator": "dimensionValidator",
            "parameters": parameters,
        }))
        .expect("rule")
    }

    #[test]
    fn estimate_matches_passport_photo_at_300_dpi() {
        // 3.5cm at 300 DPI is ~413px.
        assert_eq!(estimate_dpi(413, DEFAULT_REFERENCE_WIDTH_CM), 300);
    }

    #[test]
    fn pixels_to_cm_inverts_estimate() {
        let cm = pixels_to_cm(413, 300);
        assert!((cm - 3.5).abs() < 0.01, "got {cm}");
    }

    #[test]
    fn extract_reads_header_dimensions() {
        let file = UploadedFile::new("photo.png", "image/png", png_bytes(40, 60));
        let meta = ImageMetadata::extract(&file, DEFAULT_REFERENCE_WIDTH_CM);
        assert_eq!(meta.dimensions(), Some((40, 60)));
        assert_eq!(meta.file_size, file.size());
        assert!(meta.has_alpha);
        assert!(meta.estimated_dpi.is_some());
    }

    #[test]
    fn non_image_has_no_dimensions() {
        let file = UploadedFile::new("marks.pdf", "application/pdf", b"%PDF-1.7".to_vec());
        let meta = ImageMetadata::extract(&file, DEFAULT_REFERENCE_WIDTH_CM);
        assert_eq!(meta.dimensions(), None);
        assert_eq!(meta.estimated_dpi, None);
        assert_eq!(meta.dpi_or_fallback(), FALLBACK_DPI);
    }

    #[test]
    fn reference_width_comes_from_physical_rule() {
        let rules = vec![dimension_rule(
            json!({"width": 4, "height": 2, "unit": "cm", "tolerance": 0.1}),
        )];
        assert_eq!(reference_width_cm(&rules, DEFAULT_REFERENCE_WIDTH_CM), 4.0);
    }

    #[test]
    fn reference_width_defaults_for_pixel_rules() {
        let rules = vec![dimension_rule(json!({"minPx": 350, "maxPx": 500}))];
        assert_eq!(
            reference_width_cm(&rules, DEFAULT_REFERENCE_WIDTH_CM),
            DEFAULT_REFERENCE_WIDTH_CM
        );
        assert_eq!(reference_width_cm(&[], 3.0), 3.0);
    }

    #[test]
    fn from_path_guesses_media_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"not really a jpeg").expect("write");
        let file = UploadedFile::from_path(&path).expect("read");
        assert_eq!(file.name, "photo.jpg");
        assert_eq!(file.media_type, "image/jpeg");
        assert_eq!(file.size(), 17);
    }
}
