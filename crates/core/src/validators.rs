//! Per-category rule validators.
//!
//! Each validator is a pure function of the rule's parameters and the
//! inputs it checks (metadata, declared media type, analyzer report) and
//! returns one [`ValidationResult`]. Bad parameters produce a
//! zero-confidence failure rather than an error.

use crate::analysis::{BackgroundReport, FaceReport, ShadowReport};
use crate::metadata::{pixels_to_cm, ImageMetadata};
use crate::report::ValidationResult;
use crate::rules::{
    BackgroundParams, ContentParams, DimensionParams, DpiParams, FileSizeParams, FormatParams,
    PhysicalDimension, PixelRange, QualityParams, Rule,
};

/// (pass, fail) confidence per category.
pub const DIMENSION_CONFIDENCE: (u8, u8) = (98, 85);
pub const DPI_CONFIDENCE: (u8, u8) = (96, 88);
pub const FILE_SIZE_CONFIDENCE: (u8, u8) = (99, 92);
pub const FORMAT_CONFIDENCE: (u8, u8) = (100, 95);
pub const BACKGROUND_CONFIDENCE: (u8, u8) = (94, 87);
pub const QUALITY_CONFIDENCE: (u8, u8) = (91, 84);
pub const CONTENT_CONFIDENCE: (u8, u8) = (97, 72);

const AUTO_CORRECTED_SUFFIX: &str = " → Auto-corrected";

/// Assemble a result; on failure of an auto-correct rule, attach the
/// correction built by `correction`.
fn verdict(
    rule: &Rule,
    passed: bool,
    (pass_confidence, fail_confidence): (u8, u8),
    details: String,
    correction: impl FnOnce() -> String,
) -> ValidationResult {
    let mut result = ValidationResult {
        passed,
        confidence: if passed {
            pass_confidence
        } else {
            fail_confidence
        },
        rule: rule.clone(),
        details,
        correction_applied: false,
        correction_details: None,
    };
    if !passed && rule.auto_correct {
        result.correction_applied = true;
        result.correction_details = Some(correction());
        result.details.push_str(AUTO_CORRECTED_SUFFIX);
    }
    result
}

pub fn unknown_category(rule: &Rule) -> ValidationResult {
    ValidationResult::unevaluated(
        rule,
        format!("Unknown validation category '{}'", rule.category),
    )
}

pub fn image_unavailable(rule: &Rule) -> ValidationResult {
    ValidationResult::unevaluated(rule, "Image could not be decoded for this check")
}

// ---------------------------------------------------------------------------
// Dimension
// ---------------------------------------------------------------------------

pub fn validate_dimension(rule: &Rule, metadata: &ImageMetadata) -> ValidationResult {
    let params = match rule.params::<DimensionParams>() {
        Ok(p) => p,
        Err(e) => return ValidationResult::unevaluated(rule, e.to_string()),
    };
    let Some((width, height)) = metadata.dimensions() else {
        return image_unavailable(rule);
    };

    match params {
        DimensionParams::Physical(p) => physical_dimension(rule, &p, width, height, metadata),
        DimensionParams::Pixels(p) => pixel_dimension(rule, &p, width, height),
    }
}

fn physical_dimension(
    rule: &Rule,
    required: &PhysicalDimension,
    width_px: u32,
    height_px: u32,
    metadata: &ImageMetadata,
) -> ValidationResult {
    let dpi = metadata.dpi_or_fallback();
    let width_cm = pixels_to_cm(width_px, dpi);
    let height_cm = pixels_to_cm(height_px, dpi);
    let (req_w, req_h, tol) = (
        required.width_cm(),
        required.height_cm(),
        required.tolerance_cm(),
    );

    let passed = (width_cm - req_w).abs() <= tol && (height_cm - req_h).abs() <= tol;
    let details = if passed {
        format!("Dimensions correct: {width_cm:.1}cm × {height_cm:.1}cm")
    } else {
        format!(
            "Dimensions incorrect: {width_cm:.1}cm × {height_cm:.1}cm (required: {req_w}cm × {req_h}cm)"
        )
    };

    verdict(rule, passed, DIMENSION_CONFIDENCE, details, || {
        format!("Resized from {width_cm:.1}cm × {height_cm:.1}cm to {req_w}cm × {req_h}cm")
    })
}

fn pixel_dimension(rule: &Rule, range: &PixelRange, width: u32, height: u32) -> ValidationResult {
    let low = range.min_px.saturating_sub(range.tolerance);
    let high = range.max_px.saturating_add(range.tolerance);
    let within = |v: u32| (low..=high).contains(&v);

    let passed = within(width) && within(height);
    let details = if passed {
        format!("Dimensions correct: {width}px × {height}px")
    } else {
        format!(
            "Dimensions incorrect: {width}px × {height}px (required: {}-{}px per side)",
            range.min_px, range.max_px
        )
    };

    verdict(rule, passed, DIMENSION_CONFIDENCE, details, || {
        let target_w = width.clamp(range.min_px, range.max_px);
        let target_h = height.clamp(range.min_px, range.max_px);
        format!("Resized from {width}px × {height}px to {target_w}px × {target_h}px")
    })
}

// ---------------------------------------------------------------------------
// DPI
// ---------------------------------------------------------------------------

pub fn validate_dpi(rule: &Rule, metadata: &ImageMetadata) -> ValidationResult {
    let params = match rule.params::<DpiParams>() {
        Ok(p) => p,
        Err(e) => return ValidationResult::unevaluated(rule, e.to_string()),
    };
    if metadata.dimensions().is_none() {
        return image_unavailable(rule);
    }
    let actual = metadata.dpi_or_fallback();
    let min = params.min_dpi;

    let passed = actual >= min;
    let details = if passed {
        format!("DPI correct: {actual} DPI")
    } else {
        format!("DPI too low: {actual} DPI (required: {min} DPI)")
    };

    verdict(rule, passed, DPI_CONFIDENCE, details, || {
        format!("Upscaled from {actual} DPI to {min} DPI")
    })
}

// ---------------------------------------------------------------------------
// File size
// ---------------------------------------------------------------------------

/// `900B` under 1 KiB, else `20.0KB`.
fn short_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    }
}

pub fn validate_file_size(rule: &Rule, size: u64) -> ValidationResult {
    let params = match rule.params::<FileSizeParams>() {
        Ok(p) => p,
        Err(e) => return ValidationResult::unevaluated(rule, e.to_string()),
    };
    let (min, max) = (params.min_size, params.max_size);

    let passed = (min..=max).contains(&size);
    let details = if passed {
        format!("File size correct: {}", short_size(size))
    } else {
        format!(
            "File size incorrect: {} (required: {} - {})",
            short_size(size),
            short_size(min),
            short_size(max)
        )
    };

    verdict(rule, passed, FILE_SIZE_CONFIDENCE, details, || {
        if size > max {
            format!("Compressed from {} to {}", short_size(size), short_size(max))
        } else {
            format!(
                "Quality adjusted from {} to {}",
                short_size(size),
                short_size(min)
            )
        }
    })
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

pub fn validate_format(rule: &Rule, media_type: &str) -> ValidationResult {
    let params = match rule.params::<FormatParams>() {
        Ok(p) => p,
        Err(e) => return ValidationResult::unevaluated(rule, e.to_string()),
    };
    let allowed = &params.allowed_formats;

    let passed = allowed.iter().any(|f| f == media_type);
    let details = if passed {
        format!("Format correct: {media_type}")
    } else {
        format!(
            "Format incorrect: {media_type} (required: {})",
            allowed.join(" or ")
        )
    };

    verdict(rule, passed, FORMAT_CONFIDENCE, details, || {
        format!("Converted from {media_type} to {}", allowed[0])
    })
}

// ---------------------------------------------------------------------------
// Background, quality, content (analyzer-backed)
// ---------------------------------------------------------------------------

pub fn validate_background(rule: &Rule, report: &BackgroundReport) -> ValidationResult {
    let params = match rule.params::<BackgroundParams>() {
        Ok(p) => p,
        Err(e) => return ValidationResult::unevaluated(rule, e.to_string()),
    };
    let measured = report.uniformity;
    let required = params.uniformity;

    let passed = measured >= required;
    let details = if passed {
        let colors = if params.allowed_colors.is_empty() {
            "plain".to_string()
        } else {
            params.allowed_colors.join("/")
        };
        format!(
            "Background correct: {colors} background detected ({:.0}% uniformity)",
            measured * 100.0
        )
    } else {
        format!(
            "Background incorrect: Non-uniform or colored background detected ({:.0}% uniformity, required: {:.0}%)",
            measured * 100.0,
            required * 100.0
        )
    };

    verdict(rule, passed, BACKGROUND_CONFIDENCE, details, || {
        let target = params
            .allowed_colors
            .first()
            .map(String::as_str)
            .unwrap_or("white");
        format!(
            "Background normalized to {target}, uniformity improved to {:.0}%",
            required * 100.0
        )
    })
}

pub fn validate_quality(rule: &Rule, report: &ShadowReport) -> ValidationResult {
    let params = match rule.params::<QualityParams>() {
        Ok(p) => p,
        Err(e) => return ValidationResult::unevaluated(rule, e.to_string()),
    };
    let measured = report.shadow_percentage;
    let max = params.max_shadow_percentage;

    let passed = measured <= max;
    let details = if passed {
        format!("Quality correct: Minimal shadow/glare detected ({measured:.1}%)")
    } else {
        format!("Quality issue: Shadow/glare detected ({measured:.1}%, max allowed: {max}%)")
    };

    verdict(rule, passed, QUALITY_CONFIDENCE, details, || {
        format!("Shadow removal applied, reduced from {measured:.1}% to {max}%")
    })
}

/// Face checks are never auto-corrected, whatever the rule says.
pub fn validate_content(rule: &Rule, report: &FaceReport) -> ValidationResult {
    let params = match rule.params::<ContentParams>() {
        Ok(p) => p,
        Err(e) => return ValidationResult::unevaluated(rule, e.to_string()),
    };
    let fraction = report.face_fraction;
    let too_small = fraction < params.min_face_size;
    let too_large = params.max_face_size.is_some_and(|max| fraction > max);
    let not_frontal = params.frontal && !report.frontal;

    let passed = report.detected && !too_small && !too_large && !not_frontal;
    let details = if !report.detected {
        "No face detected in image".to_string()
    } else if too_small {
        format!(
            "Face too small: {:.0}% of image (required: {:.0}%)",
            fraction * 100.0,
            params.min_face_size * 100.0
        )
    } else if too_large {
        format!(
            "Face too large: {:.0}% of image (maximum: {:.0}%)",
            fraction * 100.0,
            params.max_face_size.unwrap_or(1.0) * 100.0
        )
    } else if not_frontal {
        "Face not frontal - please face the camera directly".to_string()
    } else {
        format!(
            "Face detected correctly: Frontal, {:.0}% of image",
            fraction * 100.0
        )
    };

    let (pass_confidence, fail_confidence) = CONTENT_CONFIDENCE;
    ValidationResult {
        passed,
        confidence: if passed {
            pass_confidence
        } else {
            fail_confidence
        },
        rule: rule.clone(),
        details,
        correction_applied: false,
        correction_details: None,
    }
}
