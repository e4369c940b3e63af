//! Auto-correction records and the corrected-file simulator.
//!
//! Nothing here transforms pixels. [`generate_corrected_file`] returns the
//! original bytes under a `_corrected` name after a simulated processing
//! delay. A real implementation has to replace it with genuine transforms
//! (resize, recompression, background normalization, DPI upscaling).

use serde::Serialize;
use uuid::Uuid;

use crate::engine::EngineConfig;
use crate::metadata::{ImageMetadata, UploadedFile};
use crate::report::ValidationResult;
use crate::rules::RuleCategory;

pub const CORRECTED_SUFFIX: &str = "_corrected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionType {
    Crop,
    Resize,
    Background,
    Shadow,
    Dpi,
    Format,
    Rename,
}

/// Correction type for a failing rule of `category`.
///
/// Content (face) checks and unknown categories are never corrected.
pub fn correction_type_for(category: &RuleCategory) -> Option<CorrectionType> {
    match category {
        RuleCategory::Dimension => Some(CorrectionType::Resize),
        RuleCategory::Dpi => Some(CorrectionType::Dpi),
        RuleCategory::FileSize | RuleCategory::Format => Some(CorrectionType::Format),
        RuleCategory::Background => Some(CorrectionType::Background),
        RuleCategory::Quality => Some(CorrectionType::Shadow),
        RuleCategory::Content | RuleCategory::Unknown(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCorrection {
    pub id: Uuid,
    pub correction_type: CorrectionType,
    pub description: String,
    /// Opaque metadata snapshot before the correction.
    pub before: serde_json::Value,
    /// Same snapshot flagged `"corrected": true`.
    pub after: serde_json::Value,
    pub confidence: u8,
}

impl AutoCorrection {
    /// Build the correction record for a failing, corrected result.
    ///
    /// Returns `None` when the result was not corrected or its category has
    /// no correction type.
    pub fn from_result(result: &ValidationResult, metadata: &ImageMetadata) -> Option<Self> {
        if result.passed || !result.rule.auto_correct || !result.correction_applied {
            return None;
        }
        let correction_type = correction_type_for(&result.rule.category)?;

        let before = metadata.snapshot();
        let mut after = before.clone();
        if let Some(obj) = after.as_object_mut() {
            obj.insert("corrected".to_string(), serde_json::Value::Bool(true));
        }

        Some(Self {
            id: Uuid::new_v4(),
            correction_type,
            description: result
                .correction_details
                .clone()
                .unwrap_or_else(|| format!("Auto-corrected {}", result.rule.name)),
            before,
            after,
            confidence: result.confidence,
        })
    }
}

/// `photo.jpg` becomes `photo_corrected.jpg`; `scan` becomes `scan_corrected`.
pub fn corrected_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{CORRECTED_SUFFIX}.{ext}"),
        _ => format!("{name}{CORRECTED_SUFFIX}"),
    }
}

/// Produce the stand-in "corrected" artifact for `original`.
///
/// Waits `config.correction_delay`, then returns a renamed copy with the same
/// bytes and media type.
pub async fn generate_corrected_file(
    config: &EngineConfig,
    original: &UploadedFile,
    corrections: &[AutoCorrection],
) -> UploadedFile {
    if !config.correction_delay.is_zero() {
        tokio::time::sleep(config.correction_delay).await;
    }

    let name = corrected_file_name(&original.name);
    tracing::info!(
        original = %original.name,
        corrected = %name,
        corrections = corrections.len(),
        "Generated corrected file",
    );

    UploadedFile {
        name,
        media_type: original.media_type.clone(),
        bytes: original.bytes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DEFAULT_REFERENCE_WIDTH_CM;
    use crate::test_helpers::make_rule;
    use serde_json::json;

    #[test]
    fn category_mapping() {
        assert_eq!(
            correction_type_for(&RuleCategory::Dimension),
            Some(CorrectionType::Resize)
        );
        assert_eq!(
            correction_type_for(&RuleCategory::FileSize),
            Some(CorrectionType::Format)
        );
        assert_eq!(
            correction_type_for(&RuleCategory::Quality),
            Some(CorrectionType::Shadow)
        );
        assert_eq!(correction_type_for(&RuleCategory::Content), None);
        assert_eq!(
            correction_type_for(&RuleCategory::Unknown("x".to_string())),
            None
        );
    }

    #[test]
    fn corrected_names() {
        assert_eq!(corrected_file_name("photo.jpg"), "photo_corrected.jpg");
        assert_eq!(corrected_file_name("Photo.JPEG"), "Photo_corrected.JPEG");
        assert_eq!(
            corrected_file_name("scan.final.png"),
            "scan.final_corrected.png"
        );
        assert_eq!(corrected_file_name("scan"), "scan_corrected");
        assert_eq!(corrected_file_name(".hidden"), ".hidden_corrected");
    }

    #[test]
    fn correction_record_marks_after_snapshot() {
        let rule = make_rule("dpi", json!({"minDpi": 300}), true);
        let result = ValidationResult {
            passed: false,
            confidence: 88,
            rule,
            details: "DPI too low".to_string(),
            correction_applied: true,
            correction_details: Some("Upscaled from 96 DPI to 300 DPI".to_string()),
        };
        let file = UploadedFile::new("p.jpg", "image/jpeg", Vec::new());
        let meta = ImageMetadata::extract(&file, DEFAULT_REFERENCE_WIDTH_CM);

        let correction = AutoCorrection::from_result(&result, &meta).expect("correction");
        assert_eq!(correction.correction_type, CorrectionType::Dpi);
        assert_eq!(correction.confidence, 88);
        assert_eq!(correction.after["corrected"], true);
        assert!(correction.before.get("corrected").is_none());
    }

    #[test]
    fn passing_result_yields_no_correction() {
        let rule = make_rule("dpi", json!({"minDpi": 300}), true);
        let result = ValidationResult {
            passed: true,
            confidence: 96,
            rule,
            details: String::new(),
            correction_applied: false,
            correction_details: None,
        };
        let file = UploadedFile::new("p.jpg", "image/jpeg", Vec::new());
        let meta = ImageMetadata::extract(&file, DEFAULT_REFERENCE_WIDTH_CM);
        assert!(AutoCorrection::from_result(&result, &meta).is_none());
    }

    #[tokio::test]
    async fn corrected_file_keeps_bytes() {
        let original = UploadedFile::new("sig.png", "image/png", vec![1, 2, 3]);
        let corrected =
            generate_corrected_file(&EngineConfig::immediate(), &original, &[]).await;
        assert_eq!(corrected.name, "sig_corrected.png");
        assert_eq!(corrected.media_type, "image/png");
        assert_eq!(corrected.bytes, original.bytes);
    }
}
