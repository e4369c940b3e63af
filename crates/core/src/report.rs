//! Validation outcome types.
//!
//! Created fresh for each validation run and never mutated afterwards.

use serde::Serialize;
use uuid::Uuid;

use crate::correction::AutoCorrection;
use crate::rules::{DocumentType, Rule};
use crate::scoring::{compliance_score, mean_confidence};
use crate::types::Timestamp;

/// Verdict of one rule against one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub passed: bool,
    /// Self-reported certainty in the verdict, 0–100.
    pub confidence: u8,
    pub rule: Rule,
    pub details: String,
    pub correction_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction_details: Option<String>,
}

impl ValidationResult {
    /// Zero-confidence failure for a rule that could not be evaluated.
    pub fn unevaluated(rule: &Rule, details: impl Into<String>) -> Self {
        Self {
            passed: false,
            confidence: 0,
            rule: rule.clone(),
            details: details.into(),
            correction_applied: false,
            correction_details: None,
        }
    }
}

/// All results for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentValidation {
    pub document_id: Uuid,
    pub document_type: DocumentType,
    /// True when every rule passed.
    pub overall_passed: bool,
    /// Rounded mean of per-rule confidences.
    pub overall_confidence: u8,
    /// Percentage of rules passed, rounded.
    pub compliance_score: u8,
    pub results: Vec<ValidationResult>,
    pub timestamp: Timestamp,
    pub auto_corrections: Vec<AutoCorrection>,
}

impl DocumentValidation {
    pub fn from_results(
        document_type: DocumentType,
        results: Vec<ValidationResult>,
        auto_corrections: Vec<AutoCorrection>,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();

        Self {
            document_id: Uuid::new_v4(),
            document_type,
            overall_passed: total > 0 && passed == total,
            overall_confidence: mean_confidence(&results),
            compliance_score: compliance_score(passed, total),
            results,
            timestamp: chrono::Utc::now(),
            auto_corrections,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_rule;
    use serde_json::json;

    fn result(passed: bool, confidence: u8) -> ValidationResult {
        ValidationResult {
            passed,
            confidence,
            rule: make_rule("format", json!({"allowedFormats": ["image/jpeg"]}), false),
            details: String::new(),
            correction_applied: false,
            correction_details: None,
        }
    }

    #[test]
    fn aggregates_follow_results() {
        let v = DocumentValidation::from_results(
            DocumentType::Photo,
            vec![result(true, 100), result(false, 95), result(true, 99)],
            Vec::new(),
        );
        assert!(!v.overall_passed);
        assert_eq!(v.compliance_score, 67);
        assert_eq!(v.overall_confidence, 98);
        assert_eq!(v.passed_count(), 2);
        assert_eq!(v.failed().count(), 1);
    }

    #[test]
    fn single_rule_confidence_is_that_rule() {
        let v = DocumentValidation::from_results(
            DocumentType::Signature,
            vec![result(false, 85)],
            Vec::new(),
        );
        assert_eq!(v.overall_confidence, 85);
        assert_eq!(v.compliance_score, 0);
    }

    #[test]
    fn serializes_to_plain_record() {
        let v = DocumentValidation::from_results(
            DocumentType::Photo,
            vec![result(true, 100)],
            Vec::new(),
        );
        let json = serde_json::to_value(&v).expect("serialize");
        assert_eq!(json["documentType"], "photo");
        assert_eq!(json["overallPassed"], true);
        assert_eq!(json["results"][0]["rule"]["category"], "format");
        assert!(json["results"][0].get("correctionDetails").is_none());
        assert_eq!(json["results"][0]["correctionApplied"], false);
        assert!(json.get("overall_passed").is_none());
    }
}
