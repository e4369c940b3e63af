//! Compliance and confidence scoring.
//!
//! Aggregation rules for a document validation plus the risk and
//! confidence bands shown next to scores.

use serde::Serialize;

use crate::report::{DocumentValidation, ValidationResult};

/// Minutes of manual rework an auto-correction is assumed to save.
pub const MINUTES_SAVED_PER_CORRECTION: u32 = 5;

/// `round(100 * passed / total)`; 0 when there is nothing to score.
pub fn compliance_score(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * passed as f64 / total as f64).round() as u8
}

/// Rounded arithmetic mean of per-result confidences.
pub fn mean_confidence(results: &[ValidationResult]) -> u8 {
    if results.is_empty() {
        return 0;
    }
    let sum: u32 = results.iter().map(|r| u32::from(r.confidence)).sum();
    (f64::from(sum) / results.len() as f64).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Rejection risk for a compliance score.
    pub fn from_compliance(score: u8) -> Self {
        match score {
            90.. => Self::Low,
            70..=89 => Self::Medium,
            _ => Self::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            95.. => Self::High,
            80..=94 => Self::Medium,
            _ => Self::Low,
        }
    }
}

pub fn time_saved_minutes(auto_corrections: usize) -> u32 {
    auto_corrections as u32 * MINUTES_SAVED_PER_CORRECTION
}

/// Human-readable size: `512 B`, `20.0 KB`, `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

// ---------------------------------------------------------------------------
// Summary across documents
// ---------------------------------------------------------------------------

/// Totals across the validations of one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub documents: usize,
    pub passed: usize,
    pub auto_fixed: usize,
    /// Rounded mean of the per-document compliance scores.
    pub average_compliance: u8,
    pub risk: RiskLevel,
    pub time_saved_minutes: u32,
}

impl ComplianceSummary {
    pub fn from_validations<'a>(
        validations: impl IntoIterator<Item = &'a DocumentValidation>,
    ) -> Self {
        let mut documents = 0usize;
        let mut passed = 0usize;
        let mut corrections = 0usize;
        let mut auto_fixed = 0usize;
        let mut compliance_sum = 0u32;

        for v in validations {
            documents += 1;
            if v.overall_passed {
                passed += 1;
            }
            if !v.auto_corrections.is_empty() {
                auto_fixed += 1;
            }
            corrections += v.auto_corrections.len();
            compliance_sum += u32::from(v.compliance_score);
        }

        let average_compliance = if documents == 0 {
            0
        } else {
            (f64::from(compliance_sum) / documents as f64).round() as u8
        };

        Self {
            documents,
            passed,
            auto_fixed,
            average_compliance,
            risk: RiskLevel::from_compliance(average_compliance),
            time_saved_minutes: time_saved_minutes(corrections),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compliance_rounds_half_up() {
        assert_eq!(compliance_score(1, 3), 33);
        assert_eq!(compliance_score(2, 3), 67);
        assert_eq!(compliance_score(1, 8), 13);
        assert_eq!(compliance_score(4, 4), 100);
        assert_eq!(compliance_score(0, 0), 0);
    }

    #[test]
    fn risk_bands() {
        assert_eq!(RiskLevel::from_compliance(100), RiskLevel::Low);
        assert_eq!(RiskLevel::from_compliance(90), RiskLevel::Low);
        assert_eq!(RiskLevel::from_compliance(89), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_compliance(70), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_compliance(69), RiskLevel::High);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(ConfidenceBand::from_confidence(97), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(85), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(72), ConfidenceBand::Low);
    }

    #[test]
    fn file_size_formatting() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(20480), "20.0 KB");
        assert_eq!(format_file_size(1572864), "1.5 MB");
    }

    #[test]
    fn time_saved_is_five_minutes_each() {
        assert_eq!(time_saved_minutes(0), 0);
        assert_eq!(time_saved_minutes(3), 15);
    }

    #[test]
    fn empty_summary() {
        let summary = ComplianceSummary::from_validations(std::iter::empty());
        assert_eq!(summary.documents, 0);
        assert_eq!(summary.average_compliance, 0);
        assert_eq!(summary.risk, RiskLevel::High);
    }
}
