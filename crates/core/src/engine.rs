//! Validation engine: evaluates an ordered rule list against one upload.
//!
//! Rules are evaluated strictly in order, each awaited before the next, with
//! a configurable per-rule delay. Individual rule problems (bad parameters,
//! an undecodable image, an analyzer error) become zero-confidence failing
//! results; only an empty rule list is an error.

use std::time::Duration;

use futures::future::join_all;

use crate::analysis::Analyzers;
use crate::correction::{self, AutoCorrection};
use crate::error::CoreError;
use crate::metadata::{reference_width_cm, ImageMetadata, UploadedFile, DEFAULT_REFERENCE_WIDTH_CM};
use crate::report::{DocumentValidation, ValidationResult};
use crate::rules::{DocumentType, Rule, RuleCategory};
use crate::validators;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Delay before metadata extraction.
    pub initial_delay: Duration,
    /// Delay before each rule.
    pub rule_delay: Duration,
    /// Delay of the corrected-file simulator.
    pub correction_delay: Duration,
    /// Printed width assumed for the DPI estimate when no physical dimension
    /// rule declares one.
    pub default_reference_width_cm: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1500),
            rule_delay: Duration::from_millis(300),
            correction_delay: Duration::from_millis(1000),
            default_reference_width_cm: DEFAULT_REFERENCE_WIDTH_CM,
        }
    }
}

impl EngineConfig {
    /// No simulated latency anywhere.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            rule_delay: Duration::ZERO,
            correction_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    analyzers: Analyzers,
    config: EngineConfig,
}

impl ValidationEngine {
    pub fn new(analyzers: Analyzers, config: EngineConfig) -> Self {
        Self { analyzers, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate `file` against `rules`, in order.
    pub async fn validate(
        &self,
        file: &UploadedFile,
        document_type: DocumentType,
        rules: &[Rule],
    ) -> Result<DocumentValidation, CoreError> {
        if rules.is_empty() {
            return Err(CoreError::Validation(format!(
                "No rules to validate '{}' against",
                file.name
            )));
        }

        pause(self.config.initial_delay).await;

        let reference = reference_width_cm(rules, self.config.default_reference_width_cm);
        let metadata = ImageMetadata::extract(file, reference);

        let mut results = Vec::with_capacity(rules.len());
        let mut auto_corrections = Vec::new();

        for rule in rules {
            pause(self.config.rule_delay).await;

            let result = self.evaluate(rule, file, &metadata).await;
            tracing::debug!(
                rule_id = %rule.id,
                category = %rule.category,
                passed = result.passed,
                confidence = result.confidence,
                "Rule evaluated",
            );

            if let Some(correction) = AutoCorrection::from_result(&result, &metadata) {
                auto_corrections.push(correction);
            }
            results.push(result);
        }

        let validation = DocumentValidation::from_results(document_type, results, auto_corrections);
        tracing::info!(
            file = %file.name,
            document_type = %document_type,
            compliance = validation.compliance_score,
            passed = validation.overall_passed,
            corrections = validation.auto_corrections.len(),
            "Document validated",
        );
        Ok(validation)
    }

    /// Validate independent documents concurrently. Output order matches
    /// input order.
    pub async fn validate_batch(
        &self,
        documents: &[(UploadedFile, DocumentType, Vec<Rule>)],
    ) -> Vec<Result<DocumentValidation, CoreError>> {
        join_all(
            documents
                .iter()
                .map(|(file, document_type, rules)| self.validate(file, *document_type, rules)),
        )
        .await
    }

    /// Renamed stand-in for the corrected artifact of `original`.
    pub async fn generate_corrected_file(
        &self,
        original: &UploadedFile,
        corrections: &[AutoCorrection],
    ) -> UploadedFile {
        correction::generate_corrected_file(&self.config, original, corrections).await
    }

    async fn evaluate(
        &self,
        rule: &Rule,
        file: &UploadedFile,
        metadata: &ImageMetadata,
    ) -> ValidationResult {
        if rule.category.needs_image() && metadata.dimensions().is_none() {
            return validators::image_unavailable(rule);
        }

        match &rule.category {
            RuleCategory::Dimension => validators::validate_dimension(rule, metadata),
            RuleCategory::Dpi => validators::validate_dpi(rule, metadata),
            RuleCategory::FileSize => validators::validate_file_size(rule, file.size()),
            RuleCategory::Format => validators::validate_format(rule, &file.media_type),
            RuleCategory::Background => {
                match self.analyzers.background.analyze_background(file, metadata).await {
                    Ok(report) => validators::validate_background(rule, &report),
                    Err(e) => analyzer_failure(rule, e),
                }
            }
            RuleCategory::Quality => {
                match self.analyzers.shadow.detect_shadows(file, metadata).await {
                    Ok(report) => validators::validate_quality(rule, &report),
                    Err(e) => analyzer_failure(rule, e),
                }
            }
            RuleCategory::Content => match self.analyzers.face.detect_face(file, metadata).await {
                Ok(report) => validators::validate_content(rule, &report),
                Err(e) => analyzer_failure(rule, e),
            },
            RuleCategory::Unknown(name) => {
                tracing::warn!(rule_id = %rule.id, category = %name, "Unknown rule category");
                validators::unknown_category(rule)
            }
        }
    }
}

fn analyzer_failure(rule: &Rule, err: CoreError) -> ValidationResult {
    tracing::warn!(rule_id = %rule.id, error = %err, "Analysis failed");
    ValidationResult::unevaluated(rule, format!("Analysis failed: {err}"))
}
