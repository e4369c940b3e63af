//! Application session state.
//!
//! [`AppSession`] carries what a client keeps between runs (auth token,
//! theme, the exam being applied for) and is persisted as JSON through
//! explicit [`AppSession::load`] / [`AppSession::save`] calls.
//!
//! [`UploadSession`] tracks one application in progress: the resolved rule
//! set and the latest validation per requirement.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::RuleCatalog;
use crate::error::CoreError;
use crate::report::DocumentValidation;
use crate::rules::{rule_set_key, DocumentType, ExamType, Requirement, Rule, RuleSet};
use crate::scoring::ComplianceSummary;

// ---------------------------------------------------------------------------
// Persisted client state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSelection {
    pub exam_type: ExamType,
    pub year: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSession {
    pub auth_token: Option<String>,
    pub theme: Theme,
    pub selected_exam: Option<ExamSelection>,
}

impl AppSession {
    /// Load from `path`; a missing file yields the default session.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No saved session, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!(path = %path.display(), "Session saved");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn sign_in(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    /// Drops the token and the current exam selection.
    pub fn sign_out(&mut self) {
        self.auth_token = None;
        self.selected_exam = None;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn select_exam(&mut self, exam_type: ExamType, year: u16) {
        self.selected_exam = Some(ExamSelection { exam_type, year });
    }
}

// ---------------------------------------------------------------------------
// Upload flow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct UploadSession {
    rule_set: RuleSet,
    validations: HashMap<String, DocumentValidation>,
}

impl UploadSession {
    /// Resolve the rule set for `exam_type`/`year`. Without one the upload
    /// flow cannot start.
    pub fn start(catalog: &RuleCatalog, exam_type: ExamType, year: u16) -> Result<Self, CoreError> {
        let rule_set = catalog
            .get_rule_set(exam_type, year)
            .ok_or_else(|| CoreError::NotFound {
                entity: "rule set",
                key: rule_set_key(exam_type, year),
            })?;

        tracing::info!(
            rule_set = %rule_set.key(),
            version = %rule_set.version,
            requirements = rule_set.requirements.len(),
            "Upload session started",
        );
        Ok(Self {
            rule_set: rule_set.clone(),
            validations: HashMap::new(),
        })
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn requirement(&self, requirement_id: &str) -> Result<&Requirement, CoreError> {
        self.rule_set
            .requirement(requirement_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "requirement",
                key: requirement_id.to_string(),
            })
    }

    /// The single requirement of `document_type`.
    ///
    /// Rules are never combined across requirements: when several
    /// requirements share the type, the caller has to name one by id.
    pub fn requirement_for(&self, document_type: DocumentType) -> Result<&Requirement, CoreError> {
        let candidates: Vec<&Requirement> =
            self.rule_set.requirements_for(document_type).collect();
        match candidates.as_slice() {
            [] => Err(CoreError::NotFound {
                entity: "requirement",
                key: format!("{} {document_type}", self.rule_set.key()),
            }),
            [only] => Ok(only),
            several => {
                let ids: Vec<&str> = several.iter().map(|r| r.id.as_str()).collect();
                Err(CoreError::Validation(format!(
                    "{} has {} {document_type} requirements, pick one of: {}",
                    self.rule_set.key(),
                    several.len(),
                    ids.join(", ")
                )))
            }
        }
    }

    pub fn rules(&self, requirement_id: &str) -> Result<&[Rule], CoreError> {
        Ok(&self.requirement(requirement_id)?.rules)
    }

    /// Store `validation` as the latest outcome for `requirement_id`,
    /// replacing any earlier one.
    pub fn record(
        &mut self,
        requirement_id: &str,
        validation: DocumentValidation,
    ) -> Result<(), CoreError> {
        let requirement = self.requirement(requirement_id)?;
        if requirement.document_type != validation.document_type {
            return Err(CoreError::Validation(format!(
                "Requirement '{requirement_id}' expects a {} but the validation is for a {}",
                requirement.document_type, validation.document_type
            )));
        }
        self.validations.insert(requirement_id.to_string(), validation);
        Ok(())
    }

    pub fn validation(&self, requirement_id: &str) -> Option<&DocumentValidation> {
        self.validations.get(requirement_id)
    }

    /// Required requirements without a passing validation.
    pub fn outstanding(&self) -> impl Iterator<Item = &Requirement> {
        self.rule_set.required_requirements().filter(|r| {
            !self
                .validations
                .get(&r.id)
                .is_some_and(|v| v.overall_passed)
        })
    }

    pub fn is_complete(&self) -> bool {
        self.outstanding().next().is_none()
    }

    pub fn summary(&self) -> ComplianceSummary {
        ComplianceSummary::from_validations(self.validations.values())
    }
}
