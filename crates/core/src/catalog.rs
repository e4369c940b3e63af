//! Rule catalog: exam/year keyed lookup of [`RuleSet`]s.
//!
//! Lookup is by exact `{EXAM}-{YEAR}` key. A missing rule set is a normal
//! outcome (`None`); callers decide whether that blocks a flow.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::CoreError;
use crate::rules::{rule_set_key, ExamType, RuleSet};

const NDA_2026: &str = include_str!("../data/nda_2026.json");
const JEE_2026: &str = include_str!("../data/jee_2026.json");

#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rule_sets: BTreeMap<String, RuleSet>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the bundled NDA-2026 and JEE-2026 rule sets.
    pub fn builtin() -> Result<Self, CoreError> {
        let mut catalog = Self::new();
        for raw in [NDA_2026, JEE_2026] {
            catalog.insert(serde_json::from_str(raw)?)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON array of rule sets.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let rule_sets: Vec<RuleSet> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for rule_set in rule_sets {
            catalog.insert(rule_set)?;
        }
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            rule_sets = catalog.len(),
            "Loaded rule catalog",
        );
        Ok(catalog)
    }

    /// Add a rule set after checking its rule parameters.
    ///
    /// A rule set with the same key replaces the previous one.
    pub fn insert(&mut self, rule_set: RuleSet) -> Result<(), CoreError> {
        rule_set.check_parameters()?;
        let key = rule_set.key();
        if self.rule_sets.insert(key.clone(), rule_set).is_some() {
            tracing::warn!(key = %key, "Replaced existing rule set");
        }
        Ok(())
    }

    /// Merge another catalog into this one; `other` wins on key clashes.
    pub fn extend(&mut self, other: RuleCatalog) {
        self.rule_sets.extend(other.rule_sets);
    }

    pub fn get_rule_set(&self, exam_type: ExamType, year: u16) -> Option<&RuleSet> {
        self.rule_sets.get(&rule_set_key(exam_type, year))
    }

    /// Available keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rule_sets.keys().map(String::as_str)
    }

    /// Rule sets in key order.
    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        self.rule_sets.values()
    }

    pub fn len(&self) -> usize {
        self.rule_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DocumentType, RuleCategory};
    use assert_matches::assert_matches;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = RuleCatalog::builtin().expect("builtin catalog");
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["JEE-2026", "NDA-2026"]);
    }

    #[test]
    fn lookup_is_exact() {
        let catalog = RuleCatalog::builtin().expect("builtin catalog");
        assert!(catalog.get_rule_set(ExamType::Nda, 2026).is_some());
        assert!(catalog.get_rule_set(ExamType::Nda, 2025).is_none());
        assert!(catalog.get_rule_set(ExamType::Neet, 2026).is_none());
    }

    #[test]
    fn jee_photo_rules_are_ordered() {
        let catalog = RuleCatalog::builtin().expect("builtin catalog");
        let jee = catalog.get_rule_set(ExamType::Jee, 2026).expect("JEE-2026");
        let photo = jee
            .requirements_for(DocumentType::Photo)
            .next()
            .expect("photo requirement");
        let categories: Vec<_> = photo.rules.iter().map(|r| r.category.clone()).collect();
        assert_eq!(
            categories,
            vec![
                RuleCategory::Dimension,
                RuleCategory::Dpi,
                RuleCategory::FileSize,
                RuleCategory::Format,
                RuleCategory::Background,
                RuleCategory::Content,
            ]
        );
    }

    #[test]
    fn nda_has_optional_and_required_documents() {
        let catalog = RuleCatalog::builtin().expect("builtin catalog");
        let nda = catalog.get_rule_set(ExamType::Nda, 2026).expect("NDA-2026");
        let required: Vec<_> = nda.required_requirements().map(|r| r.id.as_str()).collect();
        assert_eq!(
            required,
            vec!["nda-photo", "nda-signature", "nda-10th-marksheet"]
        );
        assert_eq!(nda.requirements_for(DocumentType::Document).count(), 4);
    }

    #[test]
    fn application_details_survive_round_trip() {
        let catalog = RuleCatalog::builtin().expect("builtin catalog");
        let nda = catalog.get_rule_set(ExamType::Nda, 2026).expect("NDA-2026");

        let age = nda
            .eligibility_criteria
            .as_ref()
            .and_then(|e| e.age_limit.as_ref())
            .expect("age limit");
        assert_eq!((age.min, age.max), (16.5, 19.5));
        let fees = nda.application_fees.as_ref().expect("fees");
        assert_eq!(fees.general_obc.as_deref(), Some("₹100/-"));
        assert_eq!(fees.payment_modes.len(), 4);
        assert_eq!(nda.important_notes.len(), 4);

        let json = serde_json::to_value(nda).expect("serialize");
        assert_eq!(json["applicationTimeline"]["examDate1"], "2026-04-XX");
        assert_eq!(json["applicationFees"]["scSTSonsWidows"], "Exempt");
        let back: RuleSet = serde_json::from_value(json).expect("deserialize");
        assert_eq!(&back, nda);

        let jee = catalog.get_rule_set(ExamType::Jee, 2026).expect("JEE-2026");
        assert!(jee.application_timeline.is_none());
        let json = serde_json::to_value(jee).expect("serialize");
        assert!(json.get("applicationTimeline").is_none());
        assert!(json.get("importantNotes").is_none());
    }

    #[test]
    fn from_json_rejects_bad_parameters() {
        let json = r#"[{
            "examType": "NEET",
            "year": 2026,
            "version": "1.0.0",
            "lastUpdated": "2026-02-01",
            "requirements": [{
                "id": "neet-photo",
                "name": "Photo",
                "type": "photo",
                "required": true,
                "rules": [{
                    "id": "neet-size",
                    "category": "fileSize",
                    "name": "File Size",
                    "description": "Inverted bounds",
                    "validator": "fileSizeValidator",
                    "parameters": {"minSize": 5000, "maxSize": 100}
                }]
            }],
            "documentNaming": {"pattern": "{ROLLNO}_{TYPE}.jpg"}
        }]"#;
        assert_matches!(
            RuleCatalog::from_json(json),
            Err(CoreError::Validation(msg)) if msg.contains("neet-size")
        );
    }

    #[test]
    fn from_path_reads_catalog_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, format!("[{JEE_2026}]")).expect("write catalog");

        let catalog = RuleCatalog::from_path(&path).expect("load catalog");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get_rule_set(ExamType::Jee, 2026).is_some());
    }

    #[test]
    fn missing_catalog_file_is_io_error() {
        assert_matches!(
            RuleCatalog::from_path("/nonexistent/catalog.json"),
            Err(CoreError::Io(_))
        );
    }
}
