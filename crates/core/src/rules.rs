//! Rule catalog data model.
//!
//! Rules, requirements and rule sets are static configuration: loaded once,
//! never mutated. Field names follow the published rule-set JSON, which is
//! camelCase throughout.
//!
//! Rule parameters are kept as a raw JSON object on [`Rule`] and decoded
//! into a typed view ([`DimensionParams`], [`DpiParams`], ...) when a rule
//! is evaluated or a catalog is loaded.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// What a rule checks. Unrecognized category strings are kept as
/// [`RuleCategory::Unknown`] so a catalog still loads; such rules always
/// fail with zero confidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleCategory {
    Dimension,
    FileSize,
    Format,
    Background,
    Dpi,
    Quality,
    Content,
    Unknown(String),
}

impl RuleCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dimension => "dimension",
            Self::FileSize => "fileSize",
            Self::Format => "format",
            Self::Background => "background",
            Self::Dpi => "dpi",
            Self::Quality => "quality",
            Self::Content => "content",
            Self::Unknown(other) => other,
        }
    }

    /// Categories that need decoded image dimensions or pixels.
    pub fn needs_image(&self) -> bool {
        matches!(
            self,
            Self::Dimension | Self::Dpi | Self::Background | Self::Quality | Self::Content
        )
    }
}

impl From<String> for RuleCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dimension" => Self::Dimension,
            "fileSize" => Self::FileSize,
            "format" => Self::Format,
            "background" => Self::Background,
            "dpi" => Self::Dpi,
            "quality" => Self::Quality,
            "content" => Self::Content,
            _ => Self::Unknown(value),
        }
    }
}

impl From<RuleCategory> for String {
    fn from(value: RuleCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Document and exam types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Photo,
    Signature,
    Document,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Signature => "signature",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "photo" => Ok(Self::Photo),
            "signature" => Ok(Self::Signature),
            "document" => Ok(Self::Document),
            other => Err(CoreError::Validation(format!(
                "Unknown document type '{other}'. Valid types: photo, signature, document"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamType {
    Nda,
    Jee,
    Neet,
    Upsc,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nda => "NDA",
            Self::Jee => "JEE",
            Self::Neet => "NEET",
            Self::Upsc => "UPSC",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NDA" => Ok(Self::Nda),
            "JEE" => Ok(Self::Jee),
            "NEET" => Ok(Self::Neet),
            "UPSC" => Ok(Self::Upsc),
            other => Err(CoreError::Validation(format!(
                "Unknown exam type '{other}'. Valid exams: NDA, JEE, NEET, UPSC"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule, requirement, rule set
// ---------------------------------------------------------------------------

/// A single declarative validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub category: RuleCategory,
    pub name: String,
    pub description: String,
    /// Citation into the exam notice, e.g. "JEE Guidelines 2026 - Section 5.1".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_reference: Option<String>,
    /// Named validator selector. Informational; dispatch is by `category`.
    pub validator: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub auto_correct: bool,
}

impl Rule {
    /// Decode and check this rule's parameters as `P`.
    pub fn params<P>(&self) -> Result<P, CoreError>
    where
        P: DeserializeOwned + Validate,
    {
        let params: P = serde_json::from_value(Value::Object(self.parameters.clone()))
            .map_err(|e| self.invalid(e))?;
        params.validate().map_err(|e| self.invalid(e))?;
        Ok(params)
    }

    /// Check that the parameters decode for this rule's category.
    ///
    /// Rules with an unknown category have nothing to check.
    pub fn check_parameters(&self) -> Result<(), CoreError> {
        match self.category {
            RuleCategory::Dimension => self.params::<DimensionParams>().map(drop),
            RuleCategory::Dpi => self.params::<DpiParams>().map(drop),
            RuleCategory::FileSize => self.params::<FileSizeParams>().map(drop),
            RuleCategory::Format => self.params::<FormatParams>().map(drop),
            RuleCategory::Background => self.params::<BackgroundParams>().map(drop),
            RuleCategory::Quality => self.params::<QualityParams>().map(drop),
            RuleCategory::Content => self.params::<ContentParams>().map(drop),
            RuleCategory::Unknown(_) => Ok(()),
        }
    }

    fn invalid(&self, err: impl fmt::Display) -> CoreError {
        CoreError::Validation(format!(
            "Rule '{}' ({}) has invalid parameters: {err}",
            self.id, self.category
        ))
    }
}

/// One document slot of an application (photo, signature, a certificate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNaming {
    /// Pattern with `{EXAM}`-style placeholders, see [`crate::naming`].
    pub pattern: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

// ---------------------------------------------------------------------------
// Application details
// ---------------------------------------------------------------------------
//
// Informational text published alongside the document rules. Dates are kept
// as strings because the published values are often partial ("2026-04-XX").

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTimeline {
    pub notification_date: Option<String>,
    pub application_start: Option<String>,
    pub application_end: Option<String>,
    pub exam_date1: Option<String>,
    pub exam_date2: Option<String>,
    pub admit_card: Option<String>,
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteria {
    pub nationality: Option<String>,
    pub age_limit: Option<AgeLimit>,
    pub marital_status: Option<String>,
    pub education: Option<EducationRequirements>,
}

/// Age bounds in years, e.g. 16.5 to 19.5.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeLimit {
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRequirements {
    pub army_wing: Option<String>,
    pub air_force_navy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationProcess {
    pub part1: Option<String>,
    pub part2: Option<String>,
    pub correction_window: Option<String>,
    pub application_mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFees {
    #[serde(rename = "generalOBC")]
    pub general_obc: Option<String>,
    #[serde(rename = "scSTSonsWidows")]
    pub sc_st_sons_widows: Option<String>,
    pub women: Option<String>,
    #[serde(default)]
    pub payment_modes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Helpline {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// Versioned requirements for one exam and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub exam_type: ExamType,
    pub year: u16,
    pub version: String,
    pub last_updated: NaiveDate,
    pub requirements: Vec<Requirement>,
    pub document_naming: DocumentNaming,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_timeline: Option<ApplicationTimeline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility_criteria: Option<EligibilityCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_process: Option<ApplicationProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_fees: Option<ApplicationFees>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_centers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helpline: Option<Helpline>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub important_notes: Vec<String>,
}

impl RuleSet {
    /// Catalog lookup key, e.g. `NDA-2026`.
    pub fn key(&self) -> String {
        rule_set_key(self.exam_type, self.year)
    }

    pub fn requirement(&self, requirement_id: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.id == requirement_id)
    }

    /// Requirements for a document type, in catalog order.
    pub fn requirements_for(
        &self,
        document_type: DocumentType,
    ) -> impl Iterator<Item = &Requirement> {
        self.requirements
            .iter()
            .filter(move |r| r.document_type == document_type)
    }

    pub fn required_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| r.required)
    }

    /// Check every rule's parameters; the first bad rule is reported.
    pub fn check_parameters(&self) -> Result<(), CoreError> {
        for requirement in &self.requirements {
            for rule in &requirement.rules {
                rule.check_parameters()?;
            }
        }
        Ok(())
    }
}

pub fn rule_set_key(exam_type: ExamType, year: u16) -> String {
    format!("{exam_type}-{year}")
}

// ---------------------------------------------------------------------------
// Typed parameter views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Cm,
    Mm,
    In,
}

impl LengthUnit {
    pub fn to_cm(self, value: f64) -> f64 {
        match self {
            Self::Cm => value,
            Self::Mm => value / 10.0,
            Self::In => value * 2.54,
        }
    }
}

/// Required printed size; compared after converting pixels via the DPI estimate.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalDimension {
    #[validate(range(exclusive_min = 0.0))]
    pub width: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub height: f64,
    #[serde(default)]
    pub unit: LengthUnit,
    #[validate(range(min = 0.0))]
    pub tolerance: f64,
}

impl PhysicalDimension {
    pub fn width_cm(&self) -> f64 {
        self.unit.to_cm(self.width)
    }

    pub fn height_cm(&self) -> f64 {
        self.unit.to_cm(self.height)
    }

    pub fn tolerance_cm(&self) -> f64 {
        self.unit.to_cm(self.tolerance)
    }
}

/// Pixel bounds applied to both axes.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "check_pixel_range"))]
pub struct PixelRange {
    #[validate(range(min = 1))]
    pub min_px: u32,
    pub max_px: u32,
    #[serde(default)]
    pub tolerance: u32,
}

fn check_pixel_range(range: &PixelRange) -> Result<(), ValidationError> {
    if range.max_px < range.min_px {
        return Err(ValidationError::new("max_px_below_min_px"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DimensionParams {
    Physical(PhysicalDimension),
    Pixels(PixelRange),
}

impl Validate for DimensionParams {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Physical(p) => p.validate(),
            Self::Pixels(p) => p.validate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DpiParams {
    #[validate(range(min = 1))]
    pub min_dpi: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "check_size_range"))]
pub struct FileSizeParams {
    #[serde(default)]
    pub min_size: u64,
    pub max_size: u64,
}

fn check_size_range(params: &FileSizeParams) -> Result<(), ValidationError> {
    if params.max_size < params.min_size {
        return Err(ValidationError::new("max_size_below_min_size"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormatParams {
    #[validate(length(min = 1))]
    pub allowed_formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundParams {
    #[serde(default)]
    pub allowed_colors: Vec<String>,
    /// Required uniformity as a fraction in `[0, 1]`.
    #[validate(range(min = 0.0, max = 1.0))]
    pub uniformity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QualityParams {
    #[validate(range(min = 0.0, max = 100.0))]
    pub max_shadow_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContentParams {
    /// Minimum face area as a fraction of the image.
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_face_size: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_face_size: Option<f64>,
    #[serde(default = "default_true")]
    pub frontal: bool,
}

fn default_true() -> bool {
    true
}
