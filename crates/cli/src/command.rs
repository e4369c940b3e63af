//! Command-line parsing and execution.
//!
//! ```text
//! applysmart list
//! applysmart rules <EXAM> <YEAR>
//! applysmart validate <EXAM> <YEAR> <DOC_TYPE|REQUIREMENT_ID> <FILE>
//! applysmart name <EXAM> <YEAR> <DOC_TYPE> <ROLL_NO> <CANDIDATE NAME...>
//! applysmart session [theme|sign-out]
//! ```
//!
//! Every command prints one JSON document on stdout.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use applysmart_core::metadata::UploadedFile;
use applysmart_core::naming::{render_document_name, NamingContext};
use applysmart_core::rules::{DocumentType, ExamType, Requirement};
use applysmart_core::scoring::{ComplianceSummary, RiskLevel};
use applysmart_core::session::{AppSession, UploadSession};
use applysmart_core::{RuleCatalog, ValidationEngine};
use serde_json::{json, Value};

use crate::config::CliConfig;

pub const USAGE: &str = "usage:
  applysmart list
  applysmart rules <EXAM> <YEAR>
  applysmart validate <EXAM> <YEAR> <DOC_TYPE|REQUIREMENT_ID> <FILE>
  applysmart name <EXAM> <YEAR> <DOC_TYPE> <ROLL_NO> <CANDIDATE NAME...>
  applysmart session [theme|sign-out]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Show,
    ToggleTheme,
    SignOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Rules {
        exam_type: ExamType,
        year: u16,
    },
    Validate {
        exam_type: ExamType,
        year: u16,
        /// A document type or a requirement id.
        target: String,
        file: PathBuf,
    },
    Name {
        exam_type: ExamType,
        year: u16,
        document_type: DocumentType,
        roll_number: String,
        candidate_name: String,
    },
    Session(SessionAction),
}

fn parse_exam(args: &[String]) -> anyhow::Result<(ExamType, u16)> {
    let [exam, year, ..] = args else {
        bail!("expected <EXAM> <YEAR>\n{USAGE}");
    };
    let exam_type: ExamType = exam.parse()?;
    let year: u16 = year
        .parse()
        .with_context(|| format!("'{year}' is not a valid year"))?;
    Ok((exam_type, year))
}

impl Command {
    /// Parse arguments after the program name.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!("missing command\n{USAGE}");
        };

        match name.as_str() {
            "list" => Ok(Self::List),
            "rules" => {
                let (exam_type, year) = parse_exam(rest)?;
                Ok(Self::Rules { exam_type, year })
            }
            "validate" => {
                let (exam_type, year) = parse_exam(rest)?;
                let [_, _, target, file] = rest else {
                    bail!("validate takes <EXAM> <YEAR> <DOC_TYPE|REQUIREMENT_ID> <FILE>\n{USAGE}");
                };
                Ok(Self::Validate {
                    exam_type,
                    year,
                    target: target.clone(),
                    file: PathBuf::from(file),
                })
            }
            "name" => {
                let (exam_type, year) = parse_exam(rest)?;
                if rest.len() < 5 {
                    bail!("name takes <EXAM> <YEAR> <DOC_TYPE> <ROLL_NO> <CANDIDATE NAME...>\n{USAGE}");
                }
                Ok(Self::Name {
                    exam_type,
                    year,
                    document_type: rest[2].parse()?,
                    roll_number: rest[3].clone(),
                    candidate_name: rest[4..].join(" "),
                })
            }
            "session" => match rest.first().map(String::as_str) {
                None => Ok(Self::Session(SessionAction::Show)),
                Some("theme") => Ok(Self::Session(SessionAction::ToggleTheme)),
                Some("sign-out") => Ok(Self::Session(SessionAction::SignOut)),
                Some(other) => bail!("unknown session action '{other}'\n{USAGE}"),
            },
            other => bail!("unknown command '{other}'\n{USAGE}"),
        }
    }
}

/// Bundled rule sets plus any from `APPLYSMART_CATALOG_PATH`.
pub fn load_catalog(config: &CliConfig) -> anyhow::Result<RuleCatalog> {
    let mut catalog = RuleCatalog::builtin().context("bundled rule catalog is invalid")?;
    if let Some(path) = &config.catalog_path {
        let extra = RuleCatalog::from_path(path)
            .with_context(|| format!("failed to load rule catalog {}", path.display()))?;
        catalog.extend(extra);
    }
    Ok(catalog)
}

/// Run `command` and return its JSON output.
pub async fn execute(command: Command, config: &CliConfig) -> anyhow::Result<Value> {
    let catalog = load_catalog(config)?;

    match command {
        Command::List => {
            let rule_sets: Vec<Value> = catalog
                .rule_sets()
                .map(|rule_set| {
                    json!({
                        "key": rule_set.key(),
                        "version": rule_set.version,
                        "lastUpdated": rule_set.last_updated,
                        "requirements": rule_set.requirements.len(),
                    })
                })
                .collect();
            Ok(json!({ "ruleSets": rule_sets }))
        }

        Command::Rules { exam_type, year } => {
            let upload = UploadSession::start(&catalog, exam_type, year)?;
            update_session(config, |s| s.select_exam(exam_type, year))?;
            Ok(serde_json::to_value(upload.rule_set())?)
        }

        Command::Validate {
            exam_type,
            year,
            target,
            file,
        } => validate(&catalog, config, exam_type, year, &target, &file).await,

        Command::Name {
            exam_type,
            year,
            document_type,
            roll_number,
            candidate_name,
        } => {
            let upload = UploadSession::start(&catalog, exam_type, year)?;
            let ctx = NamingContext {
                exam_type,
                document_type,
                roll_number,
                year,
                candidate_name,
            };
            let name = render_document_name(&upload.rule_set().document_naming.pattern, &ctx)?;
            Ok(json!({ "fileName": name }))
        }

        Command::Session(action) => {
            let Some(path) = &config.session_path else {
                bail!("APPLYSMART_SESSION_PATH is not set");
            };
            let mut session = AppSession::load(path)?;
            match action {
                SessionAction::Show => {}
                SessionAction::ToggleTheme => {
                    session.toggle_theme();
                    session.save(path)?;
                }
                SessionAction::SignOut => {
                    session.sign_out();
                    session.save(path)?;
                }
            }
            Ok(serde_json::to_value(&session)?)
        }
    }
}

/// Resolve `target` to exactly one requirement: by id, or by document
/// type when only one requirement has that type.
fn resolve_target<'a>(upload: &'a UploadSession, target: &str) -> anyhow::Result<&'a Requirement> {
    if let Ok(requirement) = upload.requirement(target) {
        return Ok(requirement);
    }
    let document_type: DocumentType = target.parse().map_err(|_| {
        anyhow!(
            "'{target}' is neither a document type nor a requirement of {}",
            upload.rule_set().key()
        )
    })?;
    Ok(upload.requirement_for(document_type)?)
}

async fn validate(
    catalog: &RuleCatalog,
    config: &CliConfig,
    exam_type: ExamType,
    year: u16,
    target: &str,
    path: &Path,
) -> anyhow::Result<Value> {
    let mut upload = UploadSession::start(catalog, exam_type, year)?;
    let requirement = resolve_target(&upload, target)?;
    let (requirement_id, document_type, rules) = (
        requirement.id.clone(),
        requirement.document_type,
        requirement.rules.clone(),
    );
    let file = UploadedFile::from_path(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let engine = ValidationEngine::new(config.analyzers.analyzers(), config.engine.clone());
    let validation = engine.validate(&file, document_type, &rules).await?;

    let mut corrected_path = None;
    if config.write_corrected && !validation.auto_corrections.is_empty() {
        let corrected = engine
            .generate_corrected_file(&file, &validation.auto_corrections)
            .await;
        let out = path.with_file_name(&corrected.name);
        std::fs::write(&out, &corrected.bytes)
            .with_context(|| format!("failed to write {}", out.display()))?;
        tracing::info!(path = %out.display(), "Corrected copy written");
        corrected_path = Some(out);
    }

    upload.record(&requirement_id, validation.clone())?;
    update_session(config, |s| s.select_exam(exam_type, year))?;

    let summary = ComplianceSummary::from_validations([&validation]);
    Ok(json!({
        "ruleSet": upload.rule_set().key(),
        "requirement": requirement_id,
        "validation": validation,
        "risk": RiskLevel::from_compliance(validation.compliance_score),
        "summary": summary,
        "correctedFile": corrected_path,
    }))
}

/// Apply `change` to the persisted session when a session path is set.
fn update_session(config: &CliConfig, change: impl FnOnce(&mut AppSession)) -> anyhow::Result<()> {
    let Some(path) = &config.session_path else {
        return Ok(());
    };
    let mut session = AppSession::load(path)?;
    change(&mut session);
    session.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn parses_validate() {
        let cmd = Command::parse(&args("validate nda 2026 photo ./p.jpg")).unwrap();
        assert_eq!(
            cmd,
            Command::Validate {
                exam_type: ExamType::Nda,
                year: 2026,
                target: "photo".to_string(),
                file: PathBuf::from("./p.jpg"),
            }
        );
    }

    #[test]
    fn parses_name_with_spaces() {
        let cmd = Command::parse(&args("name NDA 2026 signature AB123456 Rahul Sharma")).unwrap();
        assert_matches_name(cmd, "Rahul Sharma");
    }

    fn assert_matches_name(cmd: Command, expected: &str) {
        match cmd {
            Command::Name { candidate_name, .. } => assert_eq!(candidate_name, expected),
            other => panic!("expected name command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Command::parse(&[]).is_err());
        assert!(Command::parse(&args("frobnicate")).is_err());
        assert!(Command::parse(&args("rules NDA")).is_err());
        assert!(Command::parse(&args("rules CAT 2026")).is_err());
        assert!(Command::parse(&args("rules NDA twenty")).is_err());
        assert!(Command::parse(&args("validate NDA 2026 photo")).is_err());
        assert!(Command::parse(&args("session reset")).is_err());
    }

    #[test]
    fn parses_session_actions() {
        assert_eq!(
            Command::parse(&args("session")).unwrap(),
            Command::Session(SessionAction::Show)
        );
        assert_eq!(
            Command::parse(&args("session theme")).unwrap(),
            Command::Session(SessionAction::ToggleTheme)
        );
    }
}
