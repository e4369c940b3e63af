//! Document file naming convention engine.
//!
//! Exam notices prescribe upload file names such as
//! `{EXAM}_{TYPE}_{ROLLNO}_{YYYY}_{CANDIDATE_NAME}.jpg`. Placeholders are
//! replaced with sanitized values: uppercased, spaces become `_`, anything
//! else that is not ASCII alphanumeric is dropped.
//!
//! ```
//! use applysmart_core::naming::{render_document_name, NamingContext};
//! use applysmart_core::rules::{DocumentType, ExamType};
//!
//! let ctx = NamingContext {
//!     exam_type: ExamType::Nda,
//!     document_type: DocumentType::Photo,
//!     roll_number: "ab123456".into(),
//!     year: 2026,
//!     candidate_name: "Rahul Sharma".into(),
//! };
//! assert_eq!(
//!     render_document_name("{EXAM}_{TYPE}_{ROLLNO}_{YYYY}_{CANDIDATE_NAME}.jpg", &ctx).unwrap(),
//!     "NDA_PHOTO_AB123456_2026_RAHUL_SHARMA.jpg",
//! );
//! ```

use crate::error::CoreError;
use crate::rules::{DocumentType, ExamType};

/// Values available to a naming pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub exam_type: ExamType,
    pub document_type: DocumentType,
    pub roll_number: String,
    pub year: u16,
    pub candidate_name: String,
}

/// Uppercase, spaces to `_`, drop other non-alphanumerics.
pub fn sanitize_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_uppercase()),
            _ => None,
        })
        .collect()
}

fn placeholder_value(name: &str, ctx: &NamingContext) -> Result<String, CoreError> {
    let value = match name {
        "EXAM" => ctx.exam_type.as_str().to_string(),
        "TYPE" => ctx.document_type.as_str().to_ascii_uppercase(),
        "YYYY" => ctx.year.to_string(),
        "ROLLNO" => sanitize_component(&ctx.roll_number),
        "CANDIDATE_NAME" => sanitize_component(&ctx.candidate_name),
        other => {
            return Err(CoreError::Validation(format!(
                "Unknown naming placeholder '{{{other}}}'. Valid placeholders: \
                 {{EXAM}}, {{TYPE}}, {{ROLLNO}}, {{YYYY}}, {{CANDIDATE_NAME}}"
            )))
        }
    };

    if value.is_empty() {
        return Err(CoreError::Validation(format!(
            "Naming placeholder '{{{name}}}' has no value"
        )));
    }
    Ok(value)
}

/// Render `pattern` for `ctx`. Text outside placeholders is kept verbatim.
pub fn render_document_name(pattern: &str, ctx: &NamingContext) -> Result<String, CoreError> {
    let mut out = String::with_capacity(pattern.len() + 32);
    let mut rest = pattern;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            CoreError::Validation(format!("Unclosed placeholder in naming pattern '{pattern}'"))
        })?;
        out.push_str(&placeholder_value(&after[..end], ctx)?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ctx() -> NamingContext {
        NamingContext {
            exam_type: ExamType::Jee,
            document_type: DocumentType::Signature,
            roll_number: "123456789".to_string(),
            year: 2026,
            candidate_name: "  Priya  K. Nair ".to_string(),
        }
    }

    #[test]
    fn short_pattern() {
        assert_eq!(
            render_document_name("{ROLLNO}_{TYPE}.jpg", &ctx()).unwrap(),
            "123456789_SIGNATURE.jpg"
        );
    }

    #[test]
    fn candidate_name_is_sanitized() {
        assert_eq!(sanitize_component("  Priya  K. Nair "), "PRIYA__K_NAIR");
        assert_eq!(sanitize_component("O'Brien-Smith"), "OBRIENSMITH");
    }

    #[test]
    fn literal_text_is_kept() {
        assert_eq!(
            render_document_name("scan-{YYYY}.pdf", &ctx()).unwrap(),
            "scan-2026.pdf"
        );
        assert_eq!(render_document_name("plain.jpg", &ctx()).unwrap(), "plain.jpg");
    }

    #[test]
    fn unknown_placeholder_rejected() {
        let err = render_document_name("{DOB}_{TYPE}.jpg", &ctx()).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("{DOB}"));
    }

    #[test]
    fn unclosed_placeholder_rejected() {
        assert_matches!(
            render_document_name("{ROLLNO_{TYPE}.jpg", &ctx()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_value_rejected() {
        let mut ctx = ctx();
        ctx.roll_number = "--".to_string();
        assert_matches!(
            render_document_name("{ROLLNO}.jpg", &ctx),
            Err(CoreError::Validation(_))
        );
    }
}
