use thiserror::Error;

use super::rut::RutError;
use super::types::DocumentType;

/// Errors that can occur while validating, numbering or rendering a DTE.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DteError {
    /// A RUT failed to parse or its check digit is wrong.
    #[error(transparent)]
    Rut(#[from] RutError),

    /// One or more validation rules failed.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Declared totals disagree with the totals computed from the detail lines.
    #[error("totals mismatch on {field}: computed {computed}, declared {declared}")]
    TotalsMismatch {
        field: &'static str,
        computed: i64,
        declared: i64,
    },

    /// A computed peso amount does not fit the 18-digit SII amount fields.
    #[error("amount out of range on {field}")]
    AmountOutOfRange { field: String },

    /// Every loaded CAF range for this document type has been used up.
    #[error("no folios left for document type {document_type}; load a new CAF")]
    FoliosExhausted { document_type: DocumentType },

    /// No CAF has ever been loaded for this document type.
    #[error("no CAF loaded for document type {document_type}")]
    CafNotLoaded { document_type: DocumentType },

    /// A CAF range overlaps a range already loaded for the same document type.
    #[error(
        "CAF range {incoming_start}-{incoming_end} for document type {document_type} \
         overlaps loaded range {existing_start}-{existing_end}"
    )]
    RangeOverlap {
        document_type: DocumentType,
        existing_start: u64,
        existing_end: u64,
        incoming_start: u64,
        incoming_end: u64,
    },

    /// Malformed or unsupported authorization file.
    #[error("CAF error: {0}")]
    Caf(String),

    /// Engine configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DteError {
    /// Validation errors carried by this error, if it is a validation failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// One broken field rule.
///
/// `field` is the path into the [`Document`](super::Document) model, such as
/// `lines[2].unit_price` or `receiver.address.commune`. `rule` names the SII
/// element the limit comes from, so a rejection can be traced to the
/// `DTE` schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// SII element, e.g. `RznSoc` or `MontoItem`.
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rule {
            Some(element) => write!(f, "[{element}] {}: {}", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

impl ValidationError {
    /// A rule with no single SII element behind it, such as a missing line.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// A rule enforced by SII element `element`.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(element.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let plain = ValidationError::new("lines", "at least one detail line is required");
        assert_eq!(plain.to_string(), "lines: at least one detail line is required");

        let ruled = ValidationError::with_rule("issuer.legal_name", "too long", "RznSoc");
        assert_eq!(ruled.to_string(), "[RznSoc] issuer.legal_name: too long");
    }

    #[test]
    fn validation_variant_joins_messages() {
        let err = DteError::Validation(vec![
            ValidationError::new("a", "first"),
            ValidationError::new("b", "second"),
        ]);
        assert_eq!(err.to_string(), "validation failed: a: first; b: second");
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn out_of_range_names_field() {
        let err = DteError::AmountOutOfRange {
            field: "lines[0].amount".into(),
        };
        assert_eq!(err.to_string(), "amount out of range on lines[0].amount");
    }

    #[test]
    fn exhausted_names_document_type() {
        let err = DteError::FoliosExhausted {
            document_type: DocumentType::DispatchGuide,
        };
        assert!(err.to_string().contains("52"));
    }
}
