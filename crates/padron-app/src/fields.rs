//! Per-field constraint validation.
//!
//! Replaces browser constraint-validation: each text field has a
//! required/pattern/length rule set, and every failure maps to the fixed
//! user-facing message the form always showed.

use regex::Regex;
use std::sync::OnceLock;

/// The fields of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    LastName,
    FirstName,
    DocumentId,
    Phone,
    Unit,
    Reference,
    LeaseStart,
    LeaseEnd,
}

impl FieldId {
    /// The four personal fields that gate "add another".
    pub const PERSONAL: [FieldId; 4] = [
        FieldId::LastName,
        FieldId::FirstName,
        FieldId::DocumentId,
        FieldId::Phone,
    ];

    /// Property-level fields whose values survive a full reset.
    pub const PROPERTY: [FieldId; 4] = [
        FieldId::Unit,
        FieldId::Reference,
        FieldId::LeaseStart,
        FieldId::LeaseEnd,
    ];

    pub const ALL: [FieldId; 8] = [
        FieldId::LastName,
        FieldId::FirstName,
        FieldId::DocumentId,
        FieldId::Phone,
        FieldId::Unit,
        FieldId::Reference,
        FieldId::LeaseStart,
        FieldId::LeaseEnd,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FieldId::LastName => "Apellido",
            FieldId::FirstName => "Nombre",
            FieldId::DocumentId => "Documento",
            FieldId::Phone => "Teléfono",
            FieldId::Unit => "Unidad funcional",
            FieldId::Reference => "Referencia",
            FieldId::LeaseStart => "Fecha de alta",
            FieldId::LeaseEnd => "Fecha de fin",
        }
    }
}

/// A field constraint failure. `Display` is the inline error text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Este campo es requerido")]
    Missing,
    #[error("Formato inválido")]
    Pattern,
    #[error("Mínimo {0} caracteres")]
    TooShort(usize),
    #[error("Máximo {0} caracteres")]
    TooLong(usize),
}

/// Length and pattern rules for a text field.
pub struct TextRules {
    pub min_len: usize,
    pub max_len: usize,
    pub pattern: Option<&'static Regex>,
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\p{L}][\p{L} '\-]*$").expect("name pattern"))
}

fn document_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{6,10}$").expect("document pattern"))
}

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]{4,18}[0-9]$").expect("phone pattern"))
}

/// Rules for the text fields. Selects and dates are validated structurally
/// by the draft, not here.
pub fn rules(id: FieldId) -> Option<TextRules> {
    match id {
        FieldId::LastName | FieldId::FirstName => Some(TextRules {
            min_len: 2,
            max_len: 50,
            pattern: Some(name_pattern()),
        }),
        FieldId::DocumentId => Some(TextRules {
            min_len: 6,
            max_len: 10,
            pattern: Some(document_pattern()),
        }),
        FieldId::Phone => Some(TextRules {
            min_len: 6,
            max_len: 20,
            pattern: Some(phone_pattern()),
        }),
        FieldId::Unit => Some(TextRules {
            min_len: 1,
            max_len: 10,
            pattern: None,
        }),
        FieldId::Reference | FieldId::LeaseStart | FieldId::LeaseEnd => None,
    }
}

/// Validate a text field value against its rules.
///
/// Check order mirrors the browser's validity states: missing, then
/// pattern mismatch, then length.
pub fn validate_text(id: FieldId, value: &str) -> Result<(), FieldError> {
    let Some(rules) = rules(id) else {
        return Ok(());
    };

    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Missing);
    }
    if let Some(pattern) = rules.pattern {
        if !pattern.is_match(value) {
            return Err(FieldError::Pattern);
        }
    }
    if value.chars().count() < rules.min_len {
        return Err(FieldError::TooShort(rules.min_len));
    }
    if value.chars().count() > rules.max_len {
        return Err(FieldError::TooLong(rules.max_len));
    }
    Ok(())
}
