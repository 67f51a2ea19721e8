//! Field and whole-form validation rules

use crate::models::{FieldId, LeadFormState};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Minimum length of a non-empty message, in characters
pub const MIN_MESSAGE_CHARS: usize = 10;

/// Outcome of checking a whole form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    /// Every field that broke a rule
    Invalid(BTreeSet<FieldId>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn invalid_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        let fields = match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(fields) => Some(fields.iter().copied()),
        };
        fields.into_iter().flatten()
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.invalid_fields().any(|f| f == field)
    }

    /// Message shown next to the form when submission is refused
    pub fn message(&self) -> Option<String> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(fields) => {
                let list: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
                Some(format!("Please check the following fields: {}", list.join(", ")))
            }
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern is a valid regex")
    })
}

/// `local@domain`, both parts non-empty, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

/// Check every rule and report all violations together
pub fn validate(state: &LeadFormState) -> ValidationResult {
    let mut invalid = BTreeSet::new();

    if state.name.trim().is_empty() {
        invalid.insert(FieldId::Name);
    }
    if !is_valid_email(&state.email) {
        invalid.insert(FieldId::Email);
    }
    if state.phone.trim().is_empty() {
        invalid.insert(FieldId::Phone);
    }
    if !state.message.is_empty() && state.message.chars().count() < MIN_MESSAGE_CHARS {
        invalid.insert(FieldId::Message);
    }
    if !state.agreed_to_terms {
        invalid.insert(FieldId::AgreedToTerms);
    }

    if invalid.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed() -> LeadFormState {
        let mut state = LeadFormState::new();
        state.name = "Jane Doe".into();
        state.email = "jane@example.com".into();
        state.phone = "5551234567".into();
        state.agreed_to_terms = true;
        state
    }

    #[test]
    fn test_well_formed_is_valid() {
        assert_eq!(validate(&well_formed()), ValidationResult::Valid);
    }

    #[test]
    fn test_terms_required_regardless_of_other_fields() {
        let mut state = well_formed();
        state.agreed_to_terms = false;
        assert!(validate(&state).contains(FieldId::AgreedToTerms));

        let empty = LeadFormState::new();
        assert!(validate(&empty).contains(FieldId::AgreedToTerms));
    }

    #[test]
    fn test_reports_every_violation() {
        let result = validate(&LeadFormState::new());
        let fields: Vec<FieldId> = result.invalid_fields().collect();
        assert_eq!(
            fields,
            vec![
                FieldId::Name,
                FieldId::Email,
                FieldId::Phone,
                FieldId::AgreedToTerms
            ]
        );
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("a@b"));
        assert!(is_valid_email("office@smile.dental"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ja ne@example.com"));
    }

    #[test]
    fn test_message_optional_but_min_length() {
        let mut state = well_formed();
        state.message = "too short".into();
        assert_eq!(
            validate(&state),
            ValidationResult::Invalid(BTreeSet::from([FieldId::Message]))
        );

        state.message = "Need more patients".into();
        assert!(validate(&state).is_valid());
    }

    #[test]
    fn test_message_length_boundary_counts_chars() {
        let mut state = well_formed();
        state.message = "abcdefghij".into();
        assert!(validate(&state).is_valid());

        // 10 chars, 11 bytes
        state.message = "Zähne gut!".into();
        assert!(validate(&state).is_valid());

        // 9 chars, 10 bytes
        state.message = "Zähneputz".into();
        assert!(validate(&state).contains(FieldId::Message));
    }

    #[test]
    fn test_whitespace_only_name_rejected() {
        let mut state = well_formed();
        state.name = "   ".into();
        assert!(validate(&state).contains(FieldId::Name));
    }

    #[test]
    fn test_message_lists_fields() {
        let mut state = well_formed();
        state.email.clear();
        let msg = validate(&state).message().unwrap();
        assert!(msg.contains("email"));
        assert!(ValidationResult::Valid.message().is_none());
    }
}
