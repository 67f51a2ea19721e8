//! Data models for the lead-capture form

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Dialing prefixes offered by the phone field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CountryCode {
    #[default]
    #[serde(rename = "+1")]
    UsCanada,
    #[serde(rename = "+91")]
    India,
    #[serde(rename = "+44")]
    UnitedKingdom,
    #[serde(rename = "+61")]
    Australia,
    #[serde(rename = "+81")]
    Japan,
}

impl CountryCode {
    /// Options in display order
    pub const ALL: [CountryCode; 5] = [
        CountryCode::UsCanada,
        CountryCode::India,
        CountryCode::UnitedKingdom,
        CountryCode::Australia,
        CountryCode::Japan,
    ];

    /// Prefix as shown in the select and sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CountryCode::UsCanada => "+1",
            CountryCode::India => "+91",
            CountryCode::UnitedKingdom => "+44",
            CountryCode::Australia => "+61",
            CountryCode::Japan => "+81",
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountryCode {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CountryCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s.trim())
            .ok_or_else(|| FieldError::UnknownCountryCode(s.to_string()))
    }
}

/// Identifies a form field, used for validation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    Name,
    Email,
    Company,
    CountryCode,
    Phone,
    Message,
    AgreedToTerms,
}

impl FieldId {
    /// Name of the HTML input backing this field
    pub fn input_name(&self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::Email => "email",
            FieldId::Company => "company",
            FieldId::CountryCode => "countryCode",
            FieldId::Phone => "phone",
            FieldId::Message => "message",
            FieldId::AgreedToTerms => "agreedToTerms",
        }
    }

    /// Inverse of `input_name`
    pub fn from_input_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(FieldId::Name),
            "email" => Some(FieldId::Email),
            "company" => Some(FieldId::Company),
            "countryCode" => Some(FieldId::CountryCode),
            "phone" => Some(FieldId::Phone),
            "message" => Some(FieldId::Message),
            "agreedToTerms" => Some(FieldId::AgreedToTerms),
            _ => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldId::Name => "name",
            FieldId::Email => "email",
            FieldId::Company => "company",
            FieldId::CountryCode => "country code",
            FieldId::Phone => "phone",
            FieldId::Message => "message",
            FieldId::AgreedToTerms => "terms agreement",
        };
        f.write_str(label)
    }
}

/// Rejected input change
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown form field '{0}'")]
    UnknownField(String),

    #[error("unsupported country code '{0}'")]
    UnknownCountryCode(String),

    #[error("'{0}' is not a checkbox value")]
    NotABoolean(String),

    #[error("form surface has been destroyed")]
    SurfaceDestroyed,
}

/// Campaign attribution captured from the page query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    /// `utm_source`
    pub source: String,
    /// `utm_medium`
    pub medium: String,
    /// `utm_campaign`
    pub campaign: String,
    /// `utm_term`
    pub term: String,
    /// `utm_content`
    pub content: String,
}

/// Values held by one form surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFormState {
    /// Contact name (required)
    pub name: String,
    /// Contact email (required)
    pub email: String,
    /// Practice name (optional)
    pub company: String,
    /// Dialing prefix, defaults to +1
    pub country_code: CountryCode,
    /// Number as typed, without the prefix (required)
    pub phone: String,
    /// Free text, at least 10 characters when given
    pub message: String,
    /// Terms & Conditions checkbox (must be ticked)
    pub agreed_to_terms: bool,
    utm: UtmParams,
}

impl LeadFormState {
    /// Empty form with the default country code
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribution captured when the surface opened
    pub fn utm(&self) -> &UtmParams {
        &self.utm
    }

    /// Replace attribution values; only UTM capture calls this
    pub(crate) fn set_utm(&mut self, utm: UtmParams) {
        self.utm = utm;
    }

    /// Apply a raw input change keyed by the input's name
    pub fn set_field(&mut self, input_name: &str, value: &str) -> Result<(), FieldError> {
        let field = FieldId::from_input_name(input_name)
            .ok_or_else(|| FieldError::UnknownField(input_name.to_string()))?;

        match field {
            FieldId::Name => self.name = value.to_string(),
            FieldId::Email => self.email = value.to_string(),
            FieldId::Company => self.company = value.to_string(),
            FieldId::CountryCode => self.country_code = value.parse()?,
            FieldId::Phone => self.phone = value.to_string(),
            FieldId::Message => self.message = value.to_string(),
            FieldId::AgreedToTerms => {
                self.agreed_to_terms = match value {
                    "true" | "on" | "1" => true,
                    "false" | "off" | "0" | "" => false,
                    other => return Err(FieldError::NotABoolean(other.to_string())),
                }
            }
        }
        Ok(())
    }

    /// Build the wire snapshot for one submission attempt
    pub fn to_payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            company: self.company.clone(),
            country_code: self.country_code,
            phone: format!("{} {}", self.country_code, self.phone),
            message: self.message.clone(),
            agree_to_terms: self.agreed_to_terms,
            utm_source: self.utm.source.clone(),
            utm_medium: self.utm.medium.clone(),
            utm_campaign: self.utm.campaign.clone(),
            utm_term: self.utm.term.clone(),
            utm_content: self.utm.content.clone(),
        }
    }
}

/// JSON body posted to the lead webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub company: String,
    #[serde(rename = "countryCode")]
    pub country_code: CountryCode,
    /// Prefix, a space, then the number as typed
    pub phone: String,
    pub message: String,
    #[serde(rename = "agreeToTerms")]
    pub agree_to_terms: bool,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub utm_term: String,
    pub utm_content: String,
}

/// Status shown by the submit control
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    /// Nothing sent yet, or a fresh attempt is starting
    #[default]
    Idle,
    /// Request outstanding; the submit control is disabled
    Submitting,
    /// Webhook accepted the lead
    Success,
    /// Human-readable reason, validation or delivery
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> LeadFormState {
        let mut state = LeadFormState::new();
        state.name = "Jane Doe".into();
        state.email = "jane@example.com".into();
        state.phone = "5551234567".into();
        state.agreed_to_terms = true;
        state
    }

    #[test]
    fn test_defaults() {
        let state = LeadFormState::new();
        assert_eq!(state.country_code, CountryCode::UsCanada);
        assert!(!state.agreed_to_terms);
        assert!(state.name.is_empty());
        assert_eq!(state.utm(), &UtmParams::default());
    }

    #[test]
    fn test_payload_joins_phone_and_renames_terms() {
        let mut state = filled();
        state.country_code = CountryCode::India;
        state.phone = "98765 43210".into();

        let payload = state.to_payload();
        assert_eq!(payload.phone, "+91 98765 43210");
        assert_eq!(payload.agree_to_terms, state.agreed_to_terms);
        assert_eq!(payload.company, "");
        assert_eq!(payload.message, "");
    }

    #[test]
    fn test_payload_wire_keys() {
        let mut state = filled();
        state.set_utm(UtmParams {
            source: "google".into(),
            campaign: "spring".into(),
            ..Default::default()
        });

        let json = serde_json::to_value(state.to_payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "company": "",
                "countryCode": "+1",
                "phone": "+1 5551234567",
                "message": "",
                "agreeToTerms": true,
                "utm_source": "google",
                "utm_medium": "",
                "utm_campaign": "spring",
                "utm_term": "",
                "utm_content": ""
            })
        );
    }

    #[test]
    fn test_set_field_by_input_name() {
        let mut state = LeadFormState::new();
        state.set_field("name", "Dr. Smile").unwrap();
        state.set_field("countryCode", "+44").unwrap();
        state.set_field("agreedToTerms", "on").unwrap();

        assert_eq!(state.name, "Dr. Smile");
        assert_eq!(state.country_code, CountryCode::UnitedKingdom);
        assert!(state.agreed_to_terms);
    }

    #[test]
    fn test_set_field_rejects_bad_input() {
        let mut state = LeadFormState::new();
        assert_eq!(
            state.set_field("utm_source", "spoofed"),
            Err(FieldError::UnknownField("utm_source".into()))
        );
        assert_eq!(
            state.set_field("countryCode", "+33"),
            Err(FieldError::UnknownCountryCode("+33".into()))
        );
        assert_eq!(
            state.set_field("agreedToTerms", "maybe"),
            Err(FieldError::NotABoolean("maybe".into()))
        );
        assert_eq!(state, LeadFormState::new());
    }
}
