use forge_models::contact::{ContactFieldError, ContactFormInput, ContactValidationError};
use serde::Serialize;
use serde_json::Value;

/// Pulls the contact form fields out of an arbitrary json value.
///
/// Fields that are missing or not strings are left empty, the validator
/// reports them.
pub fn parse_contact_form(mut value: Value) -> ContactFormInput {
    let mut take = |key: &str| match value.get_mut(key).map(Value::take) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };

    ContactFormInput {
        name: take("name"),
        email: take("email"),
        subject: take("subject"),
        message: take("message"),
    }
}

#[derive(Debug, Serialize)]
pub struct ApiContactResponse {
    pub success: bool,
    pub message: &'static str,
}

impl ApiContactResponse {
    pub const SENT: Self = Self {
        success: true,
        message: "Email sent successfully",
    };
}

#[derive(Debug, Serialize)]
pub struct ApiValidationError {
    pub detail: &'static str,
    pub errors: Vec<ApiFieldError>,
}

#[derive(Debug, Serialize)]
pub struct ApiFieldError {
    pub field: &'static str,
    pub reason: String,
}

impl From<&ContactFieldError> for ApiFieldError {
    fn from(value: &ContactFieldError) -> Self {
        Self {
            field: value.field().as_str(),
            reason: value.to_string(),
        }
    }
}

impl ApiValidationError {
    pub fn new(detail: &'static str, err: &ContactValidationError) -> Self {
        Self {
            detail,
            errors: err.errors.iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_complete_form() {
        let input = parse_contact_form(json!({
            "name": "Jo",
            "email": "jo@x.com",
            "subject": "Hello there",
            "message": "1234567890",
            "extra": true,
        }));

        assert_eq!(
            input,
            ContactFormInput {
                name: Some("Jo".into()),
                email: Some("jo@x.com".into()),
                subject: Some("Hello there".into()),
                message: Some("1234567890".into()),
            }
        );
    }

    #[test]
    fn wrong_types_are_dropped() {
        let input = parse_contact_form(json!({
            "name": 42,
            "email": null,
            "subject": ["Hello there"],
        }));

        assert_eq!(input, ContactFormInput::default());
    }

    #[test]
    fn non_object_payload() {
        assert_eq!(parse_contact_form(json!("Jo")), ContactFormInput::default());
        assert_eq!(parse_contact_form(json!([1, 2])), ContactFormInput::default());
    }
}
