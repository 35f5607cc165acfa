use thiserror::Error;

use crate::{email_address::EmailAddress, macros::nutype_string};

/// A contact form submission that passed validation.
///
/// Can only be obtained through [`ContactMessage::validate`] or by assembling
/// already validated field types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub name: ContactMessageAuthorName,
    pub email: EmailAddress,
}

nutype_string!(ContactMessageAuthorName(validate(
    len_char_min = 2,
    len_char_max = 100
)));

nutype_string!(ContactMessageSubject(validate(
    len_char_min = 5,
    len_char_max = 200
)));

nutype_string!(ContactMessageContent(validate(
    len_char_min = 10,
    len_char_max = 2000
)));

impl ContactMessageAuthorName {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 100;
}

impl ContactMessageSubject {
    pub const MIN_LEN: usize = 5;
    pub const MAX_LEN: usize = 200;
}

impl ContactMessageContent {
    pub const MIN_LEN: usize = 10;
    pub const MAX_LEN: usize = 2000;
}

/// Raw contact form fields as received at the boundary.
///
/// A field is `None` if it was absent or not a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Subject => "Subject",
            Self::Message => "Message",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactFieldError {
    #[error("{0} is required")]
    Missing(ContactField),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: ContactField, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: ContactField, max: usize },
    #[error("Invalid email address")]
    InvalidEmail,
}

impl ContactFieldError {
    pub fn field(&self) -> ContactField {
        match *self {
            Self::Missing(field) | Self::TooShort { field, .. } | Self::TooLong { field, .. } => {
                field
            }
            Self::InvalidEmail => ContactField::Email,
        }
    }
}

/// Every field violation of a rejected submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid contact form data ({} violations)", .errors.len())]
pub struct ContactValidationError {
    pub errors: Vec<ContactFieldError>,
}

impl ContactValidationError {
    pub fn fields(&self) -> impl Iterator<Item = ContactField> + '_ {
        self.errors.iter().map(ContactFieldError::field)
    }
}

impl ContactMessage {
    /// Checks all fields of `input` and either builds a [`ContactMessage`] or
    /// reports every violated constraint at once.
    ///
    /// Values are taken as given, surrounding whitespace counts towards the
    /// length limits.
    pub fn validate(input: ContactFormInput) -> Result<Self, ContactValidationError> {
        let name = validate_name(input.name);
        let email = validate_email(input.email);
        let subject = validate_subject(input.subject);
        let content = validate_content(input.message);

        match (name, email, subject, content) {
            (Ok(name), Ok(email), Ok(subject), Ok(content)) => Ok(Self {
                author: ContactMessageAuthor { name, email },
                subject,
                content,
            }),
            (name, email, subject, content) => Err(ContactValidationError {
                errors: [name.err(), email.err(), subject.err(), content.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            }),
        }
    }
}

/// Defines a validator turning an optional raw value into a length bounded
/// field type.
macro_rules! len_validator {
    ($fn:ident: $ty:ident, $err:ident, $field:expr) => {
        fn $fn(value: Option<String>) -> Result<$ty, ContactFieldError> {
            let field = $field;
            let value = value.ok_or(ContactFieldError::Missing(field))?;
            $ty::try_new(value).map_err(|err| match err {
                $err::LenCharMinViolated => ContactFieldError::TooShort {
                    field,
                    min: $ty::MIN_LEN,
                },
                $err::LenCharMaxViolated => ContactFieldError::TooLong {
                    field,
                    max: $ty::MAX_LEN,
                },
            })
        }
    };
}

len_validator!(
    validate_name: ContactMessageAuthorName,
    ContactMessageAuthorNameError,
    ContactField::Name
);
len_validator!(
    validate_subject: ContactMessageSubject,
    ContactMessageSubjectError,
    ContactField::Subject
);
len_validator!(
    validate_content: ContactMessageContent,
    ContactMessageContentError,
    ContactField::Message
);

fn validate_email(value: Option<String>) -> Result<EmailAddress, ContactFieldError> {
    value
        .ok_or(ContactFieldError::Missing(ContactField::Email))?
        .parse()
        .map_err(|_| ContactFieldError::InvalidEmail)
}
