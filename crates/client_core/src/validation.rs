//! Client-side form checks, run before any request is issued.

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Email,
    Username,
    Password,
    Name,
    Description,
    Price,
    CleaningType,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::Password => "password",
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::CleaningType => "cleaning_type",
        }
    }

    pub fn validator(self) -> fn(&str) -> bool {
        match self {
            Self::Email => validate_email,
            Self::Username => validate_username,
            Self::Password => validate_password,
            Self::Name | Self::Description | Self::Price | Self::CleaningType => always_valid,
        }
    }

    pub fn is_valid(self, value: &str) -> bool {
        (self.validator())(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid form fields: {}", .fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", "))]
pub struct ClientValidationError {
    pub fields: Vec<FormField>,
}

/// Very loose on purpose: the server does the real check.
pub fn validate_email(text: &str) -> bool {
    text.contains('@')
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

pub fn validate_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn always_valid(_: &str) -> bool {
    true
}

pub fn validate_form(fields: &[(FormField, &str)]) -> Result<(), ClientValidationError> {
    let invalid: Vec<FormField> = fields
        .iter()
        .filter(|(field, value)| !field.is_valid(value))
        .map(|(field, _)| *field)
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ClientValidationError { fields: invalid })
    }
}
