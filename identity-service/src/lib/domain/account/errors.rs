use std::fmt;

use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username is required")]
    Empty,

    #[error("Username must be at least {min} characters long, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Error for raw password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password is required")]
    Empty,

    #[error("Password must be at least {min} characters long")]
    TooShort { min: usize },
}

/// Unique account attribute named by a registration conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Email,
    Username,
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountField::Email => f.write_str("email"),
            AccountField::Username => f.write_str("username"),
        }
    }
}

/// How an error is presented outside the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountErrorKind {
    /// Malformed input, correctable by the caller
    Validation,
    /// Registration conflict
    Duplicate,
    /// Unknown account or wrong password, never told apart
    Authentication,
    /// Account exists but is deactivated
    Inactive,
    /// Anything the caller cannot act on
    Unexpected,
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("{0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    // Domain-level errors
    #[error("Account with {field} '{value}' already exists")]
    DuplicateAccount { field: AccountField, value: String },

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    Inactive,

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AccountError {
    pub fn kind(&self) -> AccountErrorKind {
        match self {
            AccountError::InvalidEmail(_)
            | AccountError::InvalidUsername(_)
            | AccountError::InvalidPassword(_) => AccountErrorKind::Validation,
            AccountError::DuplicateAccount { .. } => AccountErrorKind::Duplicate,
            AccountError::NotFound(_) | AccountError::InvalidCredentials => {
                AccountErrorKind::Authentication
            }
            AccountError::Inactive => AccountErrorKind::Inactive,
            AccountError::Hashing(_)
            | AccountError::Token(_)
            | AccountError::DatabaseError(_)
            | AccountError::Unknown(_) => AccountErrorKind::Unexpected,
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Unknown accounts and wrong passwords share one message. Unexpected
    /// failures never expose their details.
    pub fn public_message(&self) -> String {
        match self.kind() {
            AccountErrorKind::Validation
            | AccountErrorKind::Duplicate
            | AccountErrorKind::Inactive => self.to_string(),
            AccountErrorKind::Authentication => AccountError::InvalidCredentials.to_string(),
            AccountErrorKind::Unexpected => "Something went wrong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_invalid_credentials_look_identical() {
        let not_found = AccountError::NotFound("ghost@example.com".to_string());
        let wrong_password = AccountError::InvalidCredentials;

        assert_eq!(not_found.kind(), wrong_password.kind());
        assert_eq!(not_found.public_message(), wrong_password.public_message());
        assert_eq!(not_found.public_message(), "Invalid email or password");
    }

    #[test]
    fn test_inactive_has_distinct_message() {
        let inactive = AccountError::Inactive;
        assert_eq!(inactive.kind(), AccountErrorKind::Inactive);
        assert_ne!(
            inactive.public_message(),
            AccountError::InvalidCredentials.public_message()
        );
    }

    #[test]
    fn test_duplicate_names_field() {
        let err = AccountError::DuplicateAccount {
            field: AccountField::Email,
            value: "a@x.com".to_string(),
        };
        assert_eq!(err.public_message(), "Account with email 'a@x.com' already exists");
    }

    #[test]
    fn test_validation_is_field_specific() {
        let err: AccountError = PasswordPolicyError::TooShort { min: 6 }.into();
        assert_eq!(err.kind(), AccountErrorKind::Validation);
        assert_eq!(err.public_message(), "Password must be at least 6 characters long");
    }

    #[test]
    fn test_unexpected_hides_details() {
        let err = AccountError::DatabaseError("connection refused to 10.0.0.3".to_string());
        assert_eq!(err.kind(), AccountErrorKind::Unexpected);
        assert_eq!(err.public_message(), "Something went wrong");
    }
}
