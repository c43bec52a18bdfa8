use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::UsernameError;

/// Role granted to every new account.
pub const DEFAULT_ROLE: &str = "User";

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validated with an RFC 5322 parser and stored lower-cased, so two
/// addresses differing only in case are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, normalized email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string, surrounding whitespace is ignored
    ///
    /// # Errors
    /// * `Empty` - Email is empty or whitespace
    /// * `InvalidFormat` - Email does not conform to RFC 5322, or carries
    ///   display text such as `Bob <bob@example.com>`
    pub fn new(email: String) -> Result<Self, EmailError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        let normalized = trimmed.to_lowercase();
        let parsed = email_address::EmailAddress::from_str(&normalized)
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))?;

        // The parser accepts a display name around the address.
        if parsed.email() != normalized {
            return Err(EmailError::InvalidFormat(
                "Display text is not allowed".to_string(),
            ));
        }

        Ok(EmailAddress(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// At least 3 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username is empty or whitespace
    /// * `TooShort` - Username shorter than 3 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(UsernameError::Empty);
        }

        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rules a raw password must satisfy before it is hashed.
pub struct PasswordPolicy;

impl PasswordPolicy {
    pub const MIN_LENGTH: usize = 6;

    /// Check a raw password against the policy.
    ///
    /// # Errors
    /// * `Empty` - Password is empty or whitespace
    /// * `TooShort` - Password shorter than 6 characters
    pub fn check(password: &str) -> Result<(), PasswordPolicyError> {
        if password.trim().is_empty() {
            return Err(PasswordPolicyError::Empty);
        }
        if password.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(())
    }
}

/// Account aggregate entity.
///
/// Fields are private; state changes go through the named mutators below.
#[derive(Clone)]
pub struct Account {
    id: AccountId,
    email: EmailAddress,
    username: Username,
    password_digest: String,
    first_name: Option<String>,
    last_name: Option<String>,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
    is_active: bool,
}

/// Stored form of an account, as read back by storage adapters.
#[derive(Clone)]
pub struct AccountRecord {
    pub id: AccountId,
    pub email: EmailAddress,
    pub username: Username,
    pub password_digest: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Account {
    /// Build a brand new account: fresh id, default role, active.
    pub(super) fn new(
        email: EmailAddress,
        username: Username,
        password_digest: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            email,
            username,
            password_digest,
            first_name,
            last_name,
            roles: vec![DEFAULT_ROLE.to_string()],
            created_at: Utc::now(),
            last_login_at: None,
            is_active: true,
        }
    }

    /// Rebuild an account from its stored form.
    ///
    /// Duplicate roles in the record are dropped, keeping first occurrence.
    pub fn restore(record: AccountRecord) -> Self {
        let mut roles: Vec<String> = Vec::with_capacity(record.roles.len());
        for role in record.roles {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        Self {
            id: record.id,
            email: record.email,
            username: record.username,
            password_digest: record.password_digest,
            first_name: record.first_name,
            last_name: record.last_name,
            roles,
            created_at: record.created_at,
            last_login_at: record.last_login_at,
            is_active: record.is_active,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password_digest(&self) -> &str {
        &self.password_digest
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Stamp a successful login.
    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    /// Grant a role. Returns `false` if the account already holds it.
    pub fn add_role(&mut self, role: impl Into<String>) -> bool {
        let role = role.into();
        if self.roles.contains(&role) {
            return false;
        }
        self.roles.push(role);
        true
    }

    /// Revoke a role. Returns `false` if the account did not hold it.
    pub fn remove_role(&mut self, role: &str) -> bool {
        let before = self.roles.len();
        self.roles.retain(|r| r != role);
        self.roles.len() != before
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn update_profile(&mut self, first_name: Option<String>, last_name: Option<String>) {
        self.first_name = first_name;
        self.last_name = last_name;
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_digest", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("roles", &self.roles)
            .field("created_at", &self.created_at)
            .field("last_login_at", &self.last_login_at)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Read-only projection of an account returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.0,
            email: account.email.as_str().to_string(),
            username: account.username.as_str().to_string(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            roles: account.roles.clone(),
            created_at: account.created_at,
            last_login_at: account.last_login_at,
        }
    }
}

/// Outcome of a successful register or login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: AccountView,
}

/// Command to register a new account.
///
/// Fields are raw; the service validates them in a fixed order.
#[derive(Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterCommand {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }
}

impl fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            EmailAddress::new("alice@example.com".to_string()).unwrap(),
            Username::new("alice".to_string()).unwrap(),
            "c2VjcmV0LWRpZ2VzdA==".to_string(),
            Some("Alice".to_string()),
            None,
        )
    }

    #[test]
    fn test_email_normalized() {
        let email = EmailAddress::new("  Alice@Example.COM ".to_string()).unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(
            email,
            EmailAddress::new("alice@example.com".to_string()).unwrap()
        );
    }

    #[test]
    fn test_email_invalid() {
        assert_eq!(EmailAddress::new("   ".to_string()), Err(EmailError::Empty));
        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_email_rejects_display_text() {
        assert!(matches!(
            EmailAddress::new("Bob <alice@example.com>".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
        assert!(matches!(
            EmailAddress::new("<alice@example.com>".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_username_length() {
        assert_eq!(Username::new("".to_string()), Err(UsernameError::Empty));
        assert_eq!(
            Username::new("ab".to_string()),
            Err(UsernameError::TooShort { min: 3, actual: 2 })
        );
        assert!(Username::new("abc".to_string()).is_ok());
        // counted in characters, not bytes
        assert_eq!(
            Username::new("éé".to_string()),
            Err(UsernameError::TooShort { min: 3, actual: 2 })
        );
    }

    #[test]
    fn test_password_policy_boundary() {
        assert_eq!(PasswordPolicy::check(""), Err(PasswordPolicyError::Empty));
        assert_eq!(
            PasswordPolicy::check("      "),
            Err(PasswordPolicyError::Empty)
        );
        assert_eq!(
            PasswordPolicy::check("12345"),
            Err(PasswordPolicyError::TooShort { min: 6 })
        );
        assert_eq!(PasswordPolicy::check("123456"), Ok(()));
    }

    #[test]
    fn test_account_id_from_string() {
        let id = AccountId::new();
        assert_eq!(AccountId::from_string(&id.to_string()), Ok(id));
        assert!(AccountId::from_string("nope").is_err());
    }

    #[test]
    fn test_new_account_defaults() {
        let account = account();
        assert_eq!(account.roles(), &[DEFAULT_ROLE.to_string()]);
        assert!(account.is_active());
        assert!(account.last_login_at().is_none());
        assert_eq!(account.first_name(), Some("Alice"));
    }

    #[test]
    fn test_roles_have_no_duplicates() {
        let mut account = account();
        assert!(!account.add_role("User"));
        assert!(account.add_role("Admin"));
        assert_eq!(account.roles(), &["User".to_string(), "Admin".to_string()]);
        assert!(account.remove_role("User"));
        assert!(!account.remove_role("User"));
        assert_eq!(account.roles(), &["Admin".to_string()]);
    }

    #[test]
    fn test_restore_drops_duplicate_roles() {
        let original = account();
        let restored = Account::restore(AccountRecord {
            id: original.id(),
            email: original.email().clone(),
            username: original.username().clone(),
            password_digest: original.password_digest().to_string(),
            first_name: None,
            last_name: None,
            roles: vec!["User".to_string(), "Admin".to_string(), "User".to_string()],
            created_at: original.created_at(),
            last_login_at: None,
            is_active: false,
        });

        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.roles(), &["User".to_string(), "Admin".to_string()]);
        assert!(!restored.is_active());
    }

    #[test]
    fn test_lifecycle_mutators() {
        let mut account = account();
        account.deactivate();
        assert!(!account.is_active());
        account.activate();
        assert!(account.is_active());

        account.record_login();
        assert!(account.last_login_at().is_some());

        account.update_profile(None, Some("Liddell".to_string()));
        assert_eq!(account.first_name(), None);
        assert_eq!(account.last_name(), Some("Liddell"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let account = account();
        let rendered = format!("{:?}", account);
        assert!(!rendered.contains("c2VjcmV0LWRpZ2VzdA=="));
        assert!(rendered.contains("<redacted>"));

        let command = RegisterCommand::new("a@x.com", "alice", "hunter22");
        assert!(!format!("{:?}", command).contains("hunter22"));
    }

    #[test]
    fn test_view_hides_digest() {
        let account = account();
        let view = AccountView::from(&account);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("password_digest").is_none());
    }
}
