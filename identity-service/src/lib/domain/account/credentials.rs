use std::sync::Arc;

use auth::PasswordHasher;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::EmailAddress;
use crate::account::models::Username;

/// Account invariants that need no storage.
///
/// Owns the password hasher; every digest an account carries is produced
/// and checked here.
#[derive(Clone)]
pub struct AccountDomain {
    hasher: Arc<PasswordHasher>,
}

impl AccountDomain {
    pub fn new(hasher: Arc<PasswordHasher>) -> Self {
        Self { hasher }
    }

    /// Build a new account from validated inputs.
    ///
    /// Hashes the password, so this is CPU bound; call it off the async
    /// executor.
    ///
    /// # Errors
    /// * `Hashing` - Password hashing failed
    pub fn create_account(
        &self,
        email: EmailAddress,
        username: Username,
        raw_password: &str,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<Account, AccountError> {
        let digest = self.hasher.hash(raw_password)?;
        Ok(Account::new(email, username, digest, first_name, last_name))
    }

    pub fn check_password(&self, account: &Account, raw_password: &str) -> bool {
        self.hasher.verify(raw_password, account.password_digest())
    }

    /// Spend the cost of a password check without an account.
    pub fn burn_password_check(&self, raw_password: &str) {
        self.hasher.simulate_verify(raw_password);
    }
}
