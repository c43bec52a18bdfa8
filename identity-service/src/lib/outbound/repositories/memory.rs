use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::account::errors::AccountField;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::Username;
use crate::account::ports::CredentialStore;
use crate::account::ports::CredentialTransaction;

type Accounts = Arc<RwLock<HashMap<AccountId, Account>>>;

/// Process-local credential store.
///
/// Used by tests and local runs. Uniqueness of email and username is
/// enforced under the write lock, like the database constraints.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    accounts: Accounts,
    fail_inserts: Arc<AtomicBool>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    fn injected_failure(&self) -> Result<(), AccountError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AccountError::DatabaseError(
                "Injected insert failure".to_string(),
            ));
        }
        Ok(())
    }
}

fn conflict(accounts: &HashMap<AccountId, Account>, candidate: &Account) -> Option<AccountError> {
    for existing in accounts.values() {
        if existing.id() == candidate.id() {
            continue;
        }
        if existing.email() == candidate.email() {
            return Some(AccountError::DuplicateAccount {
                field: AccountField::Email,
                value: candidate.email().to_string(),
            });
        }
        if existing.username() == candidate.username() {
            return Some(AccountError::DuplicateAccount {
                field: AccountField::Username,
                value: candidate.username().to_string(),
            });
        }
    }
    None
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email() == email).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.username() == username).cloned())
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.email() == email))
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.username() == username))
    }

    async fn insert(&self, account: &Account) -> Result<(), AccountError> {
        self.injected_failure()?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id()) {
            return Err(AccountError::DatabaseError(format!(
                "Account {} already stored",
                account.id()
            )));
        }
        if let Some(err) = conflict(&accounts, account) {
            return Err(err);
        }
        accounts.insert(account.id(), account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), AccountError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.id()) {
            Some(stored) => {
                *stored = account.clone();
                Ok(())
            }
            None => Err(AccountError::NotFound(account.id().to_string())),
        }
    }

    async fn begin_transaction(&self) -> Result<Box<dyn CredentialTransaction>, AccountError> {
        Ok(Box::new(InMemoryTransaction {
            store: self.clone(),
            staged: Vec::new(),
            finished: false,
        }))
    }
}

/// Staged writes, applied atomically on commit.
pub struct InMemoryTransaction {
    store: InMemoryCredentialStore,
    staged: Vec<Account>,
    finished: bool,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> Result<(), AccountError> {
        if self.finished {
            return Err(AccountError::DatabaseError(
                "Transaction already finished".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialTransaction for InMemoryTransaction {
    async fn insert(&mut self, account: &Account) -> Result<(), AccountError> {
        self.ensure_open()?;
        self.store.injected_failure()?;

        let staged: HashMap<AccountId, Account> = self
            .staged
            .iter()
            .map(|a| (a.id(), a.clone()))
            .collect();
        if let Some(err) = conflict(&staged, account) {
            return Err(err);
        }

        self.staged.push(account.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), AccountError> {
        self.ensure_open()?;
        self.finished = true;

        let mut accounts = self.store.accounts.write().await;
        let rejected = self
            .staged
            .iter()
            .find_map(|account| conflict(&accounts, account));
        if let Some(err) = rejected {
            self.staged.clear();
            return Err(err);
        }
        for account in self.staged.drain(..) {
            accounts.insert(account.id(), account);
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), AccountError> {
        self.finished = true;
        self.staged.clear();
        Ok(())
    }
}
