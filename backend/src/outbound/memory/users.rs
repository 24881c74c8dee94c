//! In-memory fan account store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserAccount, UserId};

use super::{paginate, read, write};

/// [`UserRepository`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    accounts: RwLock<HashMap<UserId, UserAccount>>,
}

impl MemoryUserRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(
    accounts: &HashMap<UserId, UserAccount>,
    account: &UserAccount,
) -> Result<(), UserPersistenceError> {
    let clash = accounts
        .values()
        .any(|other| other.user.id != account.user.id && other.user.email == account.user.email);
    if clash {
        return Err(UserPersistenceError::duplicate_email(
            account.user.email.as_str(),
        ));
    }
    Ok(())
}

fn matches_search(user: &User, needle: &str) -> bool {
    [
        user.first_name.as_str(),
        user.last_name.as_str(),
        user.email.as_str(),
    ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut accounts = write(&self.accounts);
        email_taken(&accounts, account)?;
        if accounts.contains_key(&account.user.id) {
            return Err(UserPersistenceError::query(format!(
                "user {} already exists",
                account.user.id
            )));
        }
        accounts.insert(account.user.id, account.clone());
        Ok(())
    }

    async fn update(&self, account: &UserAccount) -> Result<bool, UserPersistenceError> {
        let mut accounts = write(&self.accounts);
        if !accounts.contains_key(&account.user.id) {
            return Ok(false);
        }
        email_taken(&accounts, account)?;
        accounts.insert(account.user.id, account.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(read(&self.accounts).get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let email = email.trim().to_lowercase();
        Ok(read(&self.accounts)
            .values()
            .find(|account| account.user.email.as_str() == email)
            .cloned())
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(read(&self.accounts)
            .values()
            .find(|account| {
                account
                    .credentials
                    .reset
                    .as_ref()
                    .is_some_and(|ticket| ticket.token_hash == token_hash)
            })
            .cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(write(&self.accounts).remove(id).is_some())
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, UserPersistenceError> {
        let needle = search.map(|term| term.trim().to_lowercase());
        let mut users: Vec<User> = read(&self.accounts)
            .values()
            .map(|account| &account.user)
            .filter(|user| needle.as_deref().is_none_or(|n| matches_search(user, n)))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(users, page))
    }
}
