//! In-memory staff account store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{AdminPersistenceError, AdminRepository};
use crate::domain::{Admin, AdminAccount, AdminId};

use super::{paginate, read, write};

/// [`AdminRepository`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryAdminRepository {
    accounts: RwLock<HashMap<AdminId, AdminAccount>>,
}

impl MemoryAdminRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(
    accounts: &HashMap<AdminId, AdminAccount>,
    account: &AdminAccount,
) -> Result<(), AdminPersistenceError> {
    let clash = accounts.values().any(|other| {
        other.admin.id != account.admin.id && other.admin.email == account.admin.email
    });
    if clash {
        return Err(AdminPersistenceError::duplicate_email(
            account.admin.email.as_str(),
        ));
    }
    Ok(())
}

#[async_trait]
impl AdminRepository for MemoryAdminRepository {
    async fn count(&self) -> Result<u64, AdminPersistenceError> {
        Ok(read(&self.accounts).len() as u64)
    }

    async fn insert(&self, account: &AdminAccount) -> Result<(), AdminPersistenceError> {
        let mut accounts = write(&self.accounts);
        email_taken(&accounts, account)?;
        if accounts.contains_key(&account.admin.id) {
            return Err(AdminPersistenceError::query(format!(
                "admin {} already exists",
                account.admin.id
            )));
        }
        accounts.insert(account.admin.id, account.clone());
        Ok(())
    }

    async fn insert_first(&self, account: &AdminAccount) -> Result<bool, AdminPersistenceError> {
        let mut accounts = write(&self.accounts);
        if !accounts.is_empty() {
            return Ok(false);
        }
        accounts.insert(account.admin.id, account.clone());
        Ok(true)
    }

    async fn update(&self, account: &AdminAccount) -> Result<bool, AdminPersistenceError> {
        let mut accounts = write(&self.accounts);
        if !accounts.contains_key(&account.admin.id) {
            return Ok(false);
        }
        email_taken(&accounts, account)?;
        accounts.insert(account.admin.id, account.clone());
        Ok(true)
    }

    async fn find_by_id(
        &self,
        id: &AdminId,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError> {
        Ok(read(&self.accounts).get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError> {
        let email = email.trim().to_lowercase();
        Ok(read(&self.accounts)
            .values()
            .find(|account| account.admin.email.as_str() == email)
            .cloned())
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AdminAccount>, AdminPersistenceError> {
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

    async fn delete(&self, id: &AdminId) -> Result<bool, AdminPersistenceError> {
        Ok(write(&self.accounts).remove(id).is_some())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Admin>, AdminPersistenceError> {
        let mut admins: Vec<Admin> = read(&self.accounts)
            .values()
            .map(|account| account.admin.clone())
            .collect();
        admins.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(admins, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, Utc};
    use rstest::rstest;

    use crate::domain::{AdminRole, Credentials, Email, PasswordHash};

    fn account(name: &str, email: &str, minutes: i64) -> AdminAccount {
        let at = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::minutes(minutes);
        AdminAccount {
            admin: Admin {
                id: AdminId::random(),
                name: name.into(),
                email: Email::parse(email).expect("email"),
                role: AdminRole::Admin,
                created_at: at,
                updated_at: at,
            },
            credentials: Credentials::new(PasswordHash::new("hash")),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn count_tracks_inserts_and_deletes() {
        let repo = MemoryAdminRepository::new();
        let first = account("Kemi Adeyemi", "kemi@pitchside.ng", 0);
        repo.insert(&first).await.expect("insert");
        repo.insert(&account("Musa Bello", "musa@pitchside.ng", 1))
            .await
            .expect("insert");
        assert_eq!(repo.count().await.expect("count"), 2);

        assert!(repo.delete(&first.admin.id).await.expect("delete"));
        assert!(!repo.delete(&first.admin.id).await.expect("delete"));
        assert_eq!(repo.count().await.expect("count"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn list_is_oldest_first() {
        let repo = MemoryAdminRepository::new();
        repo.insert(&account("Later", "later@pitchside.ng", 5))
            .await
            .expect("insert");
        repo.insert(&account("Earlier", "earlier@pitchside.ng", 1))
            .await
            .expect("insert");
        let page = repo.list(PageRequest::default()).await.expect("list");
        let names: Vec<_> = page.data.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Earlier", "Later"]);
    }

    #[rstest]
    #[tokio::test]
    async fn changing_email_to_a_taken_one_fails() {
        let repo = MemoryAdminRepository::new();
        repo.insert(&account("Kemi Adeyemi", "kemi@pitchside.ng", 0))
            .await
            .expect("insert");
        let mut other = account("Musa Bello", "musa@pitchside.ng", 1);
        repo.insert(&other).await.expect("insert");
        other.admin.email = Email::parse("kemi@pitchside.ng").expect("email");
        let err = repo.update(&other).await.expect_err("duplicate");
        assert!(matches!(err, AdminPersistenceError::DuplicateEmail { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn only_one_bootstrap_account_is_stored() {
        let repo = std::sync::Arc::new(MemoryAdminRepository::new());
        let attempts = (0..8).map(|n| {
            let repo = std::sync::Arc::clone(&repo);
            let candidate = account("Founder", &format!("founder{n}@pitchside.ng"), n);
            tokio::spawn(async move { repo.insert_first(&candidate).await })
        });
        let stored = futures_util::future::join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.expect("task").expect("insert"))
            .filter(|stored| *stored)
            .count();
        assert_eq!(stored, 1);
        assert_eq!(repo.count().await.expect("count"), 1);
    }
}
