//! Staff account service implementing the [`AdminAccounts`] driving port.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AdminAccounts, AdminPersistenceError, AdminRepository, AdminSession,
};
use crate::domain::service_support::{INVALID_CREDENTIALS, INVALID_RESET_TOKEN};
use crate::domain::{
    AccountServiceDeps, Admin, AdminAccount, AdminId, AdminRegistration, AdminRole, Credentials,
    Email, Error, LoginCredentials, Password, Principal, ResetToken, Role,
};

const RESET_PATH: &str = "/admin/reset-password";

/// Staff account use-cases backed by an [`AdminRepository`].
#[derive(Clone)]
pub struct AdminAccountService<R> {
    repo: Arc<R>,
    deps: AccountServiceDeps,
}

impl<R> AdminAccountService<R> {
    /// Create the service.
    pub fn new(repo: Arc<R>, deps: AccountServiceDeps) -> Self {
        Self { repo, deps }
    }
}

fn map_admin_error(err: AdminPersistenceError) -> Error {
    match err {
        AdminPersistenceError::Connection { message } => {
            warn!(%message, "admin repository unavailable");
            Error::service_unavailable("admin store is unavailable")
        }
        AdminPersistenceError::Query { message } => {
            Error::internal(format!("admin repository query failed: {message}"))
        }
        AdminPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("email already registered")
        }
    }
}

fn admin_not_found() -> Error {
    Error::not_found("admin not found")
}

/// Decide which role a registration is granted.
///
/// With no staff yet the caller needs no token and becomes super admin.
fn granted_role(
    existing: u64,
    registrar: Option<Principal>,
    requested: Option<AdminRole>,
) -> Result<AdminRole, Error> {
    if existing == 0 {
        return Ok(AdminRole::SuperAdmin);
    }
    match registrar.map(|p| p.role()) {
        None => Err(Error::unauthorized("authentication required")),
        Some(Role::SuperAdmin) => Ok(requested.unwrap_or(AdminRole::Admin)),
        Some(_) => Err(Error::forbidden("only a super admin can register staff")),
    }
}

impl<R> AdminAccountService<R>
where
    R: AdminRepository,
{
    async fn load(&self, id: &AdminId) -> Result<AdminAccount, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_admin_error)?
            .ok_or_else(admin_not_found)
    }

    async fn store(&self, account: &AdminAccount) -> Result<(), Error> {
        if self.repo.update(account).await.map_err(map_admin_error)? {
            Ok(())
        } else {
            Err(admin_not_found())
        }
    }

    fn session(&self, admin: Admin) -> Result<AdminSession, Error> {
        let token = self
            .deps
            .issue(Principal::admin(admin.id, admin.role.as_role()))?;
        Ok(AdminSession { token, admin })
    }
}

#[async_trait]
impl<R> AdminAccounts for AdminAccountService<R>
where
    R: AdminRepository,
{
    async fn register(
        &self,
        registrar: Option<Principal>,
        registration: AdminRegistration,
    ) -> Result<AdminSession, Error> {
        let existing = self.repo.count().await.map_err(map_admin_error)?;
        let role = granted_role(existing, registrar, registration.role)?;
        if self
            .repo
            .find_by_email(registration.email.as_str())
            .await
            .map_err(map_admin_error)?
            .is_some()
        {
            return Err(Error::conflict("email already registered"));
        }
        let now = self.deps.clock.utc();
        let password_hash = self.deps.hash(&registration.password).await?;
        let account = AdminAccount {
            admin: Admin {
                id: AdminId::random(),
                name: registration.name,
                email: registration.email,
                role,
                created_at: now,
                updated_at: now,
            },
            credentials: Credentials::new(password_hash),
        };
        if existing == 0 {
            let stored = self
                .repo
                .insert_first(&account)
                .await
                .map_err(map_admin_error)?;
            if !stored {
                return Err(Error::conflict(
                    "another administrator registered first; ask a super admin for an account",
                ));
            }
        } else {
            self.repo.insert(&account).await.map_err(map_admin_error)?;
        }
        info!(admin_id = %account.admin.id, role = role.as_str(), "admin registered");
        self.session(account.admin)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AdminSession, Error> {
        let Some(account) = self
            .repo
            .find_by_email(credentials.email())
            .await
            .map_err(map_admin_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self
            .deps
            .verify(credentials.password(), &account.credentials.password_hash)
            .await?
        {
            debug!(admin_id = %account.admin.id, "admin login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.session(account.admin)
    }

    async fn profile(&self, id: AdminId) -> Result<Admin, Error> {
        Ok(self.load(&id).await?.admin)
    }

    async fn change_password(
        &self,
        id: AdminId,
        current: String,
        new_password: Password,
    ) -> Result<(), Error> {
        let mut account = self.load(&id).await?;
        self.deps
            .change_password(&mut account.credentials, &current, &new_password)
            .await?;
        account.admin.updated_at = self.deps.clock.utc();
        self.store(&account).await?;
        info!(admin_id = %id, "admin password changed");
        Ok(())
    }

    async fn forgot_password(&self, email: String) -> Result<(), Error> {
        let Ok(email) = Email::parse(&email) else {
            return Ok(());
        };
        let Some(mut account) = self
            .repo
            .find_by_email(email.as_str())
            .await
            .map_err(map_admin_error)?
        else {
            debug!("admin password reset requested for unknown e-mail");
            return Ok(());
        };
        let token = self.deps.begin_reset(&mut account.credentials);
        self.store(&account).await?;
        if let Err(err) = self
            .deps
            .send_reset_mail(&account.admin.email, RESET_PATH, &token)
            .await
        {
            warn!(admin_id = %account.admin.id, error = %err, "reset e-mail failed; clearing token");
            account.credentials.reset = None;
            self.store(&account).await?;
        }
        Ok(())
    }

    async fn reset_password(&self, token: ResetToken, new_password: Password) -> Result<(), Error> {
        let Some(mut account) = self
            .repo
            .find_by_reset_token_hash(&token.digest())
            .await
            .map_err(map_admin_error)?
        else {
            return Err(Error::invalid_request(INVALID_RESET_TOKEN));
        };
        self.deps
            .complete_reset(&mut account.credentials, &token, &new_password)
            .await?;
        account.admin.updated_at = self.deps.clock.utc();
        self.store(&account).await?;
        info!(admin_id = %account.admin.id, "admin password reset");
        Ok(())
    }

    async fn list_admins(&self, page: PageRequest) -> Result<Page<Admin>, Error> {
        self.repo.list(page).await.map_err(map_admin_error)
    }

    async fn delete_admin(&self, actor: AdminId, target: AdminId) -> Result<(), Error> {
        if actor == target {
            return Err(Error::invalid_request("you cannot delete your own account"));
        }
        if self.repo.delete(&target).await.map_err(map_admin_error)? {
            info!(admin_id = %target, deleted_by = %actor, "admin deleted");
            Ok(())
        } else {
            Err(admin_not_found())
        }
    }
}

#[cfg(test)]
#[path = "admin_service_tests.rs"]
mod tests;
