//! Tests for the staff account service.

use rstest::rstest;

use super::*;
use crate::domain::ports::MockAdminRepository;
use crate::domain::{AuthSettings, ErrorCode};
use crate::test_support::{MutableClock, PlainHasher, PlainTokens, RecordingMailer};

fn service(
    repo: MockAdminRepository,
    mailer: Arc<RecordingMailer>,
) -> AdminAccountService<MockAdminRepository> {
    AdminAccountService::new(
        Arc::new(repo),
        AccountServiceDeps {
            hasher: Arc::new(PlainHasher),
            tokens: Arc::new(PlainTokens),
            mailer,
            clock: Arc::new(MutableClock::at_epoch()),
            settings: AuthSettings {
                frontend_url: "https://pitchside.ng".into(),
                ..AuthSettings::default()
            },
        },
    )
}

fn registration(role: Option<&str>) -> AdminRegistration {
    AdminRegistration::try_new("Tunde Bakare", "tunde@pitchside.ng", "password1", role)
        .expect("valid registration")
}

fn stored_admin(role: AdminRole) -> AdminAccount {
    let now = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
    AdminAccount {
        admin: Admin {
            id: AdminId::random(),
            name: "Ngozi Eze".into(),
            email: Email::parse("ngozi@pitchside.ng").expect("email"),
            role,
            created_at: now,
            updated_at: now,
        },
        credentials: Credentials::new(crate::domain::PasswordHash::new("plain:password1")),
    }
}

fn expect_fresh_email(repo: &mut MockAdminRepository) {
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_insert().times(1).return_once(|_| Ok(()));
}

#[rstest]
#[tokio::test]
async fn first_admin_becomes_super_admin_without_token() {
    let mut repo = MockAdminRepository::new();
    repo.expect_count().return_once(|| Ok(0));
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_insert().never();
    repo.expect_insert_first()
        .withf(|account| account.admin.role == AdminRole::SuperAdmin)
        .times(1)
        .return_once(|_| Ok(true));

    let session = service(repo, Arc::default())
        .register(None, registration(Some("admin")))
        .await
        .expect("first admin");
    assert_eq!(session.admin.role, AdminRole::SuperAdmin);
    assert!(session.token.token.starts_with("super_admin:"));
}

#[rstest]
#[tokio::test]
async fn losing_the_bootstrap_race_grants_nothing() {
    let mut repo = MockAdminRepository::new();
    repo.expect_count().return_once(|| Ok(0));
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_insert().never();
    repo.expect_insert_first().times(1).return_once(|_| Ok(false));

    let err = service(repo, Arc::default())
        .register(None, registration(None))
        .await
        .expect_err("someone else bootstrapped");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case::anonymous(None, ErrorCode::Unauthorized)]
#[case::fan(Some(Role::User), ErrorCode::Forbidden)]
#[case::plain_admin(Some(Role::Admin), ErrorCode::Forbidden)]
#[tokio::test]
async fn later_registrations_need_super_admin(
    #[case] registrar: Option<Role>,
    #[case] code: ErrorCode,
) {
    let mut repo = MockAdminRepository::new();
    repo.expect_count().return_once(|| Ok(1));
    repo.expect_insert().never();
    let registrar = registrar.map(|role| Principal::new(uuid::Uuid::new_v4(), role));

    let err = service(repo, Arc::default())
        .register(registrar, registration(None))
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), code);
}

#[rstest]
#[case::defaults_to_admin(None, AdminRole::Admin)]
#[case::honours_request(Some("super_admin"), AdminRole::SuperAdmin)]
#[tokio::test]
async fn super_admin_chooses_role(#[case] requested: Option<&str>, #[case] granted: AdminRole) {
    let mut repo = MockAdminRepository::new();
    repo.expect_count().return_once(|| Ok(3));
    expect_fresh_email(&mut repo);
    let registrar = Principal::new(uuid::Uuid::new_v4(), Role::SuperAdmin);

    let session = service(repo, Arc::default())
        .register(Some(registrar), registration(requested))
        .await
        .expect("registered");
    assert_eq!(session.admin.role, granted);
}

#[rstest]
#[tokio::test]
async fn duplicate_staff_email_conflicts() {
    let mut repo = MockAdminRepository::new();
    repo.expect_count().return_once(|| Ok(0));
    repo.expect_find_by_email()
        .return_once(|_| Ok(Some(stored_admin(AdminRole::Admin))));
    repo.expect_insert().never();
    repo.expect_insert_first().never();

    let err = service(repo, Arc::default())
        .register(None, registration(None))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn login_issues_token_with_stored_role() {
    let account = stored_admin(AdminRole::Admin);
    let id = account.admin.id;
    let mut repo = MockAdminRepository::new();
    repo.expect_find_by_email()
        .withf(|email| email == "ngozi@pitchside.ng")
        .return_once(move |_| Ok(Some(account)));

    let creds = LoginCredentials::try_from_parts("ngozi@pitchside.ng", "password1").expect("creds");
    let session = service(repo, Arc::default())
        .login(creds)
        .await
        .expect("logged in");
    assert_eq!(session.token.token, format!("admin:{id}"));
}

#[rstest]
#[tokio::test]
async fn reset_mail_uses_admin_path() {
    let mut repo = MockAdminRepository::new();
    repo.expect_find_by_email()
        .return_once(|_| Ok(Some(stored_admin(AdminRole::Admin))));
    repo.expect_update().times(1).return_once(|_| Ok(true));
    let mailer = Arc::new(RecordingMailer::default());

    service(repo, mailer.clone())
        .forgot_password("ngozi@pitchside.ng".into())
        .await
        .expect("ok");
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0]
        .text
        .contains("https://pitchside.ng/admin/reset-password/"));
}

#[rstest]
#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let mut repo = MockAdminRepository::new();
    repo.expect_delete().never();
    let id = AdminId::random();

    let err = service(repo, Arc::default())
        .delete_admin(id, id)
        .await
        .expect_err("self delete");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_admin_is_not_found() {
    let mut repo = MockAdminRepository::new();
    repo.expect_delete().return_once(|_| Ok(false));

    let err = service(repo, Arc::default())
        .delete_admin(AdminId::random(), AdminId::random())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
