//! Handler tests for staff account and back-office endpoints.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{DateTime, Utc};
use mockall::predicate::eq;
use pagination::{Page, PageRequest};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockAdminAccounts, MockUserAccounts};
use crate::domain::{AdminRole, Email, IssuedToken, Principal, Role};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::{bearer, http_state, test_app};

#[fixture]
fn admin() -> Admin {
    let now = DateTime::<Utc>::UNIX_EPOCH;
    Admin {
        id: AdminId::random(),
        name: "Tunde Bakare".into(),
        email: Email::parse("desk@pitchside.ng").expect("email"),
        role: AdminRole::SuperAdmin,
        created_at: now,
        updated_at: now,
    }
}

fn fan() -> User {
    let now = DateTime::<Utc>::UNIX_EPOCH;
    User {
        id: UserId::random(),
        first_name: "Emeka".into(),
        last_name: "Obi".into(),
        email: Email::parse("emeka@example.ng").expect("email"),
        avatar_url: None,
        favourite_teams: Vec::new(),
        followed_states: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

async fn call(state: HttpState, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(state)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

fn with_admins(admins: MockAdminAccounts) -> HttpState {
    let mut state = http_state();
    state.admins = Arc::new(admins);
    state
}

fn with_users(users: MockUserAccounts) -> HttpState {
    let mut state = http_state();
    state.users = Arc::new(users);
    state
}

fn staff(role: Role) -> Principal {
    Principal::new(uuid::Uuid::new_v4(), role)
}

#[rstest]
#[actix_web::test]
async fn first_registration_needs_no_token(admin: Admin) {
    let mut admins = MockAdminAccounts::new();
    let created = admin.clone();
    admins
        .expect_register()
        .withf(|registrar, reg| registrar.is_none() && reg.role.is_none())
        .times(1)
        .return_once(move |_, _| {
            Ok(AdminSession {
                token: IssuedToken {
                    token: "signed".into(),
                    expires_at: DateTime::<Utc>::UNIX_EPOCH,
                },
                admin: created,
            })
        });
    let (status, body) = call(
        with_admins(admins),
        actix_test::TestRequest::post()
            .uri("/api/admin/register")
            .set_json(json!({
                "name": "Tunde Bakare",
                "email": "desk@pitchside.ng",
                "password": "password1",
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["admin"]["role"], "super_admin");
    assert_eq!(body["token"], "signed");
}

#[rstest]
#[actix_web::test]
async fn registration_forwards_the_caller(admin: Admin) {
    let caller = Principal::admin(admin.id, Role::SuperAdmin);
    let mut admins = MockAdminAccounts::new();
    admins
        .expect_register()
        .withf(move |registrar, reg| {
            *registrar == Some(caller) && reg.role == Some(AdminRole::Admin)
        })
        .times(1)
        .return_once(|_, _| Err(Error::forbidden("super admin required")));
    let (status, _) = call(
        with_admins(admins),
        actix_test::TestRequest::post()
            .uri("/api/admin/register")
            .insert_header(bearer(caller))
            .set_json(json!({
                "name": "Ngozi Eze",
                "email": "ngozi@pitchside.ng",
                "password": "password1",
                "role": "admin",
            })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn registration_rejects_unknown_roles() {
    let (status, body) = call(
        http_state(),
        actix_test::TestRequest::post()
            .uri("/api/admin/register")
            .set_json(json!({
                "name": "Ngozi Eze",
                "email": "ngozi@pitchside.ng",
                "password": "password1",
                "role": "owner",
            })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "role");
}

#[rstest]
#[actix_web::test]
async fn profile_rejects_fan_tokens() {
    let (status, _) = call(
        http_state(),
        actix_test::TestRequest::get()
            .uri("/api/admin/profile")
            .insert_header(bearer(staff(Role::User))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn user_listing_trims_search_and_pages() {
    let mut users = MockUserAccounts::new();
    users
        .expect_list_users()
        .withf(|search, page| {
            search.as_deref() == Some("obi") && page.page() == 2 && page.limit() == 5
        })
        .times(1)
        .return_once(|_, page| Ok(Page::new(vec![fan()], page, 6)));
    let (status, body) = call(
        with_users(users),
        actix_test::TestRequest::get()
            .uri("/api/admin/users?search=%20obi%20&page=2&limit=5")
            .insert_header(bearer(staff(Role::Admin))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 6);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["data"][0]["firstName"], "Emeka");
}

#[rstest]
#[case("/api/admin/users?limit=0", "limit")]
#[case("/api/admin/users?page=0", "page")]
#[actix_web::test]
async fn user_listing_rejects_bad_paging(#[case] uri: &str, #[case] field: &str) {
    let (status, body) = call(
        http_state(),
        actix_test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(staff(Role::Admin))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn user_lookup_rejects_malformed_ids() {
    let (status, body) = call(
        http_state(),
        actix_test::TestRequest::get()
            .uri("/api/admin/users/not-a-uuid")
            .insert_header(bearer(staff(Role::Admin))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[rstest]
#[actix_web::test]
async fn user_deletion_returns_no_content() {
    let target = fan().id;
    let mut users = MockUserAccounts::new();
    users
        .expect_delete_user()
        .with(eq(target))
        .times(1)
        .return_once(|_| Ok(()));
    let (status, _) = call(
        with_users(users),
        actix_test::TestRequest::delete()
            .uri(&format!("/api/admin/users/{target}"))
            .insert_header(bearer(staff(Role::Admin))),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn admin_listing_requires_super_admin() {
    let (status, _) = call(
        http_state(),
        actix_test::TestRequest::get()
            .uri("/api/admin/admins")
            .insert_header(bearer(staff(Role::Admin))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn admin_listing_uses_default_paging(admin: Admin) {
    let mut admins = MockAdminAccounts::new();
    admins
        .expect_list_admins()
        .with(eq(PageRequest::default()))
        .times(1)
        .return_once(move |page| Ok(Page::new(vec![admin], page, 1)));
    let (status, body) = call(
        with_admins(admins),
        actix_test::TestRequest::get()
            .uri("/api/admin/admins")
            .insert_header(bearer(staff(Role::SuperAdmin))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 20);
}

#[rstest]
#[actix_web::test]
async fn admin_deletion_passes_actor_and_target(admin: Admin) {
    let actor = admin.id;
    let target = AdminId::random();
    let mut admins = MockAdminAccounts::new();
    admins
        .expect_delete_admin()
        .with(eq(actor), eq(target))
        .times(1)
        .return_once(|_, _| Ok(()));
    let (status, _) = call(
        with_admins(admins),
        actix_test::TestRequest::delete()
            .uri(&format!("/api/admin/admins/{target}"))
            .insert_header(bearer(Principal::admin(actor, Role::SuperAdmin))),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
