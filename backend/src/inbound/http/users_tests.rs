//! Handler tests for the fan account endpoints.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{DateTime, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockUserAccounts;
use crate::domain::{Email, IssuedToken, Principal, UserId};
use crate::inbound::http::test_utils::{bearer, http_state, test_app};

#[fixture]
fn user() -> User {
    let now = DateTime::<Utc>::UNIX_EPOCH;
    User {
        id: UserId::random(),
        first_name: "Chioma".into(),
        last_name: "Okafor".into(),
        email: Email::parse("chioma@example.ng").expect("email"),
        avatar_url: None,
        favourite_teams: vec!["Enyimba".into()],
        followed_states: vec!["Abia".into()],
        created_at: now,
        updated_at: now,
    }
}

fn session(user: User) -> UserSession {
    UserSession {
        token: IssuedToken {
            token: "signed".into(),
            expires_at: DateTime::<Utc>::UNIX_EPOCH,
        },
        user,
    }
}

async fn call(users: MockUserAccounts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let mut state = http_state();
    state.users = Arc::new(users);
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

#[rstest]
#[actix_web::test]
async fn register_returns_created_session(user: User) {
    let mut users = MockUserAccounts::new();
    let expected = user.clone();
    users
        .expect_register()
        .withf(|reg| reg.email.as_str() == "chioma@example.ng" && reg.first_name == "Chioma")
        .times(1)
        .return_once(move |_| Ok(session(expected)));

    let (status, body) = call(
        users,
        actix_test::TestRequest::post()
            .uri("/api/user/register")
            .set_json(json!({
                "firstName": "Chioma",
                "lastName": "Okafor",
                "email": "Chioma@Example.ng",
                "password": "password1",
            })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token"], "signed");
    assert_eq!(body["user"]["email"], "chioma@example.ng");
    assert!(body["user"].get("passwordHash").is_none());
}

#[rstest]
#[case(json!({"firstName": "", "lastName": "Okafor", "email": "a@b.ng", "password": "password1"}), "firstName")]
#[case(json!({"firstName": "Chioma", "lastName": "Okafor", "email": "not-an-email", "password": "password1"}), "email")]
#[case(json!({"firstName": "Chioma", "lastName": "Okafor", "email": "a@b.ng", "password": "short"}), "password")]
#[actix_web::test]
async fn register_validates_before_calling_the_service(#[case] body: Value, #[case] field: &str) {
    let (status, body) = call(
        MockUserAccounts::new(),
        actix_test::TestRequest::post()
            .uri("/api/user/register")
            .set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_uses_the_error_envelope() {
    let (status, body) = call(
        MockUserAccounts::new(),
        actix_test::TestRequest::post()
            .uri("/api/user/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn login_surfaces_invalid_credentials() {
    let mut users = MockUserAccounts::new();
    users
        .expect_login()
        .times(1)
        .return_once(|_| Err(Error::unauthorized("invalid credentials")));
    let (status, body) = call(
        users,
        actix_test::TestRequest::post()
            .uri("/api/user/login")
            .set_json(json!({"email": "chioma@example.ng", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid credentials");
}

#[rstest]
#[actix_web::test]
async fn profile_requires_a_bearer_token() {
    let (status, body) = call(
        MockUserAccounts::new(),
        actix_test::TestRequest::get().uri("/api/user/profile"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn profile_rejects_staff_tokens() {
    let staff = Principal::new(uuid::Uuid::new_v4(), crate::domain::Role::Admin);
    let (status, _) = call(
        MockUserAccounts::new(),
        actix_test::TestRequest::get()
            .uri("/api/user/profile")
            .insert_header(bearer(staff)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn profile_update_passes_canonical_states(user: User) {
    let id = user.id;
    let mut users = MockUserAccounts::new();
    let updated = user.clone();
    users
        .expect_update_profile()
        .withf(move |caller, update| {
            *caller == id && update.followed_states.as_deref() == Some(&["Lagos".to_owned()][..])
        })
        .times(1)
        .return_once(move |_, _| Ok(updated));
    let (status, _) = call(
        users,
        actix_test::TestRequest::put()
            .uri("/api/user/profile")
            .insert_header(bearer(Principal::user(id)))
            .set_json(json!({"followedStates": ["lagos"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn change_password_requires_current_password(user: User) {
    let (status, body) = call(
        MockUserAccounts::new(),
        actix_test::TestRequest::patch()
            .uri("/api/user/change-password")
            .insert_header(bearer(Principal::user(user.id)))
            .set_json(json!({"newPassword": "new-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "currentPassword");
}

#[rstest]
#[actix_web::test]
async fn forgot_password_always_answers_the_same() {
    let mut users = MockUserAccounts::new();
    users
        .expect_forgot_password()
        .with(eq("nobody@example.ng".to_owned()))
        .times(1)
        .return_once(|_| Ok(()));
    let (status, body) = call(
        users,
        actix_test::TestRequest::post()
            .uri("/api/user/forgot-password")
            .set_json(json!({"email": "nobody@example.ng"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], RESET_REQUESTED_MESSAGE);
}

#[rstest]
#[actix_web::test]
async fn reset_password_takes_the_token_from_the_path() {
    let mut users = MockUserAccounts::new();
    users
        .expect_reset_password()
        .withf(|token, password| token.expose() == "abc123" && password.expose() == "brand-new-pass")
        .times(1)
        .return_once(|_, _| Ok(()));
    let (status, _) = call(
        users,
        actix_test::TestRequest::post()
            .uri("/api/user/reset-password/abc123")
            .set_json(json!({"password": "brand-new-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn delete_account_returns_no_content(user: User) {
    let id = user.id;
    let mut users = MockUserAccounts::new();
    users
        .expect_delete_account()
        .with(eq(id))
        .times(1)
        .return_once(|_| Ok(()));
    let (status, body) = call(
        users,
        actix_test::TestRequest::delete()
            .uri("/api/user/account")
            .insert_header(bearer(Principal::user(id))),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[rstest]
#[actix_web::test]
async fn avatar_upload_requires_an_image_part(user: User) {
    let boundary = "pitchsideboundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let (status, body) = call(
        MockUserAccounts::new(),
        actix_test::TestRequest::put()
            .uri("/api/user/avatar")
            .insert_header(bearer(Principal::user(user.id)))
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "avatar");
}

#[rstest]
#[actix_web::test]
async fn avatar_upload_forwards_the_image(user: User) {
    let id = user.id;
    let mut users = MockUserAccounts::new();
    let updated = User {
        avatar_url: Some("https://img.example/avatar.png".into()),
        ..user
    };
    users
        .expect_update_avatar()
        .withf(move |caller, image| {
            *caller == id && image.content_type() == "image/png" && image.bytes() == b"PNGDATA"
        })
        .times(1)
        .return_once(move |_, _| Ok(updated));
    let boundary = "pitchsideboundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    );
    let (status, body) = call(
        users,
        actix_test::TestRequest::put()
            .uri("/api/user/avatar")
            .insert_header(bearer(Principal::user(id)))
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avatarUrl"], "https://img.example/avatar.png");
}
