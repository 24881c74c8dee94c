//! Fan account HTTP handlers.
//!
//! ```text
//! POST   /api/user/register
//! POST   /api/user/login
//! GET    /api/user/profile
//! PUT    /api/user/profile
//! PUT    /api/user/avatar
//! PATCH  /api/user/change-password
//! POST   /api/user/forgot-password
//! POST   /api/user/reset-password/{token}
//! DELETE /api/user/account
//! ```
//!
//! Credential endpoints are wrapped in the rate limiter when the scope is
//! built by [`scope`].

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, Scope, delete, get, patch, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ImageFolder, UserSession};
use crate::domain::{
    Error, LoginCredentials, Password, ProfileUpdate, ResetToken, User, UserRegistration,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::multipart::read_upload_form;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::missing_field_error;
use crate::middleware::{RateLimit, RateLimiter};

/// Response to every forgot-password request, whether or not the e-mail exists.
pub const RESET_REQUESTED_MESSAGE: &str =
    "If that e-mail is registered, a password reset link has been sent";

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[serde(default)]
    #[schema(example = "Chiamaka")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Okafor")]
    pub last_name: String,
    #[serde(default)]
    #[schema(example = "chiamaka@example.ng")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body shared by fan and staff endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Ok(Self::try_from_parts(&value.email, &value.password)?)
    }
}

/// Partial profile update body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub favourite_teams: Option<Vec<String>>,
    pub followed_states: Option<Vec<String>>,
}

/// Password change body shared by fan and staff endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl ChangePasswordRequest {
    pub(crate) fn into_parts(self) -> Result<(String, Password), Error> {
        let current = self
            .current_password
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing_field_error("currentPassword"))?;
        let new_password = self
            .new_password
            .ok_or_else(|| missing_field_error("newPassword"))?;
        Ok((current, Password::new("newPassword", &new_password)?))
    }
}

/// Forgot-password body shared by fan and staff endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Reset-password body shared by fan and staff endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// Plain confirmation message.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Token and profile returned on registration or login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl From<UserSession> for UserAuthResponse {
    fn from(session: UserSession) -> Self {
        Self {
            token: session.token.token,
            expires_at: session.token.expires_at,
            user: session.user,
        }
    }
}

/// Create a fan account and sign in.
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserAuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "E-mail already registered", body = Error),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let registration = UserRegistration::try_new(
        &body.first_name,
        &body.last_name,
        &body.email,
        &body.password,
    )?;
    let session = state.users.register(registration).await?;
    Ok(HttpResponse::Created().json(UserAuthResponse::from(session)))
}

/// Sign in with e-mail and password.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = UserAuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["users"],
    operation_id = "loginUser",
    security([])
)]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserAuthResponse>> {
    let credentials = LoginCredentials::try_from(&payload.into_inner())?;
    let session = state.users.login(credentials).await?;
    Ok(web::Json(session.into()))
}

/// Profile of the signed-in fan.
#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserProfile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<User>> {
    Ok(web::Json(state.users.profile(caller.0).await?))
}

/// Update names, favourite teams or followed states.
#[utoipa::path(
    put,
    path = "/api/user/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUserProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<User>> {
    let body = payload.into_inner();
    let update = ProfileUpdate::try_new(
        body.first_name.as_deref(),
        body.last_name.as_deref(),
        body.favourite_teams.as_deref(),
        body.followed_states.as_deref(),
    )?;
    Ok(web::Json(state.users.update_profile(caller.0, update).await?))
}

/// Upload a new avatar (multipart field `avatar`).
#[utoipa::path(
    put,
    path = "/api/user/avatar",
    request_body(content_type = "multipart/form-data", description = "Image in the `avatar` field"),
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 400, description = "Missing or unsupported image", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Image storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUserAvatar"
)]
#[put("/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<web::Json<User>> {
    let mut form = read_upload_form(payload, "avatar", ImageFolder::Avatars).await?;
    let image = form
        .take_image()
        .ok_or_else(|| missing_field_error("avatar"))?;
    Ok(web::Json(state.users.update_avatar(caller.0, image).await?))
}

/// Change the signed-in fan's password.
#[utoipa::path(
    patch,
    path = "/api/user/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid new password", body = Error),
        (status = 401, description = "Current password incorrect", body = Error)
    ),
    tags = ["users"],
    operation_id = "changeUserPassword"
)]
#[patch("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let (current, new_password) = payload.into_inner().into_parts()?;
    state
        .users
        .change_password(caller.0, current, new_password)
        .await?;
    Ok(web::Json(MessageResponse::new("Password changed")))
}

/// Request a password reset link.
#[utoipa::path(
    post,
    path = "/api/user/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["users"],
    operation_id = "forgotUserPassword",
    security([])
)]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.users.forgot_password(payload.into_inner().email).await?;
    Ok(web::Json(MessageResponse::new(RESET_REQUESTED_MESSAGE)))
}

/// Set a new password with a mailed reset token.
#[utoipa::path(
    post,
    path = "/api/user/reset-password/{token}",
    params(("token" = String, Path, description = "Token from the reset link")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = Error),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["users"],
    operation_id = "resetUserPassword",
    security([])
)]
pub async fn reset_password(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let token = ResetToken::from_raw(&path.into_inner())?;
    let password = Password::new("password", &payload.into_inner().password)?;
    state.users.reset_password(token, password).await?;
    Ok(web::Json(MessageResponse::new("Password has been reset")))
}

/// Delete the signed-in fan's account.
#[utoipa::path(
    delete,
    path = "/api/user/account",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUserAccount"
)]
#[delete("/account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    state.users.delete_account(caller.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Routes under `/api/user`.
pub fn scope(limiter: &Arc<RateLimiter>) -> Scope {
    let limit = |name: &'static str| RateLimit::new(Arc::clone(limiter), name);
    web::scope("/api/user")
        .service(
            web::resource("/register")
                .wrap(limit("user.register"))
                .route(web::post().to(register)),
        )
        .service(
            web::resource("/login")
                .wrap(limit("user.login"))
                .route(web::post().to(login)),
        )
        .service(
            web::resource("/forgot-password")
                .wrap(limit("user.forgot_password"))
                .route(web::post().to(forgot_password)),
        )
        .service(
            web::resource("/reset-password/{token}")
                .wrap(limit("user.reset_password"))
                .route(web::post().to(reset_password)),
        )
        .service(profile)
        .service(update_profile)
        .service(update_avatar)
        .service(change_password)
        .service(delete_account)
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
