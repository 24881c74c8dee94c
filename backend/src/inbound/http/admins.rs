//! Staff account and back-office HTTP handlers.
//!
//! ```text
//! POST   /api/admin/register
//! POST   /api/admin/login
//! GET    /api/admin/profile
//! PATCH  /api/admin/change-password
//! POST   /api/admin/forgot-password
//! POST   /api/admin/reset-password/{token}
//! GET    /api/admin/users
//! GET    /api/admin/users/{id}
//! DELETE /api/admin/users/{id}
//! GET    /api/admin/admins
//! DELETE /api/admin/admins/{id}
//! ```

use std::sync::Arc;

use actix_web::{HttpResponse, Scope, delete, get, patch, web};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::AdminSession;
use crate::domain::{
    Admin, AdminId, AdminRegistration, Error, LoginCredentials, Password, ResetToken, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedAdmin, OptionalPrincipal, SuperAdmin};
use crate::inbound::http::schemas::{AdminPage, UserPage};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, MessageResponse,
    RESET_REQUESTED_MESSAGE, ResetPasswordRequest,
};
use crate::inbound::http::validation::{non_blank, page_request, parse_id};
use crate::middleware::{RateLimit, RateLimiter};

/// Staff registration body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterAdminRequest {
    #[serde(default)]
    #[schema(example = "Ngozi Eze")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ngozi@pitchside.ng")]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// `admin` (default) or `super_admin`.
    #[schema(example = "admin")]
    pub role: Option<String>,
}

/// Token and profile returned on staff registration or login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub admin: Admin,
}

impl From<AdminSession> for AdminAuthResponse {
    fn from(session: AdminSession) -> Self {
        Self {
            token: session.token.token,
            expires_at: session.token.expires_at,
            admin: session.admin,
        }
    }
}

/// Query for the fan listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// Case-insensitive match on name or e-mail.
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Paging query.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Register a staff account.
///
/// Open while no staff account exists; the first account becomes a super
/// admin. Afterwards a super admin token is required.
#[utoipa::path(
    post,
    path = "/api/admin/register",
    request_body = RegisterAdminRequest,
    responses(
        (status = 201, description = "Account created", body = AdminAuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Token required", body = Error),
        (status = 403, description = "Super admin required", body = Error),
        (status = 409, description = "E-mail already registered", body = Error),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["admins"],
    operation_id = "registerAdmin"
)]
pub async fn register(
    state: web::Data<HttpState>,
    caller: OptionalPrincipal,
    payload: web::Json<RegisterAdminRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let registration = AdminRegistration::try_new(
        &body.name,
        &body.email,
        &body.password,
        body.role.as_deref(),
    )?;
    let session = state.admins.register(caller.0, registration).await?;
    Ok(HttpResponse::Created().json(AdminAuthResponse::from(session)))
}

/// Staff sign-in.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AdminAuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["admins"],
    operation_id = "loginAdmin",
    security([])
)]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AdminAuthResponse>> {
    let credentials = LoginCredentials::try_from(&payload.into_inner())?;
    let session = state.admins.login(credentials).await?;
    Ok(web::Json(session.into()))
}

/// Profile of the signed-in staff member.
#[utoipa::path(
    get,
    path = "/api/admin/profile",
    responses(
        (status = 200, description = "Profile", body = Admin),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff only", body = Error)
    ),
    tags = ["admins"],
    operation_id = "getAdminProfile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedAdmin,
) -> ApiResult<web::Json<Admin>> {
    Ok(web::Json(state.admins.profile(caller.id()).await?))
}

/// Change the signed-in staff member's password.
#[utoipa::path(
    patch,
    path = "/api/admin/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid new password", body = Error),
        (status = 401, description = "Current password incorrect", body = Error)
    ),
    tags = ["admins"],
    operation_id = "changeAdminPassword"
)]
#[patch("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedAdmin,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let (current, new_password) = payload.into_inner().into_parts()?;
    state
        .admins
        .change_password(caller.id(), current, new_password)
        .await?;
    Ok(web::Json(MessageResponse::new("Password changed")))
}

/// Request a staff password reset link.
#[utoipa::path(
    post,
    path = "/api/admin/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["admins"],
    operation_id = "forgotAdminPassword",
    security([])
)]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .admins
        .forgot_password(payload.into_inner().email)
        .await?;
    Ok(web::Json(MessageResponse::new(RESET_REQUESTED_MESSAGE)))
}

/// Set a new staff password with a mailed reset token.
#[utoipa::path(
    post,
    path = "/api/admin/reset-password/{token}",
    params(("token" = String, Path, description = "Token from the reset link")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = Error),
        (status = 429, description = "Too many attempts", body = Error)
    ),
    tags = ["admins"],
    operation_id = "resetAdminPassword",
    security([])
)]
pub async fn reset_password(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let token = ResetToken::from_raw(&path.into_inner())?;
    let password = Password::new("password", &payload.into_inner().password)?;
    state.admins.reset_password(token, password).await?;
    Ok(web::Json(MessageResponse::new("Password has been reset")))
}

/// Newest fan accounts first, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Fan accounts", body = UserPage),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 403, description = "Staff only", body = Error)
    ),
    tags = ["admins"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<Page<User>>> {
    let query = query.into_inner();
    let page = page_request(query.page, query.limit)?;
    let users = state.users.list_users(non_blank(query.search), page).await?;
    Ok(web::Json(users))
}

/// One fan account.
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "Fan account id")),
    responses(
        (status = 200, description = "Fan account", body = User),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["admins"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_id(&path.into_inner(), "id", UserId::parse)?;
    Ok(web::Json(state.users.find_user(id).await?))
}

/// Delete a fan account.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "Fan account id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["admins"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedAdmin,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path.into_inner(), "id", UserId::parse)?;
    state.users.delete_user(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Staff accounts, oldest first.
#[utoipa::path(
    get,
    path = "/api/admin/admins",
    params(PageQuery),
    responses(
        (status = 200, description = "Staff accounts", body = AdminPage),
        (status = 403, description = "Super admin required", body = Error)
    ),
    tags = ["admins"],
    operation_id = "listAdmins"
)]
#[get("/admins")]
pub async fn list_admins(
    state: web::Data<HttpState>,
    _caller: SuperAdmin,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Admin>>> {
    let page = page_request(query.page, query.limit)?;
    Ok(web::Json(state.admins.list_admins(page).await?))
}

/// Delete another staff account.
#[utoipa::path(
    delete,
    path = "/api/admin/admins/{id}",
    params(("id" = String, Path, description = "Staff account id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Super admin required", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 400, description = "Cannot delete own account", body = Error)
    ),
    tags = ["admins"],
    operation_id = "deleteAdmin"
)]
#[delete("/admins/{id}")]
pub async fn delete_admin(
    state: web::Data<HttpState>,
    caller: SuperAdmin,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let target = parse_id(&path.into_inner(), "id", AdminId::parse)?;
    state.admins.delete_admin(caller.0, target).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Routes under `/api/admin`.
pub fn scope(limiter: &Arc<RateLimiter>) -> Scope {
    let limit = |name: &'static str| RateLimit::new(Arc::clone(limiter), name);
    web::scope("/api/admin")
        .service(
            web::resource("/register")
                .wrap(limit("admin.register"))
                .route(web::post().to(register)),
        )
        .service(
            web::resource("/login")
                .wrap(limit("admin.login"))
                .route(web::post().to(login)),
        )
        .service(
            web::resource("/forgot-password")
                .wrap(limit("admin.forgot_password"))
                .route(web::post().to(forgot_password)),
        )
        .service(
            web::resource("/reset-password/{token}")
                .wrap(limit("admin.reset_password"))
                .route(web::post().to(reset_password)),
        )
        .service(profile)
        .service(change_password)
        .service(list_users)
        .service(get_user)
        .service(delete_user)
        .service(list_admins)
        .service(delete_admin)
}

#[cfg(test)]
#[path = "admins_tests.rs"]
mod tests;
