//! Account API handlers.
//!
//! ```text
//! POST /api/signup {"name":"Ada","email":"ada@example.com","password":"pw","phone":"017"}
//! POST /api/login {"email":"ada@example.com","password":"pw"}
//! POST /api/logout
//! GET /api/user
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, SignupDetails, SignupValidationError, User,
    UserId,
};

use super::ApiResult;
use super::session::{SessionContext, removal_cookie, session_cookie};
use super::state::HttpState;

/// Signup request body for `POST /api/signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
}

/// Login request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<&SignupRequest> for SignupDetails {
    type Error = SignupValidationError;

    fn try_from(value: &SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.name, &value.email, &value.password, &value.phone)
    }
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Name and id returned after a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginUser {
    pub id: UserId,
    pub name: String,
}

/// `POST /api/login` success body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUser,
}

/// `POST /api/signup` success body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: User,
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyEmail => ("email", "empty_email"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = SignupResponse),
        (status = 400, description = "Missing fields or email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<SignupResponse>> {
    let details = SignupDetails::try_from(&payload.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let user = state.signup.signup(&details).await?;
    info!(user_id = %user.id, "account created");
    Ok(web::Json(SignupResponse {
        message: "Account created successfully".to_owned(),
        user,
    }))
}

/// Authenticate and establish a session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "session_id cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(&payload.into_inner())
        .map_err(|err| map_login_validation_error(&err))?;
    let outcome = state.login.login(&credentials).await?;
    let cookie = session_cookie(&outcome.session, state.cookies);
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        message: "Login successful".to_owned(),
        user: LoginUser {
            id: outcome.user.id,
            name: outcome.user.name,
        },
    }))
}

/// Revoke the presented session and clear the cookie.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(token) = session.token() {
        state.login.logout(token).await?;
    }
    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(state.cookies))
        .json(json!({ "message": "Logged out successfully" })))
}

/// The signed-in user.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user(state.sessions.as_ref()).await?;
    let user = state.users.current_user(user_id).await?;
    Ok(web::Json(user))
}
