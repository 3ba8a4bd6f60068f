//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/login          {"email":"admin@pets.com","password":"admin123"}
//! POST /api/v1/auth/signup         {"email":..,"password":..,"confirmPassword":..,"name":..}
//! POST /api/v1/auth/logout
//! POST /api/v1/auth/password-reset {"email":"ana@pets.com"}
//! GET  /api/v1/session
//! ```
//!
//! Every request builds its own [`crate::domain::SessionManager`]; the
//! cookie is the only state that survives between requests.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, SessionIdentity, SessionState, after_login};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login form body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "admin@pets.com")]
    pub email: String,
    pub password: String,
    /// Page the user was trying to reach before being sent to login.
    #[serde(default)]
    #[schema(example = "/pets/new")]
    pub return_to: Option<String>,
}

/// Signup form body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[schema(example = "Ana Souza")]
    pub name: String,
}

/// Forgot-password form body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetBody {
    pub email: String,
}

/// Signed-in user as shown to the client.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserResponse {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<&SessionIdentity> for SessionUserResponse {
    fn from(identity: &SessionIdentity) -> Self {
        Self {
            id: identity.user_id.to_string(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
        }
    }
}

/// Successful login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: SessionUserResponse,
    #[schema(example = "/pets")]
    pub redirect_to: String,
}

/// Current session as seen by the server.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(example = "authenticated")]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUserResponse>,
}

impl From<&SessionState> for SessionResponse {
    fn from(state: &SessionState) -> Self {
        Self {
            state: state.name().to_owned(),
            user: state.identity().map(SessionUserResponse::from),
        }
    }
}

/// Acknowledgement for requests whose outcome arrives by email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedResponse {
    pub message: String,
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Fields missing or malformed", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema),
        (status = 504, description = "Identity provider timed out", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest {
        email,
        password,
        return_to,
    } = payload.into_inner();
    let manager = state.session_manager();
    manager.initialise_anonymous();
    let identity = manager.login(&email, &password).await?;
    let provider_session = manager
        .provider_session()
        .ok_or_else(|| Error::internal("login finished without a session"))?;
    session.persist(&provider_session)?;
    info!(user_id = %identity.user_id, "signed in");
    Ok(web::Json(LoginResponse {
        user: SessionUserResponse::from(&identity),
        redirect_to: after_login(return_to.as_deref()),
    }))
}

/// Register a new account. The provider emails a confirmation link.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 202, description = "Confirmation email sent", body = AcceptedResponse),
        (status = 400, description = "Invalid form or rejected by provider", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    state
        .session_manager()
        .signup(
            &body.email,
            &body.password,
            &body.confirm_password,
            &body.name,
            &state.signup_redirect_url(),
        )
        .await?;
    Ok(HttpResponse::Accepted().json(AcceptedResponse {
        message: "check your email to confirm the account".into(),
    }))
}

/// Sign out. Always clears the cookie, even when the provider call fails.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let manager = state.session_manager();
    match session.provider_session()? {
        Some(stored) => manager.initialise_with(stored),
        None => manager.initialise_anonymous(),
    };
    manager.logout().await;
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// Email a password reset link.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset",
    request_body = PasswordResetBody,
    responses(
        (status = 202, description = "Reset email sent", body = AcceptedResponse),
        (status = 400, description = "Invalid email or rejected by provider", body = ErrorSchema),
        (status = 503, description = "Identity provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/auth/password-reset")]
pub async fn password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetBody>,
) -> ApiResult<HttpResponse> {
    state
        .session_manager()
        .request_password_reset(&payload.email, &state.password_reset_redirect_url())
        .await?;
    Ok(HttpResponse::Accepted().json(AcceptedResponse {
        message: "check your email for the reset link".into(),
    }))
}

/// Restore the session behind the cookie, asking the provider whether the
/// token is still good. Stale cookies are dropped.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses((status = 200, description = "Current session", body = SessionResponse)),
    tags = ["session"],
    operation_id = "currentSession",
    security([])
)]
#[get("/session")]
pub async fn current_session(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SessionResponse>> {
    let manager = state.session_manager();
    let resolved = match session.access_token()? {
        Some(token) => {
            let resolved = manager.initialise(Some(token)).await;
            match manager.provider_session() {
                Some(current) => session.persist(&current)?,
                None => session.clear(),
            }
            resolved
        }
        None => manager.initialise_anonymous(),
    };
    Ok(web::Json(SessionResponse::from(&resolved)))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
