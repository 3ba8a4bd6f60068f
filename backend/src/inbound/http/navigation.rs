//! Route gate for clients.
//!
//! ```text
//! GET /api/v1/navigation?path=/pets/new
//! ```
//!
//! Answers from the cookie alone; `GET /api/v1/session` is where the token
//! gets revalidated with the identity provider.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, NavigationOutcome, SessionState, resolve};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

/// What the client should do for the requested path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationResponse {
    /// `render`, `redirect`, `pending` or `not_found`.
    #[schema(example = "redirect")]
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "pet_new")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "/auth")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "/pets/new")]
    pub return_to: Option<String>,
}

impl From<NavigationOutcome> for NavigationResponse {
    fn from(outcome: NavigationOutcome) -> Self {
        let empty = Self {
            outcome: String::new(),
            route: None,
            to: None,
            return_to: None,
        };
        match outcome {
            NavigationOutcome::Render { route } => Self {
                outcome: "render".into(),
                route: Some(route.into()),
                ..empty
            },
            NavigationOutcome::Redirect { to, return_to } => Self {
                outcome: "redirect".into(),
                to: Some(to),
                return_to,
                ..empty
            },
            NavigationOutcome::Pending { route } => Self {
                outcome: "pending".into(),
                route: Some(route.into()),
                ..empty
            },
            NavigationOutcome::NotFound => Self {
                outcome: "not_found".into(),
                ..empty
            },
        }
    }
}

/// Resolve a client path against the current session.
#[utoipa::path(
    get,
    path = "/api/v1/navigation",
    params(("path" = String, Query, description = "Client route, e.g. /pets/1/edit")),
    responses(
        (status = 200, description = "Outcome", body = NavigationResponse),
        (status = 400, description = "Path missing", body = ErrorSchema)
    ),
    tags = ["navigation"],
    operation_id = "resolveNavigation",
    security([])
)]
#[get("/navigation")]
pub async fn navigation(
    session: SessionContext,
    query: web::Query<NavigationQuery>,
) -> ApiResult<web::Json<NavigationResponse>> {
    let path = query.path.trim();
    if path.is_empty() {
        return Err(Error::invalid_request("path must not be empty"));
    }
    let state = match session.provider_session()? {
        Some(stored) => SessionState::Authenticated(stored),
        None => SessionState::Anonymous,
    };
    Ok(web::Json(resolve(path, &state).into()))
}
