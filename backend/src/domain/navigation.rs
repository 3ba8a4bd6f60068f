//! Client route table and the authenticated-route gate.

use serde::Serialize;

use super::{PetId, SessionState};

/// Where unauthenticated visitors to protected routes are sent.
pub const LOGIN_PATH: &str = "/auth";
/// Landing page after a successful login without `returnTo`.
pub const DEFAULT_AFTER_LOGIN: &str = "/pets";

/// Known client routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Auth,
    ForgotPassword,
    /// Legacy alias for [`Route::Auth`].
    Login,
    Pets,
    PetNew,
    PetDetail(PetId),
    PetEdit(PetId),
    NotFound,
}

impl Route {
    /// Match a path, ignoring any query string and one trailing slash.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = match path.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => path,
        };
        let segments: Vec<&str> = trimmed
            .strip_prefix('/')
            .map(|rest| rest.split('/').collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [""] => Self::Home,
            ["auth"] => Self::Auth,
            ["forgot-password"] => Self::ForgotPassword,
            ["login"] => Self::Login,
            ["pets"] => Self::Pets,
            ["pets", "new"] => Self::PetNew,
            ["pets", id] => pet_route(id, Self::PetDetail),
            ["pets", id, "edit"] => pet_route(id, Self::PetEdit),
            _ => Self::NotFound,
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::PetNew | Self::PetEdit(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Auth => "auth",
            Self::ForgotPassword => "forgot_password",
            Self::Login => "login",
            Self::Pets => "pets",
            Self::PetNew => "pet_new",
            Self::PetDetail(_) => "pet_detail",
            Self::PetEdit(_) => "pet_edit",
            Self::NotFound => "not_found",
        }
    }
}

fn pet_route(raw: &str, build: fn(PetId) -> Route) -> Route {
    PetId::new(raw).map_or(Route::NotFound, build)
}

/// Result of resolving a path against the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Render {
        route: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    Redirect {
        to: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        return_to: Option<String>,
    },
    /// Session still loading; show a spinner.
    Pending {
        route: &'static str,
    },
    NotFound,
}

/// Decide what the client should do for `path` given `state`.
///
/// # Examples
/// ```
/// use adoption_backend::domain::{NavigationOutcome, SessionState, resolve};
///
/// let outcome = resolve("/pets/new", &SessionState::Anonymous);
/// assert_eq!(
///     outcome,
///     NavigationOutcome::Redirect { to: "/auth".into(), return_to: Some("/pets/new".into()) },
/// );
/// ```
pub fn resolve(path: &str, state: &SessionState) -> NavigationOutcome {
    let route = Route::parse(path);
    match route {
        Route::NotFound => NavigationOutcome::NotFound,
        Route::Login => NavigationOutcome::Redirect {
            to: LOGIN_PATH.to_owned(),
            return_to: None,
        },
        ref protected if protected.requires_auth() => match state {
            SessionState::Authenticated(_) => NavigationOutcome::Render {
                route: protected.name(),
            },
            SessionState::Loading => NavigationOutcome::Pending {
                route: protected.name(),
            },
            SessionState::Anonymous | SessionState::Authenticating => {
                NavigationOutcome::Redirect {
                    to: LOGIN_PATH.to_owned(),
                    return_to: Some(path.to_owned()),
                }
            }
        },
        open => NavigationOutcome::Render { route: open.name() },
    }
}

/// Post-login destination. Only same-site absolute paths are honoured.
///
/// Browsers read `\` as `/`, so backslashes and control characters are
/// refused outright.
pub fn after_login(return_to: Option<&str>) -> String {
    return_to
        .filter(|target| is_same_site_path(target))
        .unwrap_or(DEFAULT_AFTER_LOGIN)
        .to_owned()
}

fn is_same_site_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.chars().any(|c| c == '\\' || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessToken, ProviderSession, SessionIdentity, UserId};
    use rstest::rstest;

    fn signed_in() -> SessionState {
        SessionState::Authenticated(ProviderSession {
            access_token: AccessToken::new("t"),
            identity: SessionIdentity {
                user_id: UserId::new("admin").expect("user id"),
                email: "admin@pets.com".into(),
                display_name: None,
            },
        })
    }

    #[rstest]
    #[case("/", "home")]
    #[case("/auth", "auth")]
    #[case("/forgot-password", "forgot_password")]
    #[case("/pets", "pets")]
    #[case("/pets/", "pets")]
    #[case("/pets?search=luna", "pets")]
    #[case("/pets/new", "pet_new")]
    #[case("/pets/3", "pet_detail")]
    #[case("/pets/3/edit", "pet_edit")]
    #[case("/nope", "not_found")]
    #[case("/pets/3/extra", "not_found")]
    #[case("pets", "not_found")]
    fn parses_routes(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(Route::parse(path).name(), expected);
    }

    #[rstest]
    #[case("/pets/new")]
    #[case("/pets/2/edit")]
    fn anonymous_visitors_are_sent_to_login(#[case] path: &str) {
        assert_eq!(
            resolve(path, &SessionState::Anonymous),
            NavigationOutcome::Redirect {
                to: "/auth".into(),
                return_to: Some(path.into()),
            }
        );
    }

    #[rstest]
    fn loading_session_is_pending_not_redirected() {
        assert_eq!(
            resolve("/pets/new", &SessionState::Loading),
            NavigationOutcome::Pending { route: "pet_new" }
        );
    }

    #[rstest]
    fn signed_in_users_reach_protected_routes() {
        assert_eq!(
            resolve("/pets/2/edit", &signed_in()),
            NavigationOutcome::Render { route: "pet_edit" }
        );
    }

    #[rstest]
    #[case(SessionState::Anonymous)]
    #[case(SessionState::Loading)]
    fn public_routes_render_for_everyone(#[case] state: SessionState) {
        assert_eq!(
            resolve("/pets/2", &state),
            NavigationOutcome::Render {
                route: "pet_detail"
            }
        );
    }

    #[rstest]
    fn legacy_login_redirects_to_auth() {
        assert_eq!(
            resolve("/login", &signed_in()),
            NavigationOutcome::Redirect {
                to: "/auth".into(),
                return_to: None,
            }
        );
    }

    #[rstest]
    #[case(None, "/pets")]
    #[case(Some("/pets/new"), "/pets/new")]
    #[case(Some("https://evil.example"), "/pets")]
    #[case(Some("//evil.example"), "/pets")]
    #[case(Some("/\\evil.example"), "/pets")]
    #[case(Some("/\\/evil.example"), "/pets")]
    #[case(Some("/\t/evil.example"), "/pets")]
    fn login_destination(#[case] return_to: Option<&str>, #[case] expected: &str) {
        assert_eq!(after_login(return_to), expected);
    }

    #[rstest]
    fn redirect_serialises_camel_case() {
        let json = serde_json::to_value(resolve("/pets/new", &SessionState::Anonymous))
            .expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({"outcome": "redirect", "to": "/auth", "returnTo": "/pets/new"})
        );
    }
}
