//! Session cookie helpers so handlers deal in domain sessions, not Actix
//! session keys.
//!
//! The cookie carries the provider session (identity plus bearer token). It
//! is encrypted by the session middleware, so the token never reaches the
//! browser in clear text.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use tracing::warn;

use crate::domain::{AccessToken, Error, LOGIN_PATH, ProviderSession, SessionIdentity};

pub(crate) const PROVIDER_SESSION_KEY: &str = "provider_session";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the signed-in session in the cookie.
    pub fn persist(&self, session: &ProviderSession) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(PROVIDER_SESSION_KEY, session)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The stored provider session. Unreadable cookies count as signed out.
    pub fn provider_session(&self) -> Result<Option<ProviderSession>, Error> {
        match self.0.get::<ProviderSession>(PROVIDER_SESSION_KEY) {
            Ok(session) => Ok(session),
            Err(error) => {
                warn!(%error, "discarding unreadable session cookie");
                self.0.remove(PROVIDER_SESSION_KEY);
                Ok(None)
            }
        }
    }

    pub fn access_token(&self) -> Result<Option<AccessToken>, Error> {
        Ok(self.provider_session()?.map(|session| session.access_token))
    }

    /// Signed-in identity, or `401` pointing the client at the login page.
    pub fn require_identity(&self) -> Result<SessionIdentity, Error> {
        self.provider_session()?
            .map(|session| session.identity)
            .ok_or_else(|| {
                Error::unauthorized("login required")
                    .with_details(json!({ "redirectTo": LOGIN_PATH }))
            })
    }

    /// Drop everything stored for this browser.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::inbound::http::test_utils::{SESSION_COOKIE, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use serde_json::Value;

    fn provider_session() -> ProviderSession {
        ProviderSession {
            access_token: AccessToken::new("cookie-token"),
            identity: SessionIdentity {
                user_id: UserId::new("u-7").expect("user id"),
                email: "ana@pets.com".into(),
                display_name: Some("Ana".into()),
            },
        }
    }

    #[actix_web::test]
    async fn round_trips_provider_session() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.persist(&provider_session())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let identity = session.require_identity()?;
                        let token = session.access_token()?;
                        Ok::<_, Error>(HttpResponse::Ok().json(json!({
                            "email": identity.email,
                            "token": token.as_ref().map(AccessToken::expose),
                        })))
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .expect("session cookie set")
            .into_owned();
        assert!(!cookie.value().contains("cookie-token"));

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(body, json!({"email": "ana@pets.com", "token": "cookie-token"}));
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorised_with_login_redirect() {
        let app = test::init_service(App::new().wrap(test_session_middleware()).route(
            "/require",
            web::get().to(|session: SessionContext| async move {
                session.require_identity()?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["redirectTo"], "/auth");
    }

    #[actix_web::test]
    async fn tampered_session_value_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(PROVIDER_SESSION_KEY, "not-a-session")
                            .expect("set invalid session");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/require",
                    web::get().to(|session: SessionContext| async move {
                        session.require_identity()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .expect("session cookie set")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
