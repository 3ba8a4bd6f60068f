//! Tests for authentication handlers.

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::domain::ports::{IdentityProviderError, MockIdentityProvider};
use crate::domain::{
    AccessToken, PetCatalogueService, ProviderSession, SessionIdentity, UserId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::test_utils::{SESSION_COOKIE, test_session_middleware};
use crate::outbound::memory::InMemoryPetRepository;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

fn admin_session() -> ProviderSession {
    ProviderSession {
        access_token: AccessToken::new("admin-token"),
        identity: SessionIdentity {
            user_id: UserId::new("admin").expect("user id"),
            email: "admin@pets.com".into(),
            display_name: Some("Admin".into()),
        },
    }
}

fn state(provider: MockIdentityProvider) -> HttpState {
    let service = Arc::new(PetCatalogueService::new(Arc::new(
        InMemoryPetRepository::new(),
    )));
    HttpState::new(
        HttpStatePorts {
            pets: service.clone(),
            pets_command: service,
            identity: Arc::new(provider),
        },
        Duration::from_secs(1),
        url::Url::parse("https://adota.example.org").expect("origin"),
    )
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(signup)
                .service(logout)
                .service(password_reset)
                .service(current_session),
        )
}

fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}

fn accepting_admin() -> MockIdentityProvider {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .withf(|credentials| {
            credentials.email() == "admin@pets.com" && credentials.password() == "admin123"
        })
        .returning(|_| Ok(admin_session()));
    provider
}

async fn login_with(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    body: Value,
) -> actix_web::dev::ServiceResponse {
    actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(body)
            .to_request(),
    )
    .await
}

#[rstest]
#[case(None, "/pets")]
#[case(Some("/pets/new"), "/pets/new")]
#[case(Some("https://evil.example"), "/pets")]
#[case(Some("//evil.example"), "/pets")]
#[case(Some("/\\evil.example"), "/pets")]
#[actix_web::test]
async fn login_sets_cookie_and_redirects(#[case] return_to: Option<&str>, #[case] expected: &str) {
    let app = actix_test::init_service(test_app(state(accepting_admin()))).await;

    let res = login_with(
        &app,
        json!({"email": "admin@pets.com", "password": "admin123", "returnTo": return_to}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("session cookie");
    assert!(!cookie.value().contains("admin-token"));
    let body: LoginResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.redirect_to, expected);
    assert_eq!(body.user.email, "admin@pets.com");
    assert_eq!(body.user.display_name.as_deref(), Some("Admin"));
}

#[rstest]
#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .times(1)
        .returning(|_| Err(IdentityProviderError::invalid_credentials()));
    let app = actix_test::init_service(test_app(state(provider))).await;

    let res = login_with(&app, json!({"email": "admin@pets.com", "password": "nope"})).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&res).is_none());
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["reason"], "invalid_credentials");
}

#[rstest]
#[case(json!({"email": "", "password": "admin123"}), "fields_missing")]
#[case(json!({"email": "admin@pets.com", "password": ""}), "fields_missing")]
#[case(json!({"email": "not-an-email", "password": "admin123"}), "invalid_email")]
#[actix_web::test]
async fn malformed_login_never_reaches_provider(#[case] body: Value, #[case] reason: &str) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_in_with_password().times(0);
    let app = actix_test::init_service(test_app(state(provider))).await;

    let res = login_with(&app, body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["reason"], reason);
}

#[rstest]
#[case(IdentityProviderError::unavailable("connection refused"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(IdentityProviderError::timeout("slow"), StatusCode::GATEWAY_TIMEOUT)]
#[actix_web::test]
async fn provider_outage_maps_to_gateway_status(
    #[case] error: IdentityProviderError,
    #[case] status: StatusCode,
) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .return_once(move |_| Err(error));
    let app = actix_test::init_service(test_app(state(provider))).await;

    let res = login_with(&app, json!({"email": "admin@pets.com", "password": "admin123"})).await;
    assert_eq!(res.status(), status);
}

#[rstest]
#[actix_web::test]
async fn session_restores_from_cookie() {
    let mut provider = accepting_admin();
    provider
        .expect_current_session()
        .withf(|token| token.as_ref().map(AccessToken::expose) == Some("admin-token"))
        .times(1)
        .returning(|_| Ok(Some(admin_session())));
    let app = actix_test::init_service(test_app(state(provider))).await;
    let login_res = login_with(&app, json!({"email": "admin@pets.com", "password": "admin123"})).await;
    let cookie = session_cookie(&login_res).expect("session cookie");

    let body: SessionResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(body.state, "authenticated");
    assert_eq!(body.user.map(|user| user.id), Some("admin".to_owned()));
}

#[rstest]
#[actix_web::test]
async fn session_without_cookie_is_anonymous_without_provider_call() {
    let mut provider = MockIdentityProvider::new();
    provider.expect_current_session().times(0);
    let app = actix_test::init_service(test_app(state(provider))).await;

    let body: SessionResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .to_request(),
    )
    .await;
    assert_eq!(body.state, "anonymous");
    assert!(body.user.is_none());
}

#[rstest]
#[actix_web::test]
async fn expired_token_drops_cookie() {
    let mut provider = accepting_admin();
    provider.expect_current_session().returning(|_| Ok(None));
    let app = actix_test::init_service(test_app(state(provider))).await;
    let login_res = login_with(&app, json!({"email": "admin@pets.com", "password": "admin123"})).await;
    let cookie = session_cookie(&login_res).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/session")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let removal = session_cookie(&res).expect("cookie removal");
    assert_eq!(removal.value(), "");
    let body: SessionResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.state, "anonymous");
}

#[rstest]
#[actix_web::test]
async fn logout_signs_out_with_stored_token_and_clears_cookie() {
    let mut provider = accepting_admin();
    provider
        .expect_sign_out()
        .withf(|token| token.expose() == "admin-token")
        .times(1)
        .returning(|_| Err(IdentityProviderError::unavailable("down")));
    let app = actix_test::init_service(test_app(state(provider))).await;
    let login_res = login_with(&app, json!({"email": "admin@pets.com", "password": "admin123"})).await;
    let cookie = session_cookie(&login_res).expect("session cookie");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let removal = session_cookie(&res).expect("cookie removal");
    assert_eq!(removal.value(), "");
}

#[rstest]
#[actix_web::test]
async fn signup_passes_origin_redirect() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .withf(|form, redirect| {
            form.email() == "ana@pets.com"
                && form.display_name() == "Ana"
                && redirect == "https://adota.example.org/"
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(state(provider))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({
                "email": "ana@pets.com",
                "password": "secret1",
                "confirmPassword": "secret1",
                "name": "Ana"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[rstest]
#[case("secret1", "secret2", "passwords_do_not_match")]
#[case("abc", "abc", "password_too_short")]
#[case("secret1", "", "fields_missing")]
#[actix_web::test]
async fn signup_form_errors_skip_provider(
    #[case] password: &str,
    #[case] confirm: &str,
    #[case] reason: &str,
) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_up().times(0);
    let app = actix_test::init_service(test_app(state(provider))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({
                "email": "ana@pets.com",
                "password": password,
                "confirmPassword": confirm,
                "name": "Ana"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["reason"], reason);
}

#[rstest]
#[actix_web::test]
async fn provider_rejection_message_reaches_client() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .returning(|_, _| Err(IdentityProviderError::rejected("User already registered")));
    let app = actix_test::init_service(test_app(state(provider))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({
                "email": "ana@pets.com",
                "password": "secret1",
                "confirmPassword": "secret1",
                "name": "Ana"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("User already registered"))
    );
}

#[rstest]
#[actix_web::test]
async fn password_reset_links_back_to_login() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_reset_password_for_email()
        .withf(|request, redirect| {
            request.email() == "ana@pets.com" && redirect == "https://adota.example.org/auth"
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(state(provider))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/password-reset")
            .set_json(json!({"email": "ana@pets.com"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}
