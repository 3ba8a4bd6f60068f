//! Tests for pet listing handlers.

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::domain::ports::{MockIdentityProvider, MockPetCatalogueCommand};
use crate::domain::{
    AccessToken, PetCatalogueService, ProviderSession, SessionIdentity, UserId, sample_pets,
};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{SESSION_COOKIE, test_session_middleware};
use crate::outbound::memory::InMemoryPetRepository;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::Value;

fn state_with(command: Option<Arc<dyn crate::domain::ports::PetCatalogueCommand>>) -> HttpState {
    let repository = InMemoryPetRepository::with_records(
        sample_pets::records().expect("sample dataset"),
    )
    .expect("unique ids");
    let service = Arc::new(PetCatalogueService::new(Arc::new(repository)));
    HttpState::new(
        HttpStatePorts {
            pets: service.clone(),
            pets_command: command.unwrap_or(service),
            identity: Arc::new(MockIdentityProvider::new()),
        },
        Duration::from_secs(1),
        url::Url::parse("http://localhost:8080").expect("origin"),
    )
}

async fn sign_in_for_test(session: SessionContext) -> ApiResult<HttpResponse> {
    session.persist(&ProviderSession {
        access_token: AccessToken::new("t"),
        identity: SessionIdentity {
            user_id: UserId::new("admin").expect("user id"),
            email: "admin@pets.com".into(),
            display_name: None,
        },
    })?;
    Ok(HttpResponse::Ok().finish())
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
        .route("/test/sign-in", web::post().to(sign_in_for_test))
        .service(
            web::scope("/api/v1")
                .service(list_pets)
                .service(create_pet)
                .service(pet_contact)
                .service(get_pet)
                .service(update_pet)
                .service(delete_pet),
        )
}

async fn signed_in_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/test/sign-in")
            .to_request(),
    )
    .await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("session cookie")
        .into_owned()
}

fn new_pet() -> Value {
    serde_json::json!({
        "name": "Pipoca",
        "age": 1,
        "breed": "SRD",
        "vaccines": ["V10"],
        "institution": {
            "name": "Abrigo Central",
            "email": "abrigo@example.org",
            "whatsapp": "(11) 99999-0000"
        }
    })
}

#[rstest]
#[case("/api/v1/pets", 6, &["Luna", "Milo", "Bella", "Simba", "Rex", "Mel"])]
#[case("/api/v1/pets?search=gato", 1, &["Simba"])]
#[case("/api/v1/pets?search=GAT", 2, &["Simba", "Mel"])]
#[case("/api/v1/pets?age=senior", 0, &[])]
#[case("/api/v1/pets?search=gat&age=young&vaccines=partial", 1, &["Mel"])]
#[actix_web::test]
async fn lists_filtered_pets(
    #[case] uri: &str,
    #[case] matched: usize,
    #[case] names: &[&str],
) {
    let app = actix_test::init_service(test_app(state_with(None))).await;

    let body: PetListResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get().uri(uri).to_request(),
    )
    .await;
    assert_eq!(body.total, 6);
    assert_eq!(body.matched, matched);
    let actual: Vec<&str> = body.pets.iter().map(|pet| pet.name.as_str()).collect();
    assert_eq!(actual, names);
}

#[rstest]
#[actix_web::test]
async fn unknown_bucket_is_rejected() {
    let app = actix_test::init_service(test_app(state_with(None))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/pets?age=ancient")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "age");
}

#[rstest]
#[actix_web::test]
async fn missing_pet_is_404() {
    let app = actix_test::init_service(test_app(state_with(None))).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/pets/404")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn contact_links_are_encoded() {
    let app = actix_test::init_service(test_app(state_with(None))).await;

    let body: ContactLinksResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/pets/1/contact")
            .to_request(),
    )
    .await;
    assert!(body.whatsapp_url.starts_with("https://wa.me/55"));
    assert!(body.mailto_url.starts_with("mailto:"));
    assert!(!body.mailto_url.contains(' '));
}

#[rstest]
#[case::create(actix_test::TestRequest::post().uri("/api/v1/pets").set_json(new_pet()))]
#[case::update(actix_test::TestRequest::patch().uri("/api/v1/pets/1").set_json(serde_json::json!({"age": 3})))]
#[case::delete(actix_test::TestRequest::delete().uri("/api/v1/pets/1"))]
#[actix_web::test]
async fn mutations_require_login(#[case] request: actix_test::TestRequest) {
    let app = actix_test::init_service(test_app(state_with(None))).await;

    let res = actix_test::call_service(&app, request.to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["redirectTo"], "/auth");
}

#[rstest]
#[actix_web::test]
async fn create_update_delete_round_trip() {
    let app = actix_test::init_service(test_app(state_with(None))).await;
    let cookie = signed_in_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/pets")
            .cookie(cookie.clone())
            .set_json(new_pet())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: PetResponse = actix_test::read_body_json(res).await;
    assert_eq!(created.image_url, crate::domain::PLACEHOLDER_IMAGE_URL);

    let updated: PetResponse = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/pets/{}", created.id))
            .cookie(cookie.clone())
            .set_json(serde_json::json!({"age": 4}))
            .to_request(),
    )
    .await;
    assert_eq!(updated.age, 4);
    assert_eq!(updated.name, "Pipoca");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/pets/{}", created.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/pets/{}", created.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn invalid_draft_reports_field() {
    let app = actix_test::init_service(test_app(state_with(None))).await;
    let cookie = signed_in_cookie(&app).await;
    let mut body = new_pet();
    body["age"] = serde_json::json!(31);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/pets")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "age");
    assert_eq!(body["details"]["code"], "age_out_of_range");
}

#[rstest]
#[actix_web::test]
async fn command_port_receives_signed_in_actor() {
    let mut command = MockPetCatalogueCommand::new();
    command
        .expect_delete_pet()
        .withf(|actor, id| actor.email == "admin@pets.com" && id.as_str() == "2")
        .times(1)
        .return_once(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(state_with(Some(Arc::new(command))))).await;
    let cookie = signed_in_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/pets/2")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
