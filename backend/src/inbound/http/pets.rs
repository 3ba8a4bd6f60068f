//! Pet listing API handlers.
//!
//! ```text
//! GET    /api/v1/pets?search=gat&age=young&vaccines=partial
//! GET    /api/v1/pets/{id}
//! GET    /api/v1/pets/{id}/contact
//! POST   /api/v1/pets
//! PATCH  /api/v1/pets/{id}
//! DELETE /api/v1/pets/{id}
//! ```

use actix_web::{HttpResponse, delete, get, http::header, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AgeBucket, ContactLinks, Error, InstitutionInput, PetDraft, PetDraftInput, PetFilter, PetId,
    PetPatch, PetPatchInput, PetRecord, VaccineBucket,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Institution contact as sent and returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionBody {
    #[schema(example = "ONG Amigos dos Animais")]
    pub name: String,
    #[schema(example = "contato@amigosanimais.org")]
    pub email: String,
    #[schema(example = "11987654321")]
    pub whatsapp: String,
}

impl From<InstitutionBody> for InstitutionInput {
    fn from(value: InstitutionBody) -> Self {
        Self {
            name: value.name,
            email: value.email,
            whatsapp: value.whatsapp,
        }
    }
}

/// Pet listing returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetResponse {
    pub id: String,
    #[schema(example = "Luna")]
    pub name: String,
    #[schema(example = 2)]
    pub age: u32,
    pub breed: String,
    pub vaccines: Vec<String>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub institution: InstitutionBody,
}

impl From<&PetRecord> for PetResponse {
    fn from(record: &PetRecord) -> Self {
        let institution = record.institution();
        Self {
            id: record.id().to_string(),
            name: record.name().to_owned(),
            age: record.age().years(),
            breed: record.breed().to_owned(),
            vaccines: record.vaccines().as_slice().to_vec(),
            image_url: record.image_url().to_owned(),
            description: record.description().map(str::to_owned),
            institution: InstitutionBody {
                name: institution.name().to_owned(),
                email: institution.email().to_owned(),
                whatsapp: institution.whatsapp().to_owned(),
            },
        }
    }
}

/// Filtered listing plus counts for "showing N of M".
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetListResponse {
    pub pets: Vec<PetResponse>,
    /// Records in the store before filtering.
    pub total: usize,
    /// Records matching the filter.
    pub matched: usize,
}

/// Query string for `GET /api/v1/pets`.
#[derive(Debug, Default, Deserialize)]
pub struct PetListQuery {
    pub search: Option<String>,
    pub age: Option<String>,
    pub vaccines: Option<String>,
}

impl TryFrom<PetListQuery> for PetFilter {
    type Error = Error;

    fn try_from(query: PetListQuery) -> Result<Self, Self::Error> {
        let age = parse_bucket::<AgeBucket>("age", query.age.as_deref())?;
        let vaccines = parse_bucket::<VaccineBucket>("vaccines", query.vaccines.as_deref())?;
        Ok(PetFilter::new(query.search.as_deref().unwrap_or_default())
            .with_age(age)
            .with_vaccines(vaccines))
    }
}

fn parse_bucket<B>(field: &str, raw: Option<&str>) -> Result<B, Error>
where
    B: std::str::FromStr<Err = crate::domain::UnknownBucket> + Default,
{
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(B::default()),
        Some(value) => value.parse().map_err(|err: crate::domain::UnknownBucket| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": field, "code": "unknown_bucket" }))
        }),
    }
}

/// Create-form body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetRequest {
    pub name: String,
    pub age: i64,
    pub breed: String,
    #[serde(default)]
    pub vaccines: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub institution: InstitutionBody,
}

impl TryFrom<CreatePetRequest> for PetDraft {
    type Error = Error;

    fn try_from(value: CreatePetRequest) -> Result<Self, Self::Error> {
        let draft = PetDraft::try_from_input(PetDraftInput {
            name: value.name,
            age: value.age,
            breed: value.breed,
            vaccines: value.vaccines,
            image_url: value.image_url,
            description: value.description,
            institution: value.institution.into(),
        })?;
        Ok(draft)
    }
}

/// Edit-form body; omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePetRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub vaccines: Option<Vec<String>>,
    /// Blank keeps the current image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Blank clears the description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub institution: Option<InstitutionBody>,
}

impl TryFrom<UpdatePetRequest> for PetPatch {
    type Error = Error;

    fn try_from(value: UpdatePetRequest) -> Result<Self, Self::Error> {
        let patch = PetPatch::try_from_input(PetPatchInput {
            name: value.name,
            age: value.age,
            breed: value.breed,
            vaccines: value.vaccines,
            image_url: value.image_url,
            description: value.description,
            institution: value.institution.map(InstitutionInput::from),
        })?;
        Ok(patch)
    }
}

/// Deep links for contacting the pet's institution.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactLinksResponse {
    #[schema(example = "https://wa.me/5511987654321?text=Ol%C3%A1!")]
    pub whatsapp_url: String,
    #[schema(example = "mailto:contato@amigosanimais.org?subject=Interesse")]
    pub mailto_url: String,
}

impl From<ContactLinks> for ContactLinksResponse {
    fn from(value: ContactLinks) -> Self {
        Self {
            whatsapp_url: value.whatsapp_url,
            mailto_url: value.mailto_url,
        }
    }
}

fn parse_pet_id(raw: String) -> Result<PetId, Error> {
    PetId::new(raw).map_err(Error::from)
}

/// List pets matching the search text and buckets.
#[utoipa::path(
    get,
    path = "/api/v1/pets",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive text matched against name, breed and institution"),
        ("age" = Option<String>, Query, description = "all | young | adult | senior"),
        ("vaccines" = Option<String>, Query, description = "all | complete | partial")
    ),
    responses(
        (status = 200, description = "Matching pets", body = PetListResponse),
        (status = 400, description = "Unknown bucket", body = ErrorSchema)
    ),
    tags = ["pets"],
    operation_id = "listPets",
    security([])
)]
#[get("/pets")]
pub async fn list_pets(
    state: web::Data<HttpState>,
    query: web::Query<PetListQuery>,
) -> ApiResult<web::Json<PetListResponse>> {
    let filter = PetFilter::try_from(query.into_inner())?;
    let listing = state.pets.list_pets(&filter).await?;
    Ok(web::Json(PetListResponse {
        matched: listing.pets.len(),
        total: listing.total,
        pets: listing.pets.iter().map(PetResponse::from).collect(),
    }))
}

/// Fetch one pet.
#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}",
    params(("id" = String, Path, description = "Pet identifier")),
    responses(
        (status = 200, description = "Pet", body = PetResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["pets"],
    operation_id = "getPet",
    security([])
)]
#[get("/pets/{id}")]
pub async fn get_pet(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PetResponse>> {
    let id = parse_pet_id(path.into_inner())?;
    let record = state.pets.get_pet(&id).await?;
    Ok(web::Json(PetResponse::from(&record)))
}

/// WhatsApp and email links for adopting this pet.
#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}/contact",
    params(("id" = String, Path, description = "Pet identifier")),
    responses(
        (status = 200, description = "Contact links", body = ContactLinksResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["pets"],
    operation_id = "getPetContact",
    security([])
)]
#[get("/pets/{id}/contact")]
pub async fn pet_contact(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ContactLinksResponse>> {
    let id = parse_pet_id(path.into_inner())?;
    let links = state.pets.contact_links(&id).await?;
    Ok(web::Json(links.into()))
}

/// Create a listing.
#[utoipa::path(
    post,
    path = "/api/v1/pets",
    request_body = CreatePetRequest,
    responses(
        (status = 201, description = "Created", body = PetResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["pets"],
    operation_id = "createPet",
    security(("SessionCookie" = []))
)]
#[post("/pets")]
pub async fn create_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePetRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_identity()?;
    let draft = PetDraft::try_from(payload.into_inner())?;
    let record = state.pets_command.create_pet(&actor, draft).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/v1/pets/{}", record.id())))
        .json(PetResponse::from(&record)))
}

/// Change some fields of a listing.
#[utoipa::path(
    patch,
    path = "/api/v1/pets/{id}",
    params(("id" = String, Path, description = "Pet identifier")),
    request_body = UpdatePetRequest,
    responses(
        (status = 200, description = "Updated", body = PetResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["pets"],
    operation_id = "updatePet",
    security(("SessionCookie" = []))
)]
#[patch("/pets/{id}")]
pub async fn update_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdatePetRequest>,
) -> ApiResult<web::Json<PetResponse>> {
    let actor = session.require_identity()?;
    let id = parse_pet_id(path.into_inner())?;
    let patch = PetPatch::try_from(payload.into_inner())?;
    let record = state.pets_command.update_pet(&actor, &id, patch).await?;
    Ok(web::Json(PetResponse::from(&record)))
}

/// Remove a listing.
#[utoipa::path(
    delete,
    path = "/api/v1/pets/{id}",
    params(("id" = String, Path, description = "Pet identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["pets"],
    operation_id = "deletePet",
    security(("SessionCookie" = []))
)]
#[delete("/pets/{id}")]
pub async fn delete_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_identity()?;
    let id = parse_pet_id(path.into_inner())?;
    state.pets_command.delete_pet(&actor, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "pets_tests.rs"]
mod tests;
