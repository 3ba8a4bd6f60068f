//! Domain types, ports, and services.
//!
//! Nothing in here knows about HTTP or a concrete identity provider. Inbound
//! adapters call the driving ports in [`ports`]; outbound adapters implement
//! the driven ones.
//!
//! Public surface:
//! - [`PetRecord`], [`PetDraft`], [`PetPatch`] and their validated fields.
//! - [`PetFilter`] with the age and vaccine buckets.
//! - [`ContactLinks`] for WhatsApp and email deep links.
//! - [`SessionState`] and [`SessionManager`] for the login lifecycle.
//! - [`resolve`] for the authenticated-route gate.
//! - [`Error`] and [`ErrorCode`], the transport-agnostic error payload.

mod auth;
mod contact;
pub mod error;
mod navigation;
mod pet;
mod pet_catalogue_service;
mod pet_query;
pub mod ports;
pub mod sample_pets;
mod session;
mod session_manager;
mod trace_id;

pub use self::auth::{
    AuthFailure, LoginCredentials, PASSWORD_MIN_LEN, PasswordResetRequest, SignupForm,
};
pub use self::contact::{
    ContactLinks, WHATSAPP_COUNTRY_CODE, email_body, email_subject, mailto_url, whatsapp_message,
    whatsapp_url,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::navigation::{
    DEFAULT_AFTER_LOGIN, LOGIN_PATH, NavigationOutcome, Route, after_login, resolve,
};
pub use self::pet::{
    Age, InstitutionContact, InstitutionInput, MAX_AGE, PLACEHOLDER_IMAGE_URL, PetDraft,
    PetDraftInput, PetField, PetId, PetPatch, PetPatchInput, PetRecord, PetValidationError,
    Vaccines, looks_like_email,
};
pub use self::pet_catalogue_service::PetCatalogueService;
pub use self::pet_query::{
    ADULT_MAX_YEARS, AgeBucket, COMPLETE_VACCINE_COUNT, PetFilter, UnknownBucket, VaccineBucket,
    YOUNG_MAX_YEARS, filter_pets,
};
pub use self::session::{
    AccessToken, EmptyUserId, InvalidTransition, ProviderSession, SessionEvent, SessionIdentity,
    SessionState, UserId,
};
pub use self::session_manager::{DEFAULT_PROVIDER_TIMEOUT, SessionManager, SessionSubscription};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use adoption_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("sign in first"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
