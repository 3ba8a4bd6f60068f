//! Pet listing records and their validated building blocks.
//!
//! A [`PetRecord`] is a [`PetDraft`] plus the identifier the store assigned
//! at insertion. [`PetPatch`] carries a partial update where only supplied
//! fields change; the embedded [`InstitutionContact`] is replaced whole.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Oldest age accepted by the listing form.
pub const MAX_AGE: u32 = 30;
/// Image used when a listing is created without one.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder.svg";

/// Form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetField {
    Id,
    Name,
    Age,
    Breed,
    Vaccines,
    InstitutionName,
    InstitutionEmail,
    InstitutionWhatsapp,
}

impl PetField {
    /// Field path as it appears in request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Age => "age",
            Self::Breed => "breed",
            Self::Vaccines => "vaccines",
            Self::InstitutionName => "institution.name",
            Self::InstitutionEmail => "institution.email",
            Self::InstitutionWhatsapp => "institution.whatsapp",
        }
    }
}

impl fmt::Display for PetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for pet form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetValidationError {
    Blank { field: PetField },
    AgeOutOfRange { value: i64, max: u32 },
    DuplicateVaccine { name: String },
    InvalidEmail,
}

impl PetValidationError {
    /// Field the failure refers to.
    pub fn field(&self) -> PetField {
        match self {
            Self::Blank { field } => *field,
            Self::AgeOutOfRange { .. } => PetField::Age,
            Self::DuplicateVaccine { .. } => PetField::Vaccines,
            Self::InvalidEmail => PetField::InstitutionEmail,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Blank { .. } => "blank_field",
            Self::AgeOutOfRange { .. } => "age_out_of_range",
            Self::DuplicateVaccine { .. } => "duplicate_vaccine",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

impl fmt::Display for PetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "{field} must not be empty"),
            Self::AgeOutOfRange { value, max } => {
                write!(f, "age must be between 0 and {max}, got {value}")
            }
            Self::DuplicateVaccine { name } => write!(f, "vaccine '{name}' is listed twice"),
            Self::InvalidEmail => write!(f, "institution.email must be a valid email address"),
        }
    }
}

impl std::error::Error for PetValidationError {}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Loose email shape check shared by pet and auth forms.
pub fn looks_like_email(value: &str) -> bool {
    email_regex().is_match(value)
}

fn required(field: PetField, raw: &str) -> Result<String, PetValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PetValidationError::Blank { field });
    }
    Ok(trimmed.to_owned())
}

fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Opaque, immutable pet identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PetId(String);

impl PetId {
    /// Validate an identifier supplied by a caller.
    pub fn new(raw: impl Into<String>) -> Result<Self, PetValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() || raw.trim() != raw {
            return Err(PetValidationError::Blank { field: PetField::Id });
        }
        Ok(Self(raw))
    }

    /// Collision-resistant identifier for a new record.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PetId> for String {
    fn from(value: PetId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PetId {
    type Error = PetValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Age in whole years, `0..=MAX_AGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Age(u32);

impl Age {
    pub fn new(years: i64) -> Result<Self, PetValidationError> {
        u32::try_from(years)
            .ok()
            .filter(|value| *value <= MAX_AGE)
            .map(Self)
            .ok_or(PetValidationError::AgeOutOfRange {
                value: years,
                max: MAX_AGE,
            })
    }

    pub fn years(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordered vaccine names without duplicates.
///
/// Names are trimmed and blank entries dropped; duplicates are compared
/// case-sensitively after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vaccines(Vec<String>);

impl Vaccines {
    pub fn new<I, S>(names: I) -> Result<Self, PetValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if accepted.iter().any(|existing| existing == name) {
                return Err(PetValidationError::DuplicateVaccine {
                    name: name.to_owned(),
                });
            }
            accepted.push(name.to_owned());
        }
        Ok(Self(accepted))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Sheltering institution contact, embedded in exactly one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionContact {
    name: String,
    email: String,
    whatsapp: String,
}

impl InstitutionContact {
    /// Validate the three required contact fields.
    pub fn try_new(name: &str, email: &str, whatsapp: &str) -> Result<Self, PetValidationError> {
        let name = required(PetField::InstitutionName, name)?;
        let email = required(PetField::InstitutionEmail, email)?;
        if !looks_like_email(&email) {
            return Err(PetValidationError::InvalidEmail);
        }
        let whatsapp = required(PetField::InstitutionWhatsapp, whatsapp)?;
        Ok(Self {
            name,
            email,
            whatsapp,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Phone number used as the WhatsApp identifier, as entered.
    pub fn whatsapp(&self) -> &str {
        &self.whatsapp
    }
}

/// Raw institution fields as submitted by a form.
#[derive(Debug, Clone, Default)]
pub struct InstitutionInput {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
}

impl TryFrom<&InstitutionInput> for InstitutionContact {
    type Error = PetValidationError;

    fn try_from(value: &InstitutionInput) -> Result<Self, Self::Error> {
        Self::try_new(&value.name, &value.email, &value.whatsapp)
    }
}

/// Raw create-form fields before validation.
#[derive(Debug, Clone, Default)]
pub struct PetDraftInput {
    pub name: String,
    pub age: i64,
    pub breed: String,
    pub vaccines: Vec<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub institution: InstitutionInput,
}

/// Validated record contents without an identifier.
///
/// ## Invariants
/// - `name` and `breed` are trimmed and non-empty.
/// - `image_url` is non-empty; blank input becomes [`PLACEHOLDER_IMAGE_URL`].
/// - `description` is `None` rather than blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetDraft {
    name: String,
    age: Age,
    breed: String,
    vaccines: Vaccines,
    image_url: String,
    description: Option<String>,
    institution: InstitutionContact,
}

impl PetDraft {
    /// Validate create-form input.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::domain::{InstitutionInput, PetDraft, PetDraftInput};
    ///
    /// let draft = PetDraft::try_from_input(PetDraftInput {
    ///     name: "Luna".into(),
    ///     age: 2,
    ///     breed: "Labrador Mix".into(),
    ///     vaccines: vec!["V8".into()],
    ///     institution: InstitutionInput {
    ///         name: "ONG Amor Animal".into(),
    ///         email: "contato@amoranimal.org".into(),
    ///         whatsapp: "11999887766".into(),
    ///     },
    ///     ..PetDraftInput::default()
    /// })
    /// .expect("valid draft");
    /// assert_eq!(draft.image_url(), "/placeholder.svg");
    /// ```
    pub fn try_from_input(input: PetDraftInput) -> Result<Self, PetValidationError> {
        let name = required(PetField::Name, &input.name)?;
        let age = Age::new(input.age)?;
        let breed = required(PetField::Breed, &input.breed)?;
        let vaccines = Vaccines::new(&input.vaccines)?;
        let institution = InstitutionContact::try_from(&input.institution)?;
        let image_url = optional_text(input.image_url.as_deref())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_owned());
        Ok(Self {
            name,
            age,
            breed,
            vaccines,
            image_url,
            description: optional_text(input.description.as_deref()),
            institution,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn breed(&self) -> &str {
        &self.breed
    }

    pub fn vaccines(&self) -> &Vaccines {
        &self.vaccines
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn institution(&self) -> &InstitutionContact {
        &self.institution
    }
}

/// Stored pet listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetRecord {
    id: PetId,
    fields: PetDraft,
}

impl PetRecord {
    pub fn new(id: PetId, fields: PetDraft) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> &PetId {
        &self.id
    }

    /// Contents without the identifier.
    pub fn fields(&self) -> &PetDraft {
        &self.fields
    }

    pub fn name(&self) -> &str {
        self.fields.name()
    }

    pub fn age(&self) -> Age {
        self.fields.age()
    }

    pub fn breed(&self) -> &str {
        self.fields.breed()
    }

    pub fn vaccines(&self) -> &Vaccines {
        self.fields.vaccines()
    }

    pub fn image_url(&self) -> &str {
        self.fields.image_url()
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.description()
    }

    pub fn institution(&self) -> &InstitutionContact {
        self.fields.institution()
    }

    /// Merge the supplied patch fields; the identifier never changes.
    pub fn apply(&mut self, patch: PetPatch) {
        let PetPatch {
            name,
            age,
            breed,
            vaccines,
            image_url,
            description,
            institution,
        } = patch;
        let fields = &mut self.fields;
        if let Some(name) = name {
            fields.name = name;
        }
        if let Some(age) = age {
            fields.age = age;
        }
        if let Some(breed) = breed {
            fields.breed = breed;
        }
        if let Some(vaccines) = vaccines {
            fields.vaccines = vaccines;
        }
        if let Some(image_url) = image_url {
            fields.image_url = image_url;
        }
        if let Some(description) = description {
            fields.description = description;
        }
        if let Some(institution) = institution {
            fields.institution = institution;
        }
    }
}

/// Raw edit-form fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PetPatchInput {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub breed: Option<String>,
    pub vaccines: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub institution: Option<InstitutionInput>,
}

/// Validated partial update.
///
/// `description: Some(None)` clears the description. A blank image URL in
/// the input keeps the current image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetPatch {
    name: Option<String>,
    age: Option<Age>,
    breed: Option<String>,
    vaccines: Option<Vaccines>,
    image_url: Option<String>,
    description: Option<Option<String>>,
    institution: Option<InstitutionContact>,
}

impl PetPatch {
    pub fn try_from_input(input: PetPatchInput) -> Result<Self, PetValidationError> {
        Ok(Self {
            name: input
                .name
                .map(|raw| required(PetField::Name, &raw))
                .transpose()?,
            age: input.age.map(Age::new).transpose()?,
            breed: input
                .breed
                .map(|raw| required(PetField::Breed, &raw))
                .transpose()?,
            vaccines: input.vaccines.map(Vaccines::new).transpose()?,
            image_url: optional_text(input.image_url.as_deref()),
            description: input
                .description
                .map(|raw| optional_text(Some(raw.as_str()))),
            institution: input
                .institution
                .as_ref()
                .map(InstitutionContact::try_from)
                .transpose()?,
        })
    }

    /// Patch touching only the age.
    pub fn only_age(age: Age) -> Self {
        Self {
            age: Some(age),
            ..Self::default()
        }
    }

    /// True when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
