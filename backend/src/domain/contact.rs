//! WhatsApp and email deep links for contacting a pet's institution.
//!
//! Links are opened by the client; nothing here waits for a reply.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use super::PetRecord;

/// Country calling code prefixed to institution phone numbers.
pub const WHATSAPP_COUNTRY_CODE: &str = "55";
const WHATSAPP_BASE: &str = "https://wa.me/";

// Same unreserved set as JavaScript's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

fn interest_sentence(pet: &PetRecord) -> String {
    format!(
        "Gostaria de saber mais sobre {name} ({breed}, {age} anos) disponível para adoção.",
        name = pet.name(),
        breed = pet.breed(),
        age = pet.age(),
    )
}

/// Greeting sent as the pre-filled WhatsApp message.
pub fn whatsapp_message(pet: &PetRecord) -> String {
    format!("Olá! {}", interest_sentence(pet))
}

/// Subject line of the pre-filled email.
pub fn email_subject(pet: &PetRecord) -> String {
    format!("Interesse em adoção - {}", pet.name())
}

/// Body of the pre-filled email.
pub fn email_body(pet: &PetRecord) -> String {
    format!(
        "Olá!\n\n{}\n\nAguardo retorno.\n\nObrigado!",
        interest_sentence(pet)
    )
}

/// `https://wa.me/55<digits>?text=<message>`; formatting characters in the
/// stored phone number are dropped.
pub fn whatsapp_url(pet: &PetRecord) -> String {
    let digits: String = pet
        .institution()
        .whatsapp()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    format!(
        "{WHATSAPP_BASE}{WHATSAPP_COUNTRY_CODE}{digits}?text={}",
        encode_component(&whatsapp_message(pet))
    )
}

/// `mailto:` link with subject and body filled in.
pub fn mailto_url(pet: &PetRecord) -> String {
    format!(
        "mailto:{email}?subject={subject}&body={body}",
        email = pet.institution().email(),
        subject = encode_component(&email_subject(pet)),
        body = encode_component(&email_body(pet)),
    )
}

/// Both deep links for one pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactLinks {
    pub whatsapp_url: String,
    pub mailto_url: String,
}

impl ContactLinks {
    pub fn for_pet(pet: &PetRecord) -> Self {
        Self {
            whatsapp_url: whatsapp_url(pet),
            mailto_url: mailto_url(pet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InstitutionInput, PetDraft, PetDraftInput, PetId, sample_pets};
    use rstest::{fixture, rstest};

    #[fixture]
    fn luna() -> PetRecord {
        sample_pets::records()
            .expect("sample dataset")
            .into_iter()
            .next()
            .expect("Luna is first")
    }

    #[rstest]
    fn whatsapp_link_encodes_like_encode_uri_component(luna: PetRecord) {
        assert_eq!(
            whatsapp_url(&luna),
            "https://wa.me/5511999887766?text=Ol%C3%A1!%20Gostaria%20de%20saber%20mais%20sobre%20\
             Luna%20(Labrador%20Mix%2C%202%20anos)%20dispon%C3%ADvel%20para%20ado%C3%A7%C3%A3o."
        );
    }

    #[rstest]
    fn mailto_link_carries_subject_and_body(luna: PetRecord) {
        let url = mailto_url(&luna);
        assert!(url.starts_with(
            "mailto:contato@amoranimal.org?subject=Interesse%20em%20ado%C3%A7%C3%A3o%20-%20Luna&body="
        ));
        assert!(url.contains("body=Ol%C3%A1!%0A%0AGostaria%20de%20saber"));
        assert!(url.ends_with("%0A%0AAguardo%20retorno.%0A%0AObrigado!"));
    }

    #[rstest]
    fn email_body_matches_template(luna: PetRecord) {
        assert_eq!(
            email_body(&luna),
            "Olá!\n\nGostaria de saber mais sobre Luna (Labrador Mix, 2 anos) disponível para adoção.\n\nAguardo retorno.\n\nObrigado!"
        );
    }

    #[rstest]
    fn phone_formatting_is_stripped() {
        let draft = PetDraft::try_from_input(PetDraftInput {
            name: "Tom".into(),
            age: 1,
            breed: "SRD".into(),
            institution: InstitutionInput {
                name: "Abrigo".into(),
                email: "a@b.org".into(),
                whatsapp: "(11) 98765-4321".into(),
            },
            ..PetDraftInput::default()
        })
        .expect("valid draft");
        let pet = PetRecord::new(PetId::generate(), draft);
        assert!(whatsapp_url(&pet).starts_with("https://wa.me/5511987654321?text="));
    }
}
