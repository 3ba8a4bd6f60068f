//! Sample listings used to seed a fresh store.

use super::{
    InstitutionInput, PetDraft, PetDraftInput, PetId, PetRecord, PetValidationError,
};

struct SamplePet {
    id: &'static str,
    name: &'static str,
    age: i64,
    breed: &'static str,
    vaccines: &'static [&'static str],
    image_url: &'static str,
    description: &'static str,
    institution: (&'static str, &'static str, &'static str),
}

const SAMPLE_PETS: &[SamplePet] = &[
    SamplePet {
        id: "1",
        name: "Luna",
        age: 2,
        breed: "Labrador Mix",
        vaccines: &["V8", "Antirrábica", "Giárdia"],
        image_url: "/assets/pet-mixed-breed.jpg",
        description: "Luna é uma cadela muito carinhosa e brincalhona. Adora crianças e se dá bem com outros pets!",
        institution: ("ONG Amor Animal", "contato@amoranimal.org", "11999887766"),
    },
    SamplePet {
        id: "2",
        name: "Milo",
        age: 1,
        breed: "Vira-lata",
        vaccines: &["V10", "Antirrábica"],
        image_url: "/assets/pet-golden-retriever.jpg",
        description: "Milo é um filhote cheio de energia, perfeito para uma família ativa!",
        institution: ("Proteção Animal SP", "adocao@protecaosp.org", "11888776655"),
    },
    SamplePet {
        id: "3",
        name: "Bella",
        age: 4,
        breed: "Golden Retriever",
        vaccines: &["V8", "Antirrábica", "Giárdia", "Leishmaniose"],
        image_url: "/assets/pet-golden-retriever.jpg",
        description: "Bella é uma cadela adulta, muito tranquila e companheira. Ideal para pessoas que buscam um pet mais calmo.",
        institution: ("Casa dos Animais", "hello@casadosanimais.com", "11777665544"),
    },
    SamplePet {
        id: "4",
        name: "Simba",
        age: 3,
        breed: "Gato Persa",
        vaccines: &["V4 Felina", "Antirrábica"],
        image_url: "/assets/pet-orange-cat.jpg",
        description: "Simba é um gato carinhoso que adora colo e brincadeiras suaves.",
        institution: ("Gatil do Bem", "contato@gatildobem.org", "11666554433"),
    },
    SamplePet {
        id: "5",
        name: "Rex",
        age: 5,
        breed: "Pastor Alemão",
        vaccines: &["V10", "Antirrábica", "Leishmaniose"],
        image_url: "/assets/pet-mixed-breed.jpg",
        description: "Rex é um cão grande, muito protetor e leal. Precisa de um tutor experiente.",
        institution: ("SOS Animal", "adocao@sosanimal.org", "11555443322"),
    },
    SamplePet {
        id: "6",
        name: "Mel",
        age: 1,
        breed: "Gata SRD",
        vaccines: &["V4 Felina", "Antirrábica"],
        image_url: "/assets/pet-orange-cat.jpg",
        description: "Mel é uma gatinha jovem, muito brincalhona e sociável!",
        institution: ("Amigos dos Felinos", "info@amigosfelinos.com", "11444332211"),
    },
];

impl SamplePet {
    fn to_record(&self) -> Result<PetRecord, PetValidationError> {
        let (name, email, whatsapp) = self.institution;
        let draft = PetDraft::try_from_input(PetDraftInput {
            name: self.name.to_owned(),
            age: self.age,
            breed: self.breed.to_owned(),
            vaccines: self.vaccines.iter().map(|v| (*v).to_owned()).collect(),
            image_url: Some(self.image_url.to_owned()),
            description: Some(self.description.to_owned()),
            institution: InstitutionInput {
                name: name.to_owned(),
                email: email.to_owned(),
                whatsapp: whatsapp.to_owned(),
            },
        })?;
        Ok(PetRecord::new(PetId::new(self.id)?, draft))
    }
}

/// The six sample listings (Luna, Milo, Bella, Simba, Rex, Mel) in order.
pub fn records() -> Result<Vec<PetRecord>, PetValidationError> {
    SAMPLE_PETS.iter().map(SamplePet::to_record).collect()
}
