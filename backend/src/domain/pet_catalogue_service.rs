//! Catalogue use-cases backed by a [`PetRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::ports::{PetCatalogueCommand, PetCatalogueQuery, PetListing, PetRepository};
use super::{
    ContactLinks, Error, PetDraft, PetFilter, PetId, PetPatch, PetRecord, SessionIdentity,
    filter_pets,
};

fn pet_not_found(id: &PetId) -> Error {
    Error::not_found(format!("pet {id} not found")).with_details(serde_json::json!({
        "id": id.as_str(),
    }))
}

/// Implements both catalogue driving ports over one repository.
#[derive(Clone)]
pub struct PetCatalogueService {
    repository: Arc<dyn PetRepository>,
}

impl PetCatalogueService {
    pub fn new(repository: Arc<dyn PetRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl PetCatalogueQuery for PetCatalogueService {
    async fn list_pets(&self, filter: &PetFilter) -> Result<PetListing, Error> {
        let records = self.repository.list();
        let pets = filter_pets(&records, filter);
        Ok(PetListing {
            pets,
            total: records.len(),
        })
    }

    async fn get_pet(&self, id: &PetId) -> Result<PetRecord, Error> {
        self.repository
            .get_by_id(id)
            .ok_or_else(|| pet_not_found(id))
    }

    async fn contact_links(&self, id: &PetId) -> Result<ContactLinks, Error> {
        let pet = self.get_pet(id).await?;
        Ok(ContactLinks::for_pet(&pet))
    }
}

#[async_trait]
impl PetCatalogueCommand for PetCatalogueService {
    async fn create_pet(
        &self,
        actor: &SessionIdentity,
        draft: PetDraft,
    ) -> Result<PetRecord, Error> {
        let record = self.repository.insert(draft);
        info!(pet_id = %record.id(), user_id = %actor.user_id, "pet listing created");
        Ok(record)
    }

    async fn update_pet(
        &self,
        actor: &SessionIdentity,
        id: &PetId,
        patch: PetPatch,
    ) -> Result<PetRecord, Error> {
        let record = self
            .repository
            .update(id, patch)
            .ok_or_else(|| pet_not_found(id))?;
        info!(pet_id = %id, user_id = %actor.user_id, "pet listing updated");
        Ok(record)
    }

    async fn delete_pet(&self, actor: &SessionIdentity, id: &PetId) -> Result<(), Error> {
        if !self.repository.remove(id) {
            return Err(pet_not_found(id));
        }
        info!(pet_id = %id, user_id = %actor.user_id, "pet listing deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockPetRepository;
    use crate::domain::{ErrorCode, UserId, sample_pets};
    use rstest::{fixture, rstest};

    #[fixture]
    fn actor() -> SessionIdentity {
        SessionIdentity {
            user_id: UserId::new("u-1").expect("user id"),
            email: "admin@pets.com".into(),
            display_name: None,
        }
    }

    fn sample() -> Vec<PetRecord> {
        sample_pets::records().expect("sample dataset")
    }

    #[rstest]
    #[tokio::test]
    async fn listing_reports_total_alongside_matches() {
        let mut repo = MockPetRepository::new();
        repo.expect_list().times(1).return_once(sample);
        let service = PetCatalogueService::new(Arc::new(repo));

        let listing = service
            .list_pets(&PetFilter::new("luna"))
            .await
            .expect("listing");
        assert_eq!(listing.total, 6);
        assert_eq!(listing.pets.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_pet_is_not_found() {
        let mut repo = MockPetRepository::new();
        repo.expect_get_by_id().times(1).return_once(|_| None);
        let service = PetCatalogueService::new(Arc::new(repo));

        let err = service
            .get_pet(&PetId::new("404").expect("id"))
            .await
            .expect_err("missing pet");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_of_missing_pet_is_not_found(actor: SessionIdentity) {
        let mut repo = MockPetRepository::new();
        repo.expect_remove().times(1).return_once(|_| false);
        let service = PetCatalogueService::new(Arc::new(repo));

        let err = service
            .delete_pet(&actor, &PetId::new("9").expect("id"))
            .await
            .expect_err("already gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn contact_links_use_stored_record() {
        let luna = sample().into_iter().next().expect("Luna");
        let expected = ContactLinks::for_pet(&luna);
        let mut repo = MockPetRepository::new();
        repo.expect_get_by_id()
            .times(1)
            .return_once(move |_| Some(luna));
        let service = PetCatalogueService::new(Arc::new(repo));

        let links = service
            .contact_links(&PetId::new("1").expect("id"))
            .await
            .expect("links");
        assert_eq!(links, expected);
    }
}
