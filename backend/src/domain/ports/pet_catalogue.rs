//! Driving ports for browsing and editing pet listings.
//!
//! HTTP handlers talk to these traits instead of the record store so they
//! stay testable with doubles.

use async_trait::async_trait;

use crate::domain::{
    ContactLinks, Error, PetDraft, PetFilter, PetId, PetPatch, PetRecord, SessionIdentity,
};

/// Filtered listing together with the size of the unfiltered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetListing {
    pub pets: Vec<PetRecord>,
    pub total: usize,
}

/// Read side of the catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetCatalogueQuery: Send + Sync {
    /// Records matching `filter` in insertion order.
    async fn list_pets(&self, filter: &PetFilter) -> Result<PetListing, Error>;

    /// One record, or `not_found`.
    async fn get_pet(&self, id: &PetId) -> Result<PetRecord, Error>;

    /// WhatsApp and email links for the pet's institution, or `not_found`.
    async fn contact_links(&self, id: &PetId) -> Result<ContactLinks, Error>;
}

/// Write side of the catalogue. Callers must be signed in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetCatalogueCommand: Send + Sync {
    async fn create_pet(&self, actor: &SessionIdentity, draft: PetDraft)
    -> Result<PetRecord, Error>;

    /// Merge `patch` into an existing record, or `not_found`.
    async fn update_pet(
        &self,
        actor: &SessionIdentity,
        id: &PetId,
        patch: PetPatch,
    ) -> Result<PetRecord, Error>;

    /// Remove a record, or `not_found` when it is already gone.
    async fn delete_pet(&self, actor: &SessionIdentity, id: &PetId) -> Result<(), Error>;
}
