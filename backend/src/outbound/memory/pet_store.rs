//! In-process pet record store.
//!
//! Records live in a `Vec` behind a `parking_lot::RwLock` so listing keeps
//! insertion order. The lock is only held for the duration of one
//! operation.

use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::ports::PetRepository;
use crate::domain::{PetDraft, PetId, PetPatch, PetRecord};

/// Raised when seeding with records that share an id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate pet id {id}")]
pub struct DuplicatePetId {
    pub id: String,
}

/// Owned record store injected wherever a [`PetRepository`] is needed.
#[derive(Debug, Default)]
pub struct InMemoryPetRepository {
    records: RwLock<Vec<PetRecord>>,
}

impl InMemoryPetRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `records` in the given order.
    ///
    /// # Errors
    /// Returns [`DuplicatePetId`] when two records share an id.
    pub fn with_records(records: Vec<PetRecord>) -> Result<Self, DuplicatePetId> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id().as_str()) {
                return Err(DuplicatePetId {
                    id: record.id().to_string(),
                });
            }
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl PetRepository for InMemoryPetRepository {
    fn list(&self) -> Vec<PetRecord> {
        self.records.read().clone()
    }

    fn get_by_id(&self, id: &PetId) -> Option<PetRecord> {
        self.records
            .read()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    fn insert(&self, draft: PetDraft) -> PetRecord {
        let mut records = self.records.write();
        let mut id = PetId::generate();
        while records.iter().any(|record| record.id() == &id) {
            id = PetId::generate();
        }
        let record = PetRecord::new(id, draft);
        records.push(record.clone());
        debug!(pet_id = %record.id(), count = records.len(), "pet record inserted");
        record
    }

    fn update(&self, id: &PetId, patch: PetPatch) -> Option<PetRecord> {
        let mut records = self.records.write();
        let record = records.iter_mut().find(|record| record.id() == id)?;
        record.apply(patch);
        Some(record.clone())
    }

    fn remove(&self, id: &PetId) -> bool {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|record| record.id() != id);
        before != records.len()
    }
}
