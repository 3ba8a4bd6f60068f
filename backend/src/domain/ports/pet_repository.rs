//! Driven port for the pet record store.
//!
//! Store operations are synchronous and cannot fail: a missing id is a
//! normal outcome expressed as `None` or `false`.

use crate::domain::{PetDraft, PetId, PetPatch, PetRecord};

/// Owned, injectable collection of pet records.
///
/// ## Contract
/// - [`list`](Self::list) returns records in insertion order.
/// - [`insert`](Self::insert) assigns a fresh unique id and appends.
/// - [`update`](Self::update) merges only the supplied fields.
/// - [`remove`](Self::remove) reports whether a record was removed; a second
///   call for the same id returns `false`.
#[cfg_attr(test, mockall::automock)]
pub trait PetRepository: Send + Sync {
    fn list(&self) -> Vec<PetRecord>;

    fn get_by_id(&self, id: &PetId) -> Option<PetRecord>;

    fn insert(&self, draft: PetDraft) -> PetRecord;

    fn update(&self, id: &PetId, patch: PetPatch) -> Option<PetRecord>;

    fn remove(&self, id: &PetId) -> bool;
}
