//! In-process adapters.

mod pet_store;

pub use pet_store::{DuplicatePetId, InMemoryPetRepository};
