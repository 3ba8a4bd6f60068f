//! Domain ports for the hexagonal boundary.
//!
//! Driving ports ([`PetCatalogueQuery`], [`PetCatalogueCommand`]) are called by
//! inbound adapters. Driven ports ([`PetRepository`], [`IdentityProvider`])
//! are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_provider;
mod pet_catalogue;
mod pet_repository;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{
    IdentityProvider, IdentityProviderError, SESSION_EVENT_CAPACITY, SessionChange,
    SessionChangeKind,
};
#[cfg(test)]
pub use pet_catalogue::{MockPetCatalogueCommand, MockPetCatalogueQuery};
pub use pet_catalogue::{PetCatalogueCommand, PetCatalogueQuery, PetListing};
#[cfg(test)]
pub use pet_repository::MockPetRepository;
pub use pet_repository::PetRepository;
