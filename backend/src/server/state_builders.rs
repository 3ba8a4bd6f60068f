//! Builders turning settings into port implementations.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use adoption_backend::domain::ports::{IdentityProvider, IdentityProviderError};
use adoption_backend::domain::{PetCatalogueService, PetValidationError, sample_pets};
use adoption_backend::inbound::http::state::HttpStatePorts;
use adoption_backend::outbound::identity::{LocalIdentityProvider, RemoteIdentityProvider};
use adoption_backend::outbound::memory::{DuplicatePetId, InMemoryPetRepository};
use adoption_backend::settings::IdentityProviderSettings;

/// Failures while assembling ports at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to open mock identity provider: {0}")]
    LocalProvider(#[from] IdentityProviderError),
    #[error("failed to build identity provider client: {0}")]
    RemoteProvider(#[from] reqwest::Error),
    #[error("sample pet is invalid: {0}")]
    SamplePet(#[from] PetValidationError),
    #[error(transparent)]
    DuplicatePet(#[from] DuplicatePetId),
}

pub(super) fn build_identity_provider(
    settings: &IdentityProviderSettings,
    timeout: Duration,
) -> Result<Arc<dyn IdentityProvider>, StartupError> {
    match settings {
        IdentityProviderSettings::Mock { session_dir } => {
            info!(dir = %session_dir.display(), "using mock identity provider");
            Ok(Arc::new(LocalIdentityProvider::open(session_dir)?))
        }
        IdentityProviderSettings::Remote { url, api_key } => {
            info!(%url, "using remote identity provider");
            Ok(Arc::new(RemoteIdentityProvider::new(
                url.clone(),
                api_key.clone(),
                timeout,
            )?))
        }
    }
}

pub(super) fn build_pet_repository(seed: bool) -> Result<InMemoryPetRepository, StartupError> {
    if !seed {
        return Ok(InMemoryPetRepository::new());
    }
    let repository = InMemoryPetRepository::with_records(sample_pets::records()?)?;
    info!(count = repository.len(), "seeded sample pets");
    Ok(repository)
}

/// Assemble the ports handed to every HTTP worker.
pub fn build_ports(
    provider: &IdentityProviderSettings,
    timeout: Duration,
    seed_sample_pets: bool,
) -> Result<HttpStatePorts, StartupError> {
    let identity = build_identity_provider(provider, timeout)?;
    let repository = build_pet_repository(seed_sample_pets)?;
    let service = Arc::new(PetCatalogueService::new(Arc::new(repository)));
    Ok(HttpStatePorts {
        pets: service.clone(),
        pets_command: service,
        identity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adoption_backend::domain::{AccessToken, PetFilter};
    use rstest::rstest;

    #[rstest]
    #[case(true, 6)]
    #[case(false, 0)]
    fn seeding_follows_setting(#[case] seed: bool, #[case] expected: usize) {
        let repository = build_pet_repository(seed).expect("repository");
        assert_eq!(repository.len(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn mock_provider_is_usable_from_ports() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ports = build_ports(
            &IdentityProviderSettings::Mock {
                session_dir: dir.path().join("sessions"),
            },
            Duration::from_secs(1),
            true,
        )
        .expect("ports");

        let listing = ports
            .pets
            .list_pets(&PetFilter::default())
            .await
            .expect("listing");
        assert_eq!(listing.total, 6);
        let session = ports
            .identity
            .current_session(Some(AccessToken::new("unknown")))
            .await
            .expect("lookup");
        assert!(session.is_none());
    }

    #[rstest]
    fn remote_provider_builds_without_network() {
        let provider = build_identity_provider(
            &IdentityProviderSettings::Remote {
                url: url::Url::parse("https://demo.supabase.co/auth/v1").expect("url"),
                api_key: "anon".into(),
            },
            Duration::from_secs(1),
        );
        assert!(provider.is_ok());
    }
}
