//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod remote;
pub mod slot;
pub mod telemetry;

use std::sync::Arc;

use tracing::info;

use crate::application::repos::{PostsRepo, PostsWriteRepo};
use crate::config::{StorageBackend, StorageSettings};

use self::error::InfraError;
use self::remote::RemotePostsRepository;
use self::slot::LocalSlotRepository;

/// Read and write handles for the configured backend.
#[derive(Clone)]
pub struct Repositories {
    pub reader: Arc<dyn PostsRepo>,
    pub writer: Arc<dyn PostsWriteRepo>,
}

impl Repositories {
    fn shared<R>(repo: R) -> Self
    where
        R: PostsRepo + PostsWriteRepo + 'static,
    {
        let repo = Arc::new(repo);
        Self {
            reader: repo.clone(),
            writer: repo,
        }
    }
}

pub fn build_repositories(storage: &StorageSettings) -> Result<Repositories, InfraError> {
    match &storage.backend {
        StorageBackend::Local { directory, key } => {
            let repo = LocalSlotRepository::new(directory.clone(), key.clone());
            info!(
                key = repo.key(),
                slot = %repo.slot_path().display(),
                "using local slot storage"
            );
            Ok(Repositories::shared(repo))
        }
        StorageBackend::Remote { base_url } => {
            let repo = RemotePostsRepository::new(base_url.as_str()).map_err(|err| {
                InfraError::configuration(format!("remote backend `{base_url}`: {err}"))
            })?;
            info!(base_url = %repo.base(), "using remote post storage");
            Ok(Repositories::shared(repo))
        }
    }
}
