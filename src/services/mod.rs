//! Business logic services

pub mod communications;
pub mod email;
pub mod storage;
pub mod walkins;

use std::sync::Arc;

use crate::{
    config::{EmailConfig, StorageConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub walkins: walkins::WalkInsService,
    pub communications: communications::CommunicationsService,
    pub storage: Arc<dyn storage::ObjectStore>,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        email_config: EmailConfig,
        storage_config: StorageConfig,
    ) -> AppResult<Self> {
        let mailer = Arc::new(email::EmailService::new(email_config)?);

        Ok(Self {
            walkins: walkins::WalkInsService::new(Arc::new(repository.walkins.clone())),
            communications: communications::CommunicationsService::new(
                Arc::new(repository.communications.clone()),
                Arc::new(repository.universities.clone()),
                mailer,
            ),
            storage: Arc::new(storage::S3ObjectStore::new(storage_config)),
        })
    }
}
