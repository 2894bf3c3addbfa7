//! Repository layer for database operations

pub mod communications;
pub mod universities;
pub mod walkins;

use sqlx::{Pool, Postgres};

pub use communications::CommunicationStore;
pub use universities::RecipientDirectory;
pub use walkins::WalkInStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub walkins: walkins::WalkInsRepository,
    pub communications: communications::CommunicationsRepository,
    pub universities: universities::UniversitiesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            walkins: walkins::WalkInsRepository::new(pool.clone()),
            communications: communications::CommunicationsRepository::new(pool.clone()),
            universities: universities::UniversitiesRepository::new(pool.clone()),
            pool,
        }
    }
}
