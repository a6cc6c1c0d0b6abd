//! Garment repository trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{Garment, GarmentId, GarmentStatus};
use tokio::sync::RwLock;

use crate::error::{RepositoryError, Result};

/// Read access to garment listings, plus the availability writes the
/// exchange lifecycle owns (reserve on creation, re-list on
/// decline/cancel, sold on completion).
#[async_trait]
pub trait GarmentRepository: Send + Sync {
    /// Retrieves a garment by ID.
    ///
    /// Returns None if no such garment exists.
    async fn get(&self, id: GarmentId) -> Result<Option<Garment>>;

    /// Updates a garment's availability status.
    ///
    /// Returns the updated garment.
    async fn set_status(&self, id: GarmentId, status: GarmentStatus) -> Result<Garment>;
}

/// In-memory garment repository.
#[derive(Clone, Default)]
pub struct InMemoryGarmentRepository {
    garments: Arc<RwLock<HashMap<GarmentId, Garment>>>,
}

impl InMemoryGarmentRepository {
    /// Creates a new empty in-memory garment repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a garment, returning its ID.
    pub async fn insert(&self, garment: Garment) -> GarmentId {
        let id = garment.id;
        self.garments.write().await.insert(id, garment);
        id
    }

    /// Returns the total number of garments stored.
    pub async fn garment_count(&self) -> usize {
        self.garments.read().await.len()
    }
}

#[async_trait]
impl GarmentRepository for InMemoryGarmentRepository {
    async fn get(&self, id: GarmentId) -> Result<Option<Garment>> {
        Ok(self.garments.read().await.get(&id).cloned())
    }

    async fn set_status(&self, id: GarmentId, status: GarmentStatus) -> Result<Garment> {
        let mut garments = self.garments.write().await;
        let garment = garments
            .get_mut(&id)
            .ok_or(RepositoryError::GarmentNotFound(id))?;
        garment.status = status;
        Ok(garment.clone())
    }
}
