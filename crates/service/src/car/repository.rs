use std::collections::HashMap;

use async_trait::async_trait;
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use models::{Car, CarFilters};

/// Fresh ids drawn per create before giving up.
const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("car not found: {0}")]
    NotFound(String),
    #[error("id generation failed: {0}")]
    IdGeneration(String),
}

/// Persistence abstraction for cars. Implementations hand out clones, never
/// references into their storage.
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn find(&self, id: &str) -> Result<Car, RepositoryError>;
    /// Cars matching every supplied filter, in no particular order.
    async fn list(&self, filters: &CarFilters) -> Result<Vec<Car>, RepositoryError>;
    /// Store `car` under a freshly generated id and return the stored copy.
    async fn create(&self, car: Car) -> Result<Car, RepositoryError>;
    /// Replace the record at `car.id` wholesale.
    async fn update(&self, car: Car) -> Result<Car, RepositoryError>;
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
    async fn count(&self) -> usize;
}

/// Source of opaque car identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Result<String, RepositoryError>;
}

/// 16 lowercase hex characters from 8 bytes of OS entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomHexIds;

impl IdGenerator for RandomHexIds {
    fn next_id(&self) -> Result<String, RepositoryError> {
        let mut bytes = [0u8; 8];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| RepositoryError::IdGeneration(e.to_string()))?;
        Ok(hex::encode(bytes))
    }
}

/// In-memory store guarded by a single reader/writer lock.
pub struct InMemoryCarRepository {
    cars: RwLock<HashMap<String, Car>>,
    ids: Box<dyn IdGenerator>,
}

impl Default for InMemoryCarRepository {
    fn default() -> Self { Self::new() }
}

impl InMemoryCarRepository {
    pub fn new() -> Self {
        Self::with_id_generator(RandomHexIds)
    }

    pub fn with_id_generator<G: IdGenerator + 'static>(ids: G) -> Self {
        Self { cars: RwLock::new(HashMap::new()), ids: Box::new(ids) }
    }

    /// Pre-populated store; each car is keyed by its own id.
    pub fn with_cars<I: IntoIterator<Item = Car>>(cars: I) -> Self {
        let map = cars.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self { cars: RwLock::new(map), ids: Box::new(RandomHexIds) }
    }
}

#[async_trait]
impl CarRepository for InMemoryCarRepository {
    async fn find(&self, id: &str) -> Result<Car, RepositoryError> {
        let cars = self.cars.read().await;
        cars.get(id).cloned().ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list(&self, filters: &CarFilters) -> Result<Vec<Car>, RepositoryError> {
        let cars = self.cars.read().await;
        if filters.is_empty() {
            return Ok(cars.values().cloned().collect());
        }
        Ok(cars.values().filter(|c| filters.matches(c)).cloned().collect())
    }

    async fn create(&self, mut car: Car) -> Result<Car, RepositoryError> {
        let mut cars = self.cars.write().await;
        let mut fresh = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id()?;
            if !cars.contains_key(&id) {
                fresh = Some(id);
                break;
            }
            debug!(%id, "generated id already taken; retrying");
        }
        car.id = fresh.ok_or_else(|| {
            RepositoryError::IdGeneration(format!("no unused id after {MAX_ID_ATTEMPTS} attempts"))
        })?;
        cars.insert(car.id.clone(), car.clone());
        Ok(car)
    }

    async fn update(&self, car: Car) -> Result<Car, RepositoryError> {
        let mut cars = self.cars.write().await;
        let slot = cars.get_mut(&car.id).ok_or_else(|| RepositoryError::NotFound(car.id.clone()))?;
        *slot = car.clone();
        Ok(car)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut cars = self.cars.write().await;
        cars.remove(id).map(|_| ()).ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn count(&self) -> usize {
        self.cars.read().await.len()
    }
}
