use std::sync::Arc;

use tracing::{info, instrument};

use models::{Car, CarFilters};

use crate::car::repository::CarRepository;
use crate::errors::ServiceError;

/// Application service for cars: validates writes and translates
/// repository failures into `ServiceError`.
pub struct CarService<R: CarRepository> {
    repo: Arc<R>,
}

impl<R: CarRepository> CarService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub fn repository(&self) -> &Arc<R> { &self.repo }

    pub async fn find(&self, id: &str) -> Result<Car, ServiceError> {
        Ok(self.repo.find(id).await?)
    }

    pub async fn list(&self, filters: &CarFilters) -> Result<Vec<Car>, ServiceError> {
        Ok(self.repo.list(filters).await?)
    }

    /// Validate and store a new car; the returned copy carries its assigned id.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::Car;
    /// use service::car::{CarService, InMemoryCarRepository};
    ///
    /// let svc = CarService::new(Arc::new(InMemoryCarRepository::new()));
    /// let car = Car {
    ///     make: "Toyota".into(),
    ///     model: "Camry".into(),
    ///     color: "White".into(),
    ///     category: "Sedan".into(),
    ///     year: 2019,
    ///     ..Default::default()
    /// };
    /// let created = tokio_test::block_on(svc.create(car)).unwrap();
    /// assert!(!created.id.is_empty());
    /// ```
    #[instrument(skip(self, car), fields(make = %car.make, model = %car.model))]
    pub async fn create(&self, car: Car) -> Result<Car, ServiceError> {
        car.validate_for_create()?;
        let created = self.repo.create(car).await?;
        info!(id = %created.id, "car_created");
        Ok(created)
    }

    /// Validate and replace the car at `car.id`. Fields missing from `car`
    /// are not carried over from the stored record.
    #[instrument(skip(self, car), fields(id = %car.id))]
    pub async fn update(&self, car: Car) -> Result<Car, ServiceError> {
        car.validate_for_update()?;
        let updated = self.repo.update(car).await?;
        info!("car_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.repo.delete(id).await?;
        info!("car_deleted");
        Ok(())
    }
}
