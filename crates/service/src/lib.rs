//! Service layer providing the car CRUD operations.
//! - Validation and error translation live here, not in the HTTP layer.
//! - Reuses the entity definitions in the `models` crate.
//! - Repository access goes through the `CarRepository` trait.

pub mod errors;
pub mod car;
