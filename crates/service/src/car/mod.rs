//! Car module: repository (in-memory store), service (validation and error
//! translation) and the demo seed set.

pub mod repository;
pub mod seed;
pub mod service;

pub use repository::{CarRepository, InMemoryCarRepository, RepositoryError};
pub use service::CarService;
