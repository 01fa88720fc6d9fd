pub mod errors;
pub mod car;

pub use car::{Car, CarFilters};
pub use errors::ValidationError;
