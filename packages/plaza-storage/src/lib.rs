pub mod db;
pub mod models;
pub mod profile;
pub mod schema;
pub mod sources;
pub mod taxonomy;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
