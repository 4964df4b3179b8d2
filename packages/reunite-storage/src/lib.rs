pub mod db;
pub mod matches;
pub mod models;
pub mod notifications;
pub mod persons;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
