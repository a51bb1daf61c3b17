pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
