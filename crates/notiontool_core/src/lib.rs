pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod ops;
pub mod paginate;
pub mod schema;

pub use error::{Error, Result};
