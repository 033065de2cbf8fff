//! The `utils` module holds pieces shared across the crate: the crate-wide
//! error type and logging setup.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
