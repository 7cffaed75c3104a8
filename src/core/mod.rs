//! Core types and utilities

pub mod types;
pub mod error;
pub mod logging;
pub mod rng;

pub use error::Error;
pub use rng::Prng;
pub use types::*;
