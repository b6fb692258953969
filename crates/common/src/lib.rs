//! Common types for the QuickBooks OAuth playground

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
