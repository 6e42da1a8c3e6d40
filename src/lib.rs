pub mod broadcast;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod mention;
pub mod slack;

pub use error::{BroadcastError, Result};
