//! Core support for the sonance audio engine

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{CoreError, Result};
