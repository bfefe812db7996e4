//! # Hype Radio Common Library
//!
//! Shared code for the Hype Radio player including:
//! - Configuration loading (TOML file, page layout selectors)
//! - Event types (RadioEvent enum) and the EventBus
//! - Common error type

pub mod config;
pub mod error;
pub mod events;

pub use config::{PageLayout, RadioConfig};
pub use error::{Error, Result};
