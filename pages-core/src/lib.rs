//! Pages core library: page identifiers, configuration, errors.
//!
//! Public API surface:
//! - [`types`]: [`PageId`] and [`PageSource`]
//! - [`error`]: [`ConfigError`]
//! - [`config`]: [`PagesConfig`] load / defaults

pub mod config;
pub mod error;
pub mod types;

pub use config::PagesConfig;
pub use error::ConfigError;
pub use types::{PageId, PageSource};
