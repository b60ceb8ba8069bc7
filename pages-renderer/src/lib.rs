//! # pages-renderer
//!
//! Tera-backed page registry: scan directories for `.tpl` files, parse each
//! into a [`Page`] keyed by its relative path, and render pages by id. Any
//! page may splice another page's output through the embed filter.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pages_renderer::App;
//! use serde_json::json;
//!
//! fn serve_index(out: &mut impl std::io::Write) -> Result<(), pages_renderer::PageError> {
//!     let mut app = App::new();
//!     app.add_directory("site")?;
//!     app.execute("index.tpl", out, &json!({"name": "Ann"}))
//! }
//! ```
//!
//! Inside `site/index.tpl`:
//!
//! ```text
//! {{ this | embed(page="bits/header.tpl") }}Hello {{ name }}
//! ```

pub mod app;
pub mod context;
pub mod embed;
pub mod error;
pub mod loader;
pub mod page;

pub use app::App;
pub use context::{DataContext, THIS};
pub use embed::{EmbedDirective, Fragment, FormatterSet};
pub use error::PageError;
pub use page::Page;
