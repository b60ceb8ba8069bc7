//! Error types for pages-renderer.

use std::path::PathBuf;

use thiserror::Error;

use pages_core::PageId;

/// All errors that can arise from building a registry or rendering a page.
#[derive(Debug, Error)]
pub enum PageError {
    /// Filesystem error while reading a template source.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failed below `root`.
    #[error("cannot scan {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Template source failed to compile.
    #[error("cannot parse page '{id}' from {path}: {source}")]
    Parse {
        id: PageId,
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// A page embeds a page id that is not registered.
    #[error("page '{id}' embeds unknown page '{target}'")]
    UnknownEmbed { id: PageId, target: String },

    /// No page is registered under the requested id.
    #[error("page '{id}' not found")]
    NotFound { id: String },

    /// The page exists but has no parsed template.
    #[error("page '{id}' has not been parsed")]
    NotParsed { id: PageId },

    /// Tera failed while rendering; the output stream may hold partial output.
    #[error("failed to render page '{id}': {source}")]
    Render {
        id: PageId,
        #[source]
        source: tera::Error,
    },

    /// Embedded pages nested deeper than the configured limit.
    #[error("embedding '{id}' exceeds the nesting limit of {limit}")]
    EmbedDepth { id: PageId, limit: usize },

    /// The registry owning the embedded page has been dropped.
    #[error("registry for embedded page '{id}' is no longer available")]
    Detached { id: PageId },

    /// Data context could not be converted to a JSON value.
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience constructor for [`PageError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PageError {
    PageError::Io { path: path.into(), source }
}
