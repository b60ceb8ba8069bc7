//! A single named template unit bound to one source file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tera::ast::Node;
use tera::Tera;

use pages_core::PageId;

use crate::context::DataContext;
use crate::embed::{EmbedFilter, FormatterSet};
use crate::error::{io_err, PageError};

/// A page: identifier, source path and, once parsed, its compiled template.
///
/// Each page owns a private [`Tera`] instance holding exactly one template
/// named after the page id. Cross-page references go through the embed
/// filter, never through Tera's own `include`/`extends`.
pub struct Page {
    id: PageId,
    path: PathBuf,
    template: Option<Tera>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("parsed", &self.is_parsed())
            .finish()
    }
}

impl Page {
    /// An unparsed page.
    pub fn new(id: impl Into<PageId>, path: impl Into<PathBuf>) -> Self {
        Self { id: id.into(), path: path.into(), template: None }
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_parsed(&self) -> bool {
        self.template.is_some()
    }

    /// Read the source file and compile it with `formatters` available.
    ///
    /// On failure the page keeps its previous state.
    pub fn parse(
        &mut self,
        formatters: &Arc<FormatterSet>,
        autoescape: bool,
    ) -> Result<(), PageError> {
        let source = std::fs::read_to_string(&self.path).map_err(|e| io_err(&self.path, e))?;
        self.parse_source(&source, formatters, autoescape)
    }

    /// Compile already loaded source text.
    pub(crate) fn parse_source(
        &mut self,
        source: &str,
        formatters: &Arc<FormatterSet>,
        autoescape: bool,
    ) -> Result<(), PageError> {
        let mut tera = Tera::default();
        if autoescape {
            tera.autoescape_on(vec![""]);
        } else {
            tera.autoescape_on(vec![]);
        }
        tera.register_filter(formatters.prefix(), EmbedFilter::new(Arc::clone(formatters)));
        tera.add_raw_template(self.id.as_str(), source).map_err(|e| PageError::Parse {
            id: self.id.clone(),
            path: self.path.clone(),
            source: e,
        })?;
        self.template = Some(tera);
        Ok(())
    }

    /// Parsed template body, once parsed.
    pub(crate) fn ast(&self) -> Option<&[Node]> {
        let tera = self.template.as_ref()?;
        let template = tera.get_template(self.id.as_str()).ok()?;
        Some(template.ast.as_slice())
    }

    /// Render against `data`, writing to `out`.
    ///
    /// An unparsed page writes nothing. On a Tera failure `out` may already
    /// hold partial output.
    pub fn render<W: Write>(&self, data: &DataContext, out: &mut W) -> Result<(), PageError> {
        let Some(tera) = &self.template else {
            return Err(PageError::NotParsed { id: self.id.clone() });
        };
        tera.render_to(self.id.as_str(), &data.to_tera_context(), out)
            .map_err(|e| PageError::Render { id: self.id.clone(), source: e })
    }

    pub fn render_to_string(&self, data: &DataContext) -> Result<String, PageError> {
        let mut buf = Vec::new();
        self.render(data, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
