//! Page registry: owns every [`Page`] plus the embed formatter set.
//!
//! # Lifecycle
//!
//! 1. Build: [`App::add_directory`] / [`App::add_page`] record sources and
//!    rebuild the registry (one embed directive per page, then every page
//!    parsed against the full formatter set).
//! 2. Serve: [`App::execute`] renders by id through `&self`; any number of
//!    threads may render concurrently.
//!
//! A rebuild either fully succeeds and replaces the published pages, or
//! fails and leaves the registry exactly as it was.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use pages_core::{PageId, PagesConfig};

use crate::context::DataContext;
use crate::embed::{FormatterSet, PageTable};
use crate::error::{io_err, PageError};
use crate::loader;
use crate::page::Page;

/// A registry of named pages.
#[derive(Debug)]
pub struct App {
    config: PagesConfig,
    sources: BTreeMap<PageId, PathBuf>,
    formatters: Arc<FormatterSet>,
    table: Arc<PageTable>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// An empty registry with default settings.
    pub fn new() -> Self {
        Self::with_config(PagesConfig::default())
    }

    /// An empty registry using the settings of `config`.
    ///
    /// `config.directories` and `config.pages` are not loaded; see
    /// [`App::from_config`].
    pub fn with_config(config: PagesConfig) -> Self {
        let table: Arc<PageTable> = Arc::new(RwLock::new(HashMap::new()));
        let formatters = Arc::new(FormatterSet::new(
            &config.embed_prefix,
            config.max_embed_depth,
            [],
            &table,
        ));
        Self { config, sources: BTreeMap::new(), formatters, table }
    }

    /// Build a registry from every directory and explicit page in `config`.
    ///
    /// Directories are scanned in order, then explicit pages are added, so
    /// an explicit page overrides a scanned one with the same id. The
    /// registry is parsed once, after all sources are known.
    pub fn from_config(config: &PagesConfig) -> Result<Self, PageError> {
        let mut app = Self::with_config(config.clone());
        let mut sources = BTreeMap::new();
        for dir in &config.directories {
            app.collect_directory(dir, &mut sources)?;
        }
        for page in &config.pages {
            sources.insert(page.id.clone(), page.path.clone());
        }
        app.rebuild(sources)?;
        Ok(app)
    }

    pub fn config(&self) -> &PagesConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register `path` under `id` and parse it immediately.
    ///
    /// An existing page with the same id is replaced. On error the registry
    /// is unchanged.
    pub fn add_page(
        &mut self,
        id: impl Into<PageId>,
        path: impl Into<PathBuf>,
    ) -> Result<Arc<Page>, PageError> {
        let id = id.into();
        let mut sources = self.sources.clone();
        sources.insert(id.clone(), path.into());
        self.rebuild(sources)?;
        self.page(id.as_str())
            .ok_or_else(|| PageError::NotFound { id: id.0.clone() })
    }

    /// Register every template below `root`, then rebuild.
    ///
    /// Ids are paths relative to `root` with `/` separators and no leading
    /// separator. Returns how many templates this scan found.
    pub fn add_directory(&mut self, root: impl AsRef<Path>) -> Result<usize, PageError> {
        let root = root.as_ref();
        let mut sources = self.sources.clone();
        let found = self.collect_directory(root, &mut sources)?;
        self.rebuild(sources)?;
        tracing::info!("registered {found} pages from {}", root.display());
        Ok(found)
    }

    fn collect_directory(
        &self,
        root: &Path,
        sources: &mut BTreeMap<PageId, PathBuf>,
    ) -> Result<usize, PageError> {
        let mut found = 0;
        for source in loader::scan(root, self.config.extension()) {
            let source = source?;
            tracing::debug!("found page {} at {}", source.id, source.path.display());
            sources.insert(source.id, source.path);
            found += 1;
        }
        Ok(found)
    }

    /// Install one directive per source, parse every page, then publish.
    fn rebuild(&mut self, sources: BTreeMap<PageId, PathBuf>) -> Result<(), PageError> {
        let formatters = Arc::new(FormatterSet::new(
            &self.config.embed_prefix,
            self.config.max_embed_depth,
            sources.keys(),
            &self.table,
        ));

        let mut parsed = HashMap::with_capacity(sources.len());
        for (id, path) in &sources {
            tracing::debug!("parsing {id}");
            let source = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
            let mut page = Page::new(id.clone(), path.clone());
            page.parse_source(&source, &formatters, self.config.autoescape)?;
            if let Some(target) = page
                .ast()
                .map(|ast| formatters.literal_targets(ast))
                .unwrap_or_default()
                .into_iter()
                .find(|target| !formatters.resolves(target))
            {
                return Err(PageError::UnknownEmbed { id: id.clone(), target: target.to_string() });
            }
            parsed.insert(id.clone(), Arc::new(page));
        }

        *self.table.write().unwrap_or_else(PoisonError::into_inner) = parsed;
        self.sources = sources;
        self.formatters = formatters;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Render page `id` against `data` into `out`.
    ///
    /// An unknown id is [`PageError::NotFound`] and writes nothing. A render
    /// failure is logged once here, including failures of embedded pages,
    /// and returned after whatever output was already written.
    pub fn execute<W, T>(&self, id: &str, out: &mut W, data: &T) -> Result<(), PageError>
    where
        W: Write,
        T: Serialize + ?Sized,
    {
        let page = self.page(id).ok_or_else(|| PageError::NotFound { id: id.to_string() })?;
        page.render(&DataContext::from_serialize(data)?, out).map_err(|e| {
            tracing::warn!("error executing page '{id}': {e}");
            e
        })
    }

    /// [`App::execute`] into a `String`.
    pub fn render_to_string<T>(&self, id: &str, data: &T) -> Result<String, PageError>
    where
        T: Serialize + ?Sized,
    {
        let mut buf = Vec::new();
        self.execute(id, &mut buf, data)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn page(&self, id: &str) -> Option<Arc<Page>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner).get(id).cloned()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &PageId> {
        self.sources.keys()
    }

    /// Registered `(id, path)` pairs in id order.
    pub fn sources(&self) -> impl Iterator<Item = (&PageId, &Path)> {
        self.sources.iter().map(|(id, path)| (id, path.as_path()))
    }

    /// Embed directive names, e.g. `embed:bits/header.tpl`.
    pub fn formatter_names(&self) -> impl Iterator<Item = &str> {
        self.formatters.names()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
