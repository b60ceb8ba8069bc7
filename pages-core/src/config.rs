//! YAML configuration for a page registry.
//!
//! # File layout
//!
//! ```yaml
//! extension: tpl          # recognised template extension (leading dot optional)
//! embed_prefix: embed     # filter name; directives are `embed:<page-id>`
//! autoescape: false       # HTML-escape substituted values
//! max_embed_depth: 16     # nesting limit for embedded pages
//! directories:            # scanned recursively, relative to this file
//!   - site
//! pages:                  # explicit registrations, relative to this file
//!   - id: home
//!     path: extra/home.tpl
//! ```
//!
//! Every key is optional; an empty file yields [`PagesConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::PageSource;

pub const DEFAULT_EXTENSION: &str = "tpl";
pub const DEFAULT_EMBED_PREFIX: &str = "embed";
pub const DEFAULT_MAX_EMBED_DEPTH: usize = 16;

/// Registry settings plus the sources to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub extension: String,
    pub embed_prefix: String,
    pub autoescape: bool,
    pub max_embed_depth: usize,
    pub directories: Vec<PathBuf>,
    pub pages: Vec<PageSource>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            embed_prefix: DEFAULT_EMBED_PREFIX.to_string(),
            autoescape: false,
            max_embed_depth: DEFAULT_MAX_EMBED_DEPTH,
            directories: Vec::new(),
            pages: Vec::new(),
        }
    }
}

impl PagesConfig {
    /// The extension without a leading dot, as compared against `Path::extension`.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Rewrite every relative directory and page path to sit under `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for dir in &mut self.directories {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        for page in &mut self.pages {
            if page.path.is_relative() {
                page.path = base.join(&page.path);
            }
        }
    }
}

/// Load a config file, resolving relative paths against its directory.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load(path: &Path) -> Result<PagesConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.to_path_buf() });
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io { path: path.to_path_buf(), source: e })?;
    let mut config = parse(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.resolve_paths(base);
    Ok(config)
}

// serde_yaml rejects an empty document for a struct; treat it as all-defaults.
fn parse(contents: &str) -> Result<PagesConfig, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(PagesConfig::default());
    }
    serde_yaml::from_str(contents)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults() {
        let cfg = PagesConfig::default();
        assert_eq!(cfg.extension(), "tpl");
        assert_eq!(cfg.embed_prefix, "embed");
        assert!(!cfg.autoescape);
        assert_eq!(cfg.max_embed_depth, 16);
    }

    #[test]
    fn extension_leading_dot_is_ignored() {
        let cfg = PagesConfig { extension: ".html".into(), ..PagesConfig::default() };
        assert_eq!(cfg.extension(), "html");
    }

    #[test]
    fn empty_file_is_default() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("pages.yaml");
        fs::write(&path, "\n").expect("write");
        let cfg = load(&path).expect("load");
        assert_eq!(cfg, PagesConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("pages.yaml");
        fs::write(&path, "autoescape: true\n").expect("write");
        let cfg = load(&path).expect("load");
        assert!(cfg.autoescape);
        assert_eq!(cfg.extension, DEFAULT_EXTENSION);
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("pages.yaml");
        fs::write(
            &path,
            "directories: [site, /abs/site]\npages:\n  - id: home\n    path: extra/home.tpl\n",
        )
        .expect("write");

        let cfg = load(&path).expect("load");
        assert_eq!(cfg.directories[0], dir.path().join("site"));
        assert_eq!(cfg.directories[1], PathBuf::from("/abs/site"));
        assert_eq!(cfg.pages[0].id.as_str(), "home");
        assert_eq!(cfg.pages[0].path, dir.path().join("extra/home.tpl"));
    }
}
