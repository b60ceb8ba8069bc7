//! Directory loader: lazily walks a tree for template files.

use std::path::Path;

use walkdir::WalkDir;

use pages_core::{PageId, PageSource};

use crate::error::PageError;

/// Every file below `root` whose extension is `extension`, keyed by its
/// path relative to `root`.
///
/// The walk is recursive, follows symbolic links and keeps the
/// filesystem's own entry order; callers needing a stable order must sort.
/// A linked template keeps the link's own path as its id. Entries that
/// cannot be read, including link cycles, are yielded as [`PageError::Walk`].
pub fn scan<'a>(
    root: &'a Path,
    extension: &'a str,
) -> impl Iterator<Item = Result<PageSource, PageError>> + 'a {
    let extension = extension.trim_start_matches('.');
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(PageError::Walk { root: root.to_path_buf(), source: e }))
                }
            };
            if !entry.file_type().is_file() {
                return None;
            }
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(extension) {
                return None;
            }
            // Scanning a single file yields an empty relative path; use its name.
            let rel = match path.strip_prefix(root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel,
                _ => Path::new(entry.file_name()),
            };
            Some(Ok(PageSource::new(PageId::from_relative_path(rel), path)))
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, "x").expect("write");
    }

    fn ids(root: &Path, ext: &str) -> Vec<String> {
        let mut ids: Vec<String> = scan(root, ext)
            .map(|r| r.expect("scan entry").id.0)
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn finds_nested_templates_only() {
        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "index.tpl");
        touch(dir.path(), "bits/header.tpl");
        touch(dir.path(), "bits/deeper/footer.tpl");
        touch(dir.path(), "style.css");
        touch(dir.path(), "notes.tpl.bak");

        assert_eq!(
            ids(dir.path(), "tpl"),
            vec!["bits/deeper/footer.tpl", "bits/header.tpl", "index.tpl"]
        );
    }

    #[test]
    fn leading_dot_in_extension_is_accepted() {
        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "a.html");
        assert_eq!(ids(dir.path(), ".html"), vec!["a.html"]);
    }

    #[test]
    fn directory_named_like_a_template_is_skipped() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("weird.tpl")).expect("mkdir");
        touch(dir.path(), "weird.tpl/inner.tpl");
        assert_eq!(ids(dir.path(), "tpl"), vec!["weird.tpl/inner.tpl"]);
    }

    #[test]
    fn single_file_root_uses_file_name() {
        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "only.tpl");
        assert_eq!(ids(&dir.path().join("only.tpl"), "tpl"), vec!["only.tpl"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_template_is_found_under_link_name() {
        let dir = TempDir::new().expect("tempdir");
        let elsewhere = TempDir::new().expect("tempdir");
        touch(dir.path(), "index.tpl");
        touch(elsewhere.path(), "real.tpl");
        std::os::unix::fs::symlink(elsewhere.path().join("real.tpl"), dir.path().join("shared.tpl"))
            .expect("symlink");

        assert_eq!(ids(dir.path(), "tpl"), vec!["index.tpl", "shared.tpl"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_walked() {
        let dir = TempDir::new().expect("tempdir");
        let elsewhere = TempDir::new().expect("tempdir");
        touch(elsewhere.path(), "footer.tpl");
        std::os::unix::fs::symlink(elsewhere.path(), dir.path().join("bits")).expect("symlink");

        assert_eq!(ids(dir.path(), "tpl"), vec!["bits/footer.tpl"]);
    }

    #[test]
    fn missing_root_yields_walk_error() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("missing");
        let results: Vec<_> = scan(&missing, "tpl").collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(PageError::Walk { .. })));
    }

    #[test]
    fn source_paths_point_into_root() {
        let dir = TempDir::new().expect("tempdir");
        touch(dir.path(), "bits/header.tpl");
        let src = scan(dir.path(), "tpl").next().expect("one entry").expect("ok");
        assert_eq!(src.path, dir.path().join("bits/header.tpl"));
    }
}
