use std::path::{Component, Path, PathBuf};

/// Extensions accepted from drag and drop.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Absolute, lexically cleaned form of `path` used as the identity of an
/// open file. `.` and `..` components are folded and relative paths are
/// anchored at the current directory; the filesystem is not consulted, so
/// paths that do not exist yet normalize too.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(e) => {
                log::warn!("Cannot resolve current directory: {}", e);
                path.to_path_buf()
            }
        }
    };
    clean(&absolute)
}

fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a link target relative to the directory holding `base_file`.
pub fn resolve_relative(base_file: &Path, target: &str) -> PathBuf {
    let dir = base_file.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&dir.join(target))
}

pub fn is_supported_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c//d.md")),
            PathBuf::from("/a/c/d.md")
        );
        assert_eq!(normalize_path(Path::new("/../x.md")), PathBuf::from("/x.md"));
    }

    #[test]
    fn test_normalize_relative_is_absolute() {
        let normalized = normalize_path(Path::new("notes/today.md"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("notes/today.md"));
    }

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/docs/guide/index.md");
        assert_eq!(resolve_relative(base, "intro.md"), PathBuf::from("/docs/guide/intro.md"));
        assert_eq!(resolve_relative(base, "../README.md"), PathBuf::from("/docs/README.md"));
        assert_eq!(resolve_relative(base, "./a/b.md"), PathBuf::from("/docs/guide/a/b.md"));
    }

    #[test]
    fn test_supported_documents() {
        assert!(is_supported_document(Path::new("/x/a.md")));
        assert!(is_supported_document(Path::new("/x/a.MARKDOWN")));
        assert!(is_supported_document(Path::new("notes.Txt")));
        assert!(!is_supported_document(Path::new("image.png")));
        assert!(!is_supported_document(Path::new("README")));
    }
}
