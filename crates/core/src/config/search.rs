//! Locating the configuration file.
//!
//! Resolution is first-match-wins:
//! 1. An absolute path is used as-is and must exist
//! 2. A relative path present in the working directory is used directly
//! 3. Otherwise the single active [`SearchStrategy`] is tried
//!
//! Any strategy that was requested and finds nothing is a hard error.

use crate::config::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Marker entry identifying a version-control root.
const VCS_ROOT_MARKER: &str = ".git";

/// How to look for a relative configuration file that is not in the
/// working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    #[default]
    None,
    /// Look relative to the enclosing repository root.
    GitRoot,
    /// Look in every ancestor of the working directory.
    Recursive,
}

impl SearchStrategy {
    /// Build a strategy from the two command-line flags.
    ///
    /// # Errors
    ///
    /// Both flags at once is [`ConfigError::ConflictingSearchStrategies`].
    pub fn from_flags(search_git_root: bool, search_recursive: bool) -> ConfigResult<Self> {
        match (search_git_root, search_recursive) {
            (true, true) => Err(ConfigError::ConflictingSearchStrategies),
            (true, false) => Ok(Self::GitRoot),
            (false, true) => Ok(Self::Recursive),
            (false, false) => Ok(Self::None),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::GitRoot => "git-root",
            Self::Recursive => "recursive",
        }
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Absolute path, or relative path present in the working directory.
    Explicit(PathBuf),
    /// Found relative to the repository root.
    GitRoot(PathBuf),
    /// Found in an ancestor of the working directory.
    Recursive(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::GitRoot(path) | Self::Recursive(path) => path,
        }
    }
}

/// Locate the configuration file for `requested`.
///
/// Returns `Ok(None)` only when no file was requested and no search strategy
/// is active.
pub fn locate(
    requested: Option<&Path>,
    strategy: SearchStrategy,
    working_dir: &Path,
) -> ConfigResult<Option<ConfigSource>> {
    let Some(requested) = requested else {
        return match strategy {
            SearchStrategy::None => Ok(None),
            other => Err(ConfigError::SearchWithoutFile {
                strategy: other.name(),
            }),
        };
    };

    if requested.is_absolute() {
        if requested.is_file() {
            return Ok(Some(ConfigSource::Explicit(requested.to_path_buf())));
        }
        return Err(ConfigError::NotFound {
            path: requested.to_path_buf(),
            searched: vec![requested.to_path_buf()],
        });
    }

    let local = working_dir.join(requested);
    if local.is_file() {
        return Ok(Some(ConfigSource::Explicit(local)));
    }
    let mut searched = vec![local];

    match strategy {
        SearchStrategy::None => {}
        SearchStrategy::GitRoot => {
            if let Some(root) = find_git_root(working_dir) {
                let candidate = root.join(requested);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "config found at git root");
                    return Ok(Some(ConfigSource::GitRoot(candidate)));
                }
                searched.push(candidate);
            } else {
                tracing::debug!(start = %working_dir.display(), "no repository root found");
            }
        }
        SearchStrategy::Recursive => {
            for dir in working_dir.ancestors().skip(1) {
                let candidate = dir.join(requested);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "config found in ancestor");
                    return Ok(Some(ConfigSource::Recursive(candidate)));
                }
                searched.push(candidate);
            }
        }
    }

    Err(ConfigError::NotFound {
        path: requested.to_path_buf(),
        searched,
    })
}

/// Walk upward from `start` to the first directory holding a `.git` entry.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(VCS_ROOT_MARKER).exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_flags() {
        assert_eq!(SearchStrategy::from_flags(false, false).ok(), Some(SearchStrategy::None));
        assert_eq!(SearchStrategy::from_flags(true, false).ok(), Some(SearchStrategy::GitRoot));
        assert_eq!(SearchStrategy::from_flags(false, true).ok(), Some(SearchStrategy::Recursive));
        assert!(matches!(
            SearchStrategy::from_flags(true, true),
            Err(ConfigError::ConflictingSearchStrategies)
        ));
    }

    #[test]
    fn test_no_file_no_strategy_is_empty() {
        let dir = tempdir().expect("Failed to create temp dir");
        let source = locate(None, SearchStrategy::None, dir.path()).expect("no file is valid");
        assert!(source.is_none());
    }

    #[test]
    fn test_strategy_without_file_is_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = locate(None, SearchStrategy::Recursive, dir.path());
        assert!(matches!(
            result,
            Err(ConfigError::SearchWithoutFile { strategy: "recursive" })
        ));
    }

    #[test]
    fn test_relative_path_in_working_dir_wins() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("config.yaml"), "a: 1").expect("Failed to write config");

        let source = locate(
            Some(Path::new("config.yaml")),
            SearchStrategy::Recursive,
            dir.path(),
        )
        .expect("config should be found");
        assert_eq!(source, Some(ConfigSource::Explicit(dir.path().join("config.yaml"))));
    }

    #[test]
    fn test_missing_absolute_path() {
        let dir = tempdir().expect("Failed to create temp dir");
        let missing = dir.path().join("missing.yaml");
        let result = locate(Some(&missing), SearchStrategy::GitRoot, dir.path());
        match result {
            Err(ConfigError::NotFound { path, searched }) => {
                assert_eq!(path, missing);
                assert_eq!(searched, vec![missing.clone()]);
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_git_root_search() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        fs::create_dir(root.join(".git")).expect("Failed to create .git");
        fs::create_dir_all(root.join("src/nested")).expect("Failed to create nested dirs");
        fs::write(root.join("dc-git-root.yaml"), "a: 1").expect("Failed to write config");

        let working_dir = root.join("src/nested");
        assert_eq!(find_git_root(&working_dir), Some(root.to_path_buf()));

        let source = locate(
            Some(Path::new("dc-git-root.yaml")),
            SearchStrategy::GitRoot,
            &working_dir,
        )
        .expect("config should be found at git root");
        assert_eq!(source, Some(ConfigSource::GitRoot(root.join("dc-git-root.yaml"))));
    }

    #[test]
    fn test_git_root_search_file_missing() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git");

        let result = locate(
            Some(Path::new("dc-absent-config.yaml")),
            SearchStrategy::GitRoot,
            dir.path(),
        );
        match result {
            Err(ConfigError::NotFound { searched, .. }) => assert_eq!(searched.len(), 2),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_recursive_search() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c")).expect("Failed to create nested dirs");
        fs::write(root.join("a/dc-recursive.yaml"), "a: 1").expect("Failed to write config");

        let source = locate(
            Some(Path::new("dc-recursive.yaml")),
            SearchStrategy::Recursive,
            &root.join("a/b/c"),
        )
        .expect("config should be found in an ancestor");
        assert_eq!(source, Some(ConfigSource::Recursive(root.join("a/dc-recursive.yaml"))));
    }

    #[test]
    fn test_recursive_search_exhausted() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = locate(
            Some(Path::new("dc-never-exists-7f3a.yaml")),
            SearchStrategy::Recursive,
            dir.path(),
        );
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_relative_path_without_strategy_not_found() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = locate(Some(Path::new("config.yaml")), SearchStrategy::None, dir.path());
        match result {
            Err(ConfigError::NotFound { searched, .. }) => {
                assert_eq!(searched, vec![dir.path().join("config.yaml")]);
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }
}
