use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::pattern::PathPattern;
use crate::infra::file_pattern::{absolute_root, resolve};
use crate::infra::xdg::{SearchRootProvider, SearchScope};

/// Resolves `pattern` under every root of `scope` and returns the union of
/// matches relative to the root they were found in.
///
/// The same relative path found under several roots appears once.
pub fn discover(
    roots: &dyn SearchRootProvider,
    pattern: &PathPattern,
    scope: SearchScope,
) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();

    for root in roots.search_roots(scope) {
        let root = absolute_root(&root);
        for path in resolve(&root, pattern) {
            if let Ok(relative) = path.strip_prefix(&root) {
                files.insert(relative.to_path_buf());
            }
        }
    }

    debug!(%pattern, ?scope, count = files.len(), "discovered sub-configuration files");

    files
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::infra::xdg::{MockSearchRootProvider, XdgSearchRoots};

    fn write_file(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("file should have a parent"))
            .expect("test expectation should hold");
        fs::write(path, "").expect("test expectation should hold");
    }

    #[test]
    fn test_discover_collapses_duplicates_across_roots() {
        // Arrange
        let first = TempDir::new().expect("test expectation should hold");
        let second = TempDir::new().expect("test expectation should hold");
        write_file(first.path(), "conf/x.conf");
        write_file(second.path(), "conf/x.conf");
        write_file(second.path(), "conf/y.conf");
        let roots = XdgSearchRoots::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            Vec::new(),
        );
        let pattern = PathPattern::parse("conf/*.conf").expect("pattern should parse");

        // Act
        let files = discover(&roots, &pattern, SearchScope::System);

        // Assert
        assert_eq!(
            files,
            BTreeSet::from([PathBuf::from("conf/x.conf"), PathBuf::from("conf/y.conf")])
        );
    }

    #[test]
    fn test_discover_scenario_excludes_nested_directory() {
        // Arrange
        let system = TempDir::new().expect("test expectation should hold");
        write_file(system.path(), "im/a.conf");
        write_file(system.path(), "im/sub/b.conf");
        let roots = XdgSearchRoots::new(vec![system.path().to_path_buf()], Vec::new());
        let pattern = PathPattern::from_segments(["im", "*.conf"]).expect("pattern should build");

        // Act
        let files = discover(&roots, &pattern, SearchScope::System);

        // Assert
        assert_eq!(files, BTreeSet::from([PathBuf::from("im/a.conf")]));
    }

    #[test]
    fn test_discover_uses_roots_of_requested_scope() {
        // Arrange
        let user = TempDir::new().expect("test expectation should hold");
        write_file(user.path(), "table/user.conf");
        let user_root = user.path().to_path_buf();
        let mut roots = MockSearchRootProvider::new();
        roots
            .expect_search_roots()
            .withf(|scope| *scope == SearchScope::User)
            .times(1)
            .returning(move |_| vec![user_root.clone()]);
        let pattern = PathPattern::parse("table/*.conf").expect("pattern should parse");

        // Act
        let files = discover(&roots, &pattern, SearchScope::User);

        // Assert
        assert_eq!(files, BTreeSet::from([PathBuf::from("table/user.conf")]));
    }

    #[test]
    fn test_discover_tolerates_missing_roots() {
        // Arrange
        let present = TempDir::new().expect("test expectation should hold");
        write_file(present.path(), "a.conf");
        let roots = XdgSearchRoots::new(
            vec![present.path().join("missing"), present.path().to_path_buf()],
            Vec::new(),
        );
        let pattern = PathPattern::parse("*.conf").expect("pattern should parse");

        // Act
        let files = discover(&roots, &pattern, SearchScope::System);

        // Assert
        assert_eq!(files, BTreeSet::from([PathBuf::from("a.conf")]));
    }
}
