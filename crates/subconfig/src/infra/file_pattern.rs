//! Segment-by-segment glob expansion below one directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::pattern::PathPattern;

/// Expands `pattern` below `root` and returns matching files as absolute
/// paths.
///
/// Every segment but the last selects directories to descend into; the last
/// selects regular files. Hidden entries are never listed and symlinks are
/// followed when classifying entries. Missing or unreadable directories
/// contribute nothing. Results keep directory-listing order.
pub fn resolve(root: &Path, pattern: &PathPattern) -> Vec<PathBuf> {
    let mut matches = Vec::new();
    collect_matches(&absolute_root(root), pattern, 0, &mut matches);

    matches
}

/// Returns `root` made absolute against the current directory.
///
/// Falls back to `root` unchanged when the current directory is unavailable.
pub(crate) fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}

/// Recursion depth is bounded by the number of pattern segments.
fn collect_matches(dir: &Path, pattern: &PathPattern, index: usize, matches: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            debug!(dir = %dir.display(), %error, "skipping unreadable directory");
            return;
        }
    };
    let is_last_segment = index + 1 == pattern.len();

    for entry in entries.filter_map(Result::ok) {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.starts_with('.') || !pattern.segment_matches(index, name) {
            continue;
        }

        let path = entry.path();
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };

        if is_last_segment {
            if metadata.is_file() {
                matches.push(path);
            }
        } else if metadata.is_dir() {
            collect_matches(&path, pattern, index + 1, matches);
        }
    }
}
