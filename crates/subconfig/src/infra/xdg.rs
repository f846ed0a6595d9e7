use std::path::PathBuf;

use serde::Serialize;

use crate::config::SearchConfig;

/// Which family of search roots a discovery runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// The user's fcitx config directory, then the shipped package data.
    System,
    /// The user's writable configuration directory.
    User,
}

/// Source of ordered search roots per scope.
///
/// Production uses [`XdgSearchRoots`]; tests can inject
/// `MockSearchRootProvider`.
#[cfg_attr(test, mockall::automock)]
pub trait SearchRootProvider {
    /// Returns the roots for `scope` in priority order.
    fn search_roots(&self, scope: SearchScope) -> Vec<PathBuf>;
}

/// Fixed system and user root lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XdgSearchRoots {
    system: Vec<PathBuf>,
    user: Vec<PathBuf>,
}

impl XdgSearchRoots {
    /// Creates a provider with explicit root lists, each in priority order.
    pub fn new(system: Vec<PathBuf>, user: Vec<PathBuf>) -> Self {
        Self { system, user }
    }

    /// Builds the fcitx roots described by `config`.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.system_roots(), config.user_roots())
    }

    /// Replaces the system roots, keeping user roots.
    #[must_use]
    pub fn with_system_roots(mut self, system: Vec<PathBuf>) -> Self {
        self.system = system;
        self
    }

    /// Replaces the user roots, keeping system roots.
    #[must_use]
    pub fn with_user_roots(mut self, user: Vec<PathBuf>) -> Self {
        self.user = user;
        self
    }
}

impl SearchRootProvider for XdgSearchRoots {
    fn search_roots(&self, scope: SearchScope) -> Vec<PathBuf> {
        match scope {
            SearchScope::System => self.system.clone(),
            SearchScope::User => self.user.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_roots_returns_scope_specific_lists() {
        // Arrange
        let roots = XdgSearchRoots::new(
            vec![PathBuf::from("/usr/share/fcitx")],
            vec![PathBuf::from("/home/user/.config/fcitx")],
        );

        // Act
        let system = roots.search_roots(SearchScope::System);
        let user = roots.search_roots(SearchScope::User);

        // Assert
        assert_eq!(system, vec![PathBuf::from("/usr/share/fcitx")]);
        assert_eq!(user, vec![PathBuf::from("/home/user/.config/fcitx")]);
    }

    #[test]
    fn test_from_config_searches_config_home_in_both_scopes() {
        // Arrange
        let config = SearchConfig {
            config_home: PathBuf::from("/home/user/.config"),
            pkg_data_dir: PathBuf::from("/usr/share/fcitx"),
            executable_path: Vec::new(),
            bin_dir: PathBuf::from("/usr/bin"),
        };

        // Act
        let roots = XdgSearchRoots::from_config(&config);

        // Assert
        assert_eq!(
            roots.search_roots(SearchScope::System),
            vec![
                PathBuf::from("/home/user/.config/fcitx"),
                PathBuf::from("/usr/share/fcitx"),
            ]
        );
        assert_eq!(
            roots.search_roots(SearchScope::User),
            vec![PathBuf::from("/home/user/.config/fcitx")]
        );
    }

    #[test]
    fn test_with_roots_overrides_only_one_scope() {
        // Arrange
        let roots = XdgSearchRoots::new(vec![PathBuf::from("/a")], vec![PathBuf::from("/b")]);

        // Act
        let roots = roots
            .with_system_roots(vec![PathBuf::from("/c")])
            .with_user_roots(vec![PathBuf::from("/d"), PathBuf::from("/e")]);

        // Assert
        assert_eq!(
            roots.search_roots(SearchScope::System),
            vec![PathBuf::from("/c")]
        );
        assert_eq!(
            roots.search_roots(SearchScope::User),
            vec![PathBuf::from("/d"), PathBuf::from("/e")]
        );
    }
}
