//! Registries the settings page consults for addon and plugin state.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::addon::Addon;
use crate::infra::xdg::{SearchRootProvider, SearchScope};

/// Directory below each system root that holds config descriptions.
pub const CONFIG_DESC_DIR: &str = "configdesc";

/// Addon metadata lookup.
#[cfg_attr(test, mockall::automock)]
pub trait AddonRegistry {
    /// Returns the addon registered under `name`, if any.
    fn find_addon_by_name(&self, name: &str) -> Option<Addon>;
}

/// Loaded plugin wrappers keyed by native module path.
///
/// Checked at validation time because plugins can be loaded after a
/// sub-configuration was classified.
#[cfg_attr(test, mockall::automock)]
pub trait PluginRegistry {
    /// Returns whether a wrapper is loaded for `native_path`.
    fn has_wrapper(&self, native_path: &str) -> bool;
}

/// Config description availability.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigDescLoader {
    /// Returns whether a description named `desc_file` can be loaded.
    fn has_config_desc(&self, desc_file: &str) -> bool;
}

/// In-memory [`AddonRegistry`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddonCatalog {
    addons: BTreeMap<String, Addon>,
}

impl AddonCatalog {
    /// Adds or replaces the addon under its own name.
    pub fn insert(&mut self, addon: Addon) {
        self.addons.insert(addon.name.clone(), addon);
    }
}

impl FromIterator<Addon> for AddonCatalog {
    fn from_iter<T: IntoIterator<Item = Addon>>(iter: T) -> Self {
        let mut catalog = Self::default();
        for addon in iter {
            catalog.insert(addon);
        }

        catalog
    }
}

impl AddonRegistry for AddonCatalog {
    fn find_addon_by_name(&self, name: &str) -> Option<Addon> {
        self.addons.get(name).cloned()
    }
}

/// In-memory [`PluginRegistry`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadedPlugins {
    native_paths: BTreeSet<String>,
}

impl LoadedPlugins {
    /// Marks a wrapper as loaded for `native_path`.
    pub fn register(&mut self, native_path: impl Into<String>) {
        self.native_paths.insert(native_path.into());
    }

    /// Returns whether a wrapper was removed.
    pub fn unregister(&mut self, native_path: &str) -> bool {
        self.native_paths.remove(native_path)
    }
}

impl<S: Into<String>> FromIterator<S> for LoadedPlugins {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            native_paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl PluginRegistry for LoadedPlugins {
    fn has_wrapper(&self, native_path: &str) -> bool {
        self.native_paths.contains(native_path)
    }
}

/// Finds config descriptions in `configdesc/` below the system roots.
pub struct ConfigDescDirectory<'a> {
    roots: &'a dyn SearchRootProvider,
}

impl<'a> ConfigDescDirectory<'a> {
    /// Searches the system roots of `roots`.
    pub fn new(roots: &'a dyn SearchRootProvider) -> Self {
        Self { roots }
    }
}

impl ConfigDescLoader for ConfigDescDirectory<'_> {
    fn has_config_desc(&self, desc_file: &str) -> bool {
        if desc_file.is_empty() || desc_file.contains('/') {
            return false;
        }

        self.roots
            .search_roots(SearchScope::System)
            .iter()
            .any(|root| root.join(CONFIG_DESC_DIR).join(desc_file).is_file())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::infra::xdg::XdgSearchRoots;

    #[test]
    fn test_addon_catalog_finds_by_name() {
        // Arrange
        let catalog: AddonCatalog = [Addon::new(
            "fcitx-classic-ui",
            "Classic",
            "skin:native:skin/*/fcitx_skin.conf:text/plain",
        )]
        .into_iter()
        .collect();

        // Act
        let found = catalog.find_addon_by_name("fcitx-classic-ui");
        let missing = catalog.find_addon_by_name("fcitx-kimpanel-ui");

        // Assert
        assert_eq!(found.map(|addon| addon.general_name), Some("Classic".to_string()));
        assert_eq!(missing, None);
    }

    #[test]
    fn test_loaded_plugins_register_and_unregister() {
        // Arrange
        let mut plugins: LoadedPlugins = ["libtable"].into_iter().collect();

        // Act
        plugins.register("libpinyin");
        let removed = plugins.unregister("libtable");

        // Assert
        assert!(removed);
        assert!(plugins.has_wrapper("libpinyin"));
        assert!(!plugins.has_wrapper("libtable"));
    }

    #[test]
    fn test_config_desc_directory_checks_every_system_root() {
        // Arrange
        let first = TempDir::new().expect("test expectation should hold");
        let second = TempDir::new().expect("test expectation should hold");
        fs::create_dir_all(second.path().join(CONFIG_DESC_DIR))
            .expect("test expectation should hold");
        fs::write(
            second.path().join(CONFIG_DESC_DIR).join("fcitx-classic-ui.desc"),
            "",
        )
        .expect("test expectation should hold");
        let roots = XdgSearchRoots::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            Vec::new(),
        );
        let loader = ConfigDescDirectory::new(&roots);

        // Act
        let present = loader.has_config_desc("fcitx-classic-ui.desc");
        let absent = loader.has_config_desc("fcitx-kimpanel-ui.desc");
        let escaping = loader.has_config_desc("../configdesc/fcitx-classic-ui.desc");

        // Assert
        assert!(present);
        assert!(!absent);
        assert!(!escaping);
    }
}
