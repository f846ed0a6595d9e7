//! Search locations resolved from the XDG and fcitx environment.

use std::ffi::OsString;
use std::path::PathBuf;

/// Subdirectory of the config home that belongs to fcitx.
pub const FCITX_PACKAGE_DIR: &str = "fcitx";
/// Installation prefix used when `FCITXDIR` is unset or empty.
pub const DEFAULT_FCITX_PREFIX: &str = "/usr";

/// Base directories and executable search locations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// `$XDG_CONFIG_HOME`, default `~/.config`.
    pub config_home: PathBuf,
    /// `$FCITXDIR/share/fcitx`, default `/usr/share/fcitx`.
    pub pkg_data_dir: PathBuf,
    /// `$PATH`.
    pub executable_path: Vec<PathBuf>,
    /// `$FCITXDIR/bin`, default `/usr/bin`.
    pub bin_dir: PathBuf,
}

impl SearchConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(dirs::home_dir(), |key| std::env::var_os(key))
    }

    /// Builds the configuration from `home` and a variable lookup.
    ///
    /// A relative or empty `XDG_CONFIG_HOME` is ignored.
    pub fn from_lookup(home: Option<PathBuf>, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let home = home.unwrap_or_else(|| PathBuf::from("."));

        let config_home =
            absolute_var(&lookup, "XDG_CONFIG_HOME").unwrap_or_else(|| home.join(".config"));

        let executable_path: Vec<PathBuf> = lookup("PATH")
            .map(|value| std::env::split_paths(&value).collect())
            .unwrap_or_default();

        let prefix = lookup("FCITXDIR")
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_FCITX_PREFIX), PathBuf::from);

        Self {
            config_home,
            pkg_data_dir: prefix.join("share").join(FCITX_PACKAGE_DIR),
            executable_path,
            bin_dir: prefix.join("bin"),
        }
    }

    /// The fcitx config directory first, then the package data directory.
    pub fn system_roots(&self) -> Vec<PathBuf> {
        vec![
            self.config_home.join(FCITX_PACKAGE_DIR),
            self.pkg_data_dir.clone(),
        ]
    }

    /// The fcitx subdirectory of the config home.
    pub fn user_roots(&self) -> Vec<PathBuf> {
        vec![self.config_home.join(FCITX_PACKAGE_DIR)]
    }
}

fn absolute_var(lookup: &impl Fn(&str) -> Option<OsString>, key: &str) -> Option<PathBuf> {
    lookup(key)
        .map(PathBuf::from)
        .filter(|path| path.is_absolute())
}
