//! Classified sub-configuration surfaces of an addon.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::domain::pattern::{PathPattern, SubConfigPattern, SubConfigType};
use crate::infra::discover::discover;
use crate::infra::program::ProgramLocator;
use crate::infra::registry::PluginRegistry;
use crate::infra::xdg::{SearchRootProvider, SearchScope};

/// External collaborators consulted while classifying a sub-configuration.
#[derive(Clone, Copy)]
pub struct DiscoveryContext<'a> {
    /// Search roots for file discovery.
    pub roots: &'a dyn SearchRootProvider,
    /// Executable lookup for program sub-configurations.
    pub programs: &'a ProgramLocator,
}

/// Config files edited through a config description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFileSubConfig {
    /// Discovered files, relative to their system search root.
    pub file_list: BTreeSet<PathBuf>,
    /// Config description file name.
    pub config_desc: String,
}

/// Files opened with a native editor for their mime type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeFileSubConfig {
    /// MIME type handed to the native editor.
    pub mime_type: String,
    /// Native module path; empty when none was declared.
    pub native_path: String,
    /// Retained so the file sets can be refreshed.
    pub pattern: PathPattern,
    /// Files found under the system roots.
    pub file_list: BTreeSet<PathBuf>,
    /// Files found under the user roots.
    pub user_file_list: BTreeSet<PathBuf>,
}

impl NativeFileSubConfig {
    /// Re-runs system and user discovery for the retained pattern.
    pub fn update_file_list(&mut self, roots: &dyn SearchRootProvider) {
        self.file_list = discover(roots, &self.pattern, SearchScope::System);
        self.user_file_list = discover(roots, &self.pattern, SearchScope::User);
    }
}

/// External configuration program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramSubConfig {
    /// Absolute path of the executable; `None` when resolution failed.
    pub program: Option<PathBuf>,
}

/// Configuration provided by a loaded plugin module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PluginSubConfig {
    /// Module path a plugin wrapper must be loaded for.
    pub native_path: String,
}

/// Kind-specific payload of a [`SubConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubConfigKind {
    /// See [`ConfigFileSubConfig`].
    ConfigFile(ConfigFileSubConfig),
    /// See [`NativeFileSubConfig`].
    NativeFile(NativeFileSubConfig),
    /// See [`ProgramSubConfig`].
    Program(ProgramSubConfig),
    /// See [`PluginSubConfig`].
    Plugin(PluginSubConfig),
}

/// One named configuration surface of an addon.
///
/// The kind is fixed at construction. Only [`SubConfigKind::NativeFile`]
/// changes afterwards, through [`SubConfig::update_file_list`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubConfig {
    name: String,
    kind: SubConfigKind,
}

impl SubConfig {
    /// Classifies `pattern`, running file discovery or executable lookup as
    /// the kind requires.
    pub fn new(name: &str, pattern: &SubConfigPattern, context: &DiscoveryContext<'_>) -> Self {
        let kind = match pattern {
            SubConfigPattern::ConfigFile {
                pattern,
                config_desc,
            } => SubConfigKind::ConfigFile(ConfigFileSubConfig {
                file_list: discover(context.roots, pattern, SearchScope::System),
                config_desc: config_desc.clone(),
            }),
            SubConfigPattern::NativeFile {
                pattern,
                mime_type,
                native_path,
            } => {
                let mut native = NativeFileSubConfig {
                    mime_type: mime_type.clone(),
                    native_path: native_path.clone(),
                    pattern: pattern.clone(),
                    file_list: BTreeSet::new(),
                    user_file_list: BTreeSet::new(),
                };
                native.update_file_list(context.roots);

                SubConfigKind::NativeFile(native)
            }
            SubConfigPattern::Program { program } => SubConfigKind::Program(ProgramSubConfig {
                program: context.programs.locate(program),
            }),
            SubConfigPattern::Plugin { native_path } => SubConfigKind::Plugin(PluginSubConfig {
                native_path: native_path.clone(),
            }),
        };

        Self {
            name: name.to_string(),
            kind,
        }
    }

    /// Name the sub-configuration was declared under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind together with its payload.
    pub fn kind(&self) -> &SubConfigKind {
        &self.kind
    }

    /// Kind without its payload.
    pub fn sub_config_type(&self) -> SubConfigType {
        match &self.kind {
            SubConfigKind::ConfigFile(_) => SubConfigType::ConfigFile,
            SubConfigKind::NativeFile(_) => SubConfigType::NativeFile,
            SubConfigKind::Program(_) => SubConfigType::Program,
            SubConfigKind::Plugin(_) => SubConfigType::Plugin,
        }
    }

    /// System-scope files for config-file and native-file kinds.
    pub fn file_list(&self) -> Option<&BTreeSet<PathBuf>> {
        match &self.kind {
            SubConfigKind::ConfigFile(config) => Some(&config.file_list),
            SubConfigKind::NativeFile(native) => Some(&native.file_list),
            SubConfigKind::Program(_) | SubConfigKind::Plugin(_) => None,
        }
    }

    /// User-scope files for the native-file kind.
    pub fn user_file_list(&self) -> Option<&BTreeSet<PathBuf>> {
        match &self.kind {
            SubConfigKind::NativeFile(native) => Some(&native.user_file_list),
            _ => None,
        }
    }

    /// Config description file of the config-file kind.
    pub fn config_desc(&self) -> Option<&str> {
        match &self.kind {
            SubConfigKind::ConfigFile(config) => Some(&config.config_desc),
            _ => None,
        }
    }

    /// MIME type of the native-file kind.
    pub fn mime_type(&self) -> Option<&str> {
        match &self.kind {
            SubConfigKind::NativeFile(native) => Some(&native.mime_type),
            _ => None,
        }
    }

    /// Native module path of the native-file and plugin kinds.
    pub fn native_path(&self) -> Option<&str> {
        match &self.kind {
            SubConfigKind::NativeFile(NativeFileSubConfig { native_path, .. })
            | SubConfigKind::Plugin(PluginSubConfig { native_path }) => Some(native_path),
            _ => None,
        }
    }

    /// Resolved executable of the program kind, if it was found.
    pub fn program(&self) -> Option<&Path> {
        match &self.kind {
            SubConfigKind::Program(program) => program.program.as_deref(),
            _ => None,
        }
    }

    /// Re-runs discovery for native-file sub-configurations; other kinds are
    /// left untouched.
    pub fn update_file_list(&mut self, roots: &dyn SearchRootProvider) {
        if let SubConfigKind::NativeFile(native) = &mut self.kind {
            native.update_file_list(roots);
        }
    }

    /// Returns whether this sub-configuration can be opened.
    ///
    /// Plugin validity is looked up in `plugins` on every call, so a plugin
    /// loaded after construction becomes valid without rebuilding.
    pub fn is_valid(&self, plugins: &dyn PluginRegistry) -> bool {
        match &self.kind {
            SubConfigKind::ConfigFile(_) | SubConfigKind::NativeFile(_) => true,
            SubConfigKind::Program(program) => program.program.is_some(),
            SubConfigKind::Plugin(plugin) => plugins.has_wrapper(&plugin.native_path),
        }
    }
}
