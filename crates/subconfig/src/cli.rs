//! Command-line front end for inspecting sub-configuration discovery.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;

use crate::config::SearchConfig;
use crate::domain::pattern::{PathPattern, PatternError, SubConfigParser, SubConfigType};
use crate::domain::subconfig::{DiscoveryContext, SubConfig};
use crate::infra::discover::discover;
use crate::infra::file_pattern::resolve;
use crate::infra::program::ProgramLocator;
use crate::infra::registry::{LoadedPlugins, PluginRegistry};
use crate::infra::xdg::{SearchScope, XdgSearchRoots};

#[derive(Debug, Parser)]
#[command(
    name = "subconfig",
    version,
    about = "Discover the configuration surfaces of fcitx addons"
)]
pub struct Cli {
    /// Print JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,
    /// Replace the system search roots; repeatable.
    #[arg(long = "system-root", value_name = "DIR", global = true)]
    pub system_roots: Vec<PathBuf>,
    /// Replace the user search roots; repeatable.
    #[arg(long = "user-root", value_name = "DIR", global = true)]
    pub user_roots: Vec<PathBuf>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List absolute matches of a pattern below one directory.
    Resolve {
        root: PathBuf,
        /// `/`-separated glob segments, e.g. `skin/*/fcitx_skin.conf`.
        pattern: String,
    },
    /// List matches of a pattern across all roots of a scope.
    Discover {
        pattern: String,
        #[arg(long, value_enum, default_value_t = ScopeArg::System)]
        scope: ScopeArg,
    },
    /// Parse a sub-configuration declaration and classify every entry.
    Inspect {
        /// Declaration such as `dict:configfile:table/*.conf:table.desc`.
        sub_config: String,
        /// Native path of a plugin to treat as loaded; repeatable.
        #[arg(long = "loaded-plugin", value_name = "PATH")]
        loaded_plugins: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    System,
    User,
}

impl From<ScopeArg> for SearchScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::System => Self::System,
            ScopeArg::User => Self::User,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of `inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub domain: Option<String>,
    pub sub_configs: Vec<SubConfigReport>,
}

/// One classified sub-configuration.
#[derive(Debug, Serialize)]
pub struct SubConfigReport {
    pub name: String,
    pub kind: SubConfigType,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_files: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
}

impl SubConfigReport {
    fn new(sub_config: &SubConfig, plugins: &dyn PluginRegistry) -> Self {
        Self {
            name: sub_config.name().to_string(),
            kind: sub_config.sub_config_type(),
            valid: sub_config.is_valid(plugins),
            files: sub_config
                .file_list()
                .map(|files| files.iter().cloned().collect()),
            user_files: sub_config
                .user_file_list()
                .map(|files| files.iter().cloned().collect()),
            config_desc: sub_config.config_desc().map(str::to_string),
            mime_type: sub_config.mime_type().map(str::to_string),
            native_path: sub_config.native_path().map(str::to_string),
            program: sub_config.program().map(std::path::Path::to_path_buf),
        }
    }
}

/// Runs `cli` against the process environment, writing results to `out`.
///
/// # Errors
/// Returns [`CliError`] for an invalid pattern or when output fails.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    run_with_config(cli, &SearchConfig::from_env(), out)
}

/// Runs `cli` with an explicit search configuration.
///
/// # Errors
/// Returns [`CliError`] for an invalid pattern or when output fails.
pub fn run_with_config(
    cli: &Cli,
    config: &SearchConfig,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let roots = search_roots(cli, config);

    match &cli.command {
        Command::Resolve { root, pattern } => {
            let pattern = PathPattern::parse(pattern)?;
            let matches = resolve(root, &pattern);
            write_paths(cli.json, &matches, out)
        }
        Command::Discover { pattern, scope } => {
            let pattern = PathPattern::parse(pattern)?;
            let files: Vec<PathBuf> = discover(&roots, &pattern, (*scope).into())
                .into_iter()
                .collect();
            write_paths(cli.json, &files, out)
        }
        Command::Inspect {
            sub_config,
            loaded_plugins,
        } => {
            let programs = ProgramLocator::from_config(config);
            let plugins: LoadedPlugins = loaded_plugins.iter().cloned().collect();
            let context = DiscoveryContext {
                roots: &roots,
                programs: &programs,
            };
            let report = inspect(sub_config, &context, &plugins);
            write_report(cli.json, &report, out)
        }
    }
}

fn search_roots(cli: &Cli, config: &SearchConfig) -> XdgSearchRoots {
    let mut roots = XdgSearchRoots::from_config(config);
    if !cli.system_roots.is_empty() {
        roots = roots.with_system_roots(cli.system_roots.clone());
    }
    if !cli.user_roots.is_empty() {
        roots = roots.with_user_roots(cli.user_roots.clone());
    }

    roots
}

fn inspect(
    sub_config: &str,
    context: &DiscoveryContext<'_>,
    plugins: &dyn PluginRegistry,
) -> InspectReport {
    let parser = SubConfigParser::parse(sub_config);
    let sub_configs = parser
        .names()
        .filter_map(|name| parser.sub_config(name, context))
        .map(|sub_config| SubConfigReport::new(&sub_config, plugins))
        .collect();

    InspectReport {
        domain: parser.domain().map(str::to_string),
        sub_configs,
    }
}

fn write_paths(json: bool, paths: &[PathBuf], out: &mut dyn Write) -> Result<(), CliError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, paths)?;
        writeln!(out)?;
        return Ok(());
    }

    for path in paths {
        writeln!(out, "{}", path.display())?;
    }

    Ok(())
}

fn write_report(json: bool, report: &InspectReport, out: &mut dyn Write) -> Result<(), CliError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    if let Some(domain) = &report.domain {
        writeln!(out, "domain: {domain}")?;
    }
    for sub_config in &report.sub_configs {
        let validity = if sub_config.valid { "valid" } else { "invalid" };
        writeln!(out, "{}\t{}\t{validity}", sub_config.name, sub_config.kind)?;
        if let Some(program) = &sub_config.program {
            writeln!(out, "  program: {}", program.display())?;
        }
        for file in sub_config.files.iter().flatten() {
            writeln!(out, "  {}", file.display())?;
        }
        for file in sub_config.user_files.iter().flatten() {
            writeln!(out, "  user: {}", file.display())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn write_file(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("file should have a parent"))
            .expect("test expectation should hold");
        fs::write(path, "").expect("test expectation should hold");
    }

    fn isolated_config(root: &Path) -> SearchConfig {
        SearchConfig {
            config_home: root.join("config-home"),
            pkg_data_dir: root.join("share/fcitx"),
            executable_path: Vec::new(),
            bin_dir: root.join("bin"),
        }
    }

    fn run_to_string(args: &[&str], config: &SearchConfig) -> String {
        let cli = Cli::try_parse_from(args).expect("arguments should parse");
        let mut out = Vec::new();
        run_with_config(&cli, config, &mut out).expect("command should succeed");

        String::from_utf8(out).expect("output should be utf-8")
    }

    #[test]
    fn test_discover_uses_configured_system_roots() {
        // Arrange
        let temp_dir = TempDir::new().expect("test expectation should hold");
        write_file(&temp_dir.path().join("share/fcitx"), "table/a.conf");
        write_file(&temp_dir.path().join("config-home/fcitx"), "table/b.conf");
        let config = isolated_config(temp_dir.path());

        // Act
        let output = run_to_string(&["subconfig", "discover", "table/*.conf"], &config);

        // Assert
        assert_eq!(output, "table/a.conf\ntable/b.conf\n");
    }

    #[test]
    fn test_discover_user_scope_with_root_override() {
        // Arrange
        let temp_dir = TempDir::new().expect("test expectation should hold");
        let user_root = temp_dir.path().join("override");
        write_file(&user_root, "skin/mine/fcitx_skin.conf");
        let config = isolated_config(temp_dir.path());
        let user_root_arg = user_root.to_string_lossy().to_string();

        // Act
        let output = run_to_string(
            &[
                "subconfig",
                "--user-root",
                user_root_arg.as_str(),
                "discover",
                "skin/*/fcitx_skin.conf",
                "--scope",
                "user",
            ],
            &config,
        );

        // Assert
        assert_eq!(output, "skin/mine/fcitx_skin.conf\n");
    }

    #[test]
    fn test_inspect_json_reports_each_kind() {
        // Arrange
        let temp_dir = TempDir::new().expect("test expectation should hold");
        write_file(&temp_dir.path().join("share/fcitx"), "table/a.conf");
        let config = isolated_config(temp_dir.path());

        // Act
        let output = run_to_string(
            &[
                "subconfig",
                "--json",
                "inspect",
                "fcitx-table:domain,dict:configfile:table/*.conf:table.desc,\
                 setup:program:missing-tool,panel:plugin:libpanel",
                "--loaded-plugin",
                "libpanel",
            ],
            &config,
        );

        // Assert
        let report: serde_json::Value =
            serde_json::from_str(&output).expect("output should be json");
        assert_eq!(report["domain"], "fcitx-table");
        let sub_configs = report["sub_configs"]
            .as_array()
            .expect("sub_configs should be an array");
        assert_eq!(sub_configs.len(), 3);
        assert_eq!(sub_configs[0]["name"], "dict");
        assert_eq!(sub_configs[0]["kind"], "config_file");
        assert_eq!(sub_configs[0]["files"][0], "table/a.conf");
        assert_eq!(sub_configs[1]["name"], "panel");
        assert_eq!(sub_configs[1]["valid"], true);
        assert_eq!(sub_configs[2]["name"], "setup");
        assert_eq!(sub_configs[2]["valid"], false);
        assert!(sub_configs[2].get("program").is_none());
    }

    #[test]
    fn test_inspect_text_marks_validity() {
        // Arrange
        let temp_dir = TempDir::new().expect("test expectation should hold");
        let config = isolated_config(temp_dir.path());

        // Act
        let output = run_to_string(
            &["subconfig", "inspect", "panel:plugin:libpanel"],
            &config,
        );

        // Assert
        assert_eq!(output, "panel\tplugin\tinvalid\n");
    }

    #[test]
    fn test_resolve_rejects_absolute_pattern() {
        // Arrange
        let temp_dir = TempDir::new().expect("test expectation should hold");
        let config = isolated_config(temp_dir.path());
        let root = temp_dir.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["subconfig", "resolve", root.as_str(), "/etc/*.conf"])
            .expect("arguments should parse");
        let mut out = Vec::new();

        // Act
        let result = run_with_config(&cli, &config, &mut out);

        // Assert
        assert!(matches!(
            result,
            Err(CliError::Pattern(PatternError::Absolute { .. }))
        ));
    }
}
