//! Path patterns and the addon sub-configuration declaration parser.
//!
//! Addons declare their configuration surfaces in one comma-separated
//! string such as
//! `fcitx-sunpinyin:domain,dict:configfile:sunpinyin/*.conf:sunpinyin.desc`.
//! [`SubConfigParser`] turns that string into named [`SubConfigPattern`]
//! values that [`crate::domain::subconfig::SubConfig`] classifies.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::subconfig::{DiscoveryContext, SubConfig};

const ENTRY_SEPARATOR: char = ',';
const FIELD_SEPARATOR: char = ':';
const SEGMENT_SEPARATOR: char = '/';

/// Match options applied to every segment glob.
///
/// Hidden entries are filtered before matching, so a leading dot never
/// matches a wildcard.
pub(crate) const SEGMENT_MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Errors raised while validating a file pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern has no segments.
    #[error("file pattern is empty")]
    Empty,
    /// The pattern starts at the filesystem root.
    #[error("file pattern `{pattern}` must be relative")]
    Absolute { pattern: String },
    /// A segment is empty, `.` or `..`.
    #[error("file pattern `{pattern}` contains an empty, `.` or `..` segment")]
    InvalidSegment { pattern: String },
    /// A segment is not a valid glob expression.
    #[error("file pattern segment `{segment}` is not a valid glob")]
    Glob {
        segment: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Errors raised for one malformed entry of a sub-configuration string.
#[derive(Debug, Error)]
pub enum SubConfigParseError {
    /// The entry has no `:` after its name.
    #[error("entry `{entry}` has no type separator")]
    MissingType { entry: String },
    /// The entry starts with `:`.
    #[error("entry `{entry}` has an empty name")]
    EmptyName { entry: String },
    /// The type keyword is not recognised.
    #[error("sub-configuration `{name}` has unknown type `{kind}`")]
    UnknownType { name: String, kind: String },
    /// The type got the wrong number of `:`-separated arguments.
    #[error("sub-configuration `{name}` of type `{kind}` expects {expected} argument(s), found {found}")]
    Arity {
        name: String,
        kind: &'static str,
        expected: &'static str,
        found: usize,
    },
    /// A required argument is empty.
    #[error("sub-configuration `{name}` has an empty argument")]
    EmptyArgument { name: String },
    /// The file pattern argument failed validation.
    #[error("sub-configuration `{name}` has an invalid file pattern")]
    Pattern {
        name: String,
        #[source]
        source: PatternError,
    },
}

/// Ordered glob segments, one per directory level.
///
/// All segments but the last select directories; the last selects files.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathPattern {
    segments: Vec<String>,
    globs: Vec<glob::Pattern>,
}

impl PathPattern {
    /// Parses a `/`-separated pattern such as `conf.d/*.conf`.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern is empty, absolute, contains
    /// an empty, `.` or `..` segment, or a segment is not a valid glob.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if pattern.starts_with(SEGMENT_SEPARATOR) {
            return Err(PatternError::Absolute {
                pattern: pattern.to_string(),
            });
        }

        Self::from_segments(pattern.split(SEGMENT_SEPARATOR))
    }

    /// Builds a pattern from already split segments.
    ///
    /// # Errors
    /// Returns [`PatternError::Empty`] for no segments,
    /// [`PatternError::InvalidSegment`] for an empty, `.` or `..` segment and
    /// [`PatternError::Glob`] for an invalid glob.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PatternError::Empty);
        }
        if segments
            .iter()
            .any(|segment| matches!(segment.as_str(), "" | "." | ".."))
        {
            return Err(PatternError::InvalidSegment {
                pattern: segments.join("/"),
            });
        }

        let globs = segments
            .iter()
            .map(|segment| {
                glob::Pattern::new(segment).map_err(|source| PatternError::Glob {
                    segment: segment.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments, globs })
    }

    /// Segments in directory order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments; always at least one.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns whether the pattern has no segments, which construction rules
    /// out.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns whether `name` matches the segment at `index`.
    pub(crate) fn segment_matches(&self, index: usize, name: &str) -> bool {
        self.globs
            .get(index)
            .is_some_and(|glob| glob.matches_with(name, SEGMENT_MATCH_OPTIONS))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.segments.join("/"))
    }
}

/// Kind of configuration surface an addon exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubConfigType {
    /// Files described by a config description.
    ConfigFile,
    /// Files edited by a native module.
    NativeFile,
    /// External configuration program.
    Program,
    /// Configuration handled by a loaded plugin.
    Plugin,
}

impl SubConfigType {
    /// Keyword used for this kind in sub-configuration strings.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::ConfigFile => "configfile",
            Self::NativeFile => "native",
            Self::Program => "program",
            Self::Plugin => "plugin",
        }
    }
}

impl fmt::Display for SubConfigType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.keyword())
    }
}

/// Declared shape of one sub-configuration before discovery runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubConfigPattern {
    /// `configfile:<pattern>:<desc>`.
    ConfigFile {
        pattern: PathPattern,
        config_desc: String,
    },
    /// `native:<pattern>:<mime>[:<native path>]`.
    NativeFile {
        pattern: PathPattern,
        mime_type: String,
        native_path: String,
    },
    /// `program:<program>`.
    Program { program: String },
    /// `plugin:<native path>`.
    Plugin { native_path: String },
}

impl SubConfigPattern {
    /// Kind this declaration classifies as.
    pub fn kind(&self) -> SubConfigType {
        match self {
            Self::ConfigFile { .. } => SubConfigType::ConfigFile,
            Self::NativeFile { .. } => SubConfigType::NativeFile,
            Self::Program { .. } => SubConfigType::Program,
            Self::Plugin { .. } => SubConfigType::Plugin,
        }
    }
}

/// One successfully parsed entry.
enum ParsedEntry {
    Domain(String),
    SubConfig(String, SubConfigPattern),
}

/// Named sub-configuration patterns declared by one addon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubConfigParser {
    domain: Option<String>,
    patterns: BTreeMap<String, SubConfigPattern>,
}

impl SubConfigParser {
    /// Parses a full sub-configuration string.
    ///
    /// Malformed entries are skipped with a warning; the first declaration of
    /// a name wins over later duplicates.
    pub fn parse(input: &str) -> Self {
        let mut parser = Self::default();

        for entry in input.split(ENTRY_SEPARATOR) {
            if entry.is_empty() {
                continue;
            }

            match parse_entry(entry) {
                Ok(ParsedEntry::Domain(domain)) => parser.domain = Some(domain),
                Ok(ParsedEntry::SubConfig(name, pattern)) => {
                    if parser.patterns.contains_key(&name) {
                        warn!(%name, "skipping duplicate sub-configuration");
                        continue;
                    }
                    parser.patterns.insert(name, pattern);
                }
                Err(error) => warn!(%error, "skipping sub-configuration entry"),
            }
        }

        parser
    }

    /// Translation domain declared with a `domain` entry.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Declared sub-configuration names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Declared pattern for `name`.
    pub fn pattern(&self, name: &str) -> Option<&SubConfigPattern> {
        self.patterns.get(name)
    }

    /// Returns whether no sub-configuration was declared.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Classifies the sub-configuration declared as `name`.
    pub fn sub_config(&self, name: &str, context: &DiscoveryContext<'_>) -> Option<SubConfig> {
        self.pattern(name)
            .map(|pattern| SubConfig::new(name, pattern, context))
    }
}

fn parse_entry(entry: &str) -> Result<ParsedEntry, SubConfigParseError> {
    let Some((name, rest)) = entry.split_once(FIELD_SEPARATOR) else {
        return Err(SubConfigParseError::MissingType {
            entry: entry.to_string(),
        });
    };
    if name.is_empty() {
        return Err(SubConfigParseError::EmptyName {
            entry: entry.to_string(),
        });
    }

    let mut fields = rest.split(FIELD_SEPARATOR);
    let kind = fields.next().unwrap_or_default();
    let args: Vec<&str> = fields.collect();

    let sub_config_type = match kind {
        "domain" => {
            expect_arity(name, "domain", "0", args.len(), 0..=0)?;
            return Ok(ParsedEntry::Domain(name.to_string()));
        }
        "configfile" => SubConfigType::ConfigFile,
        "native" => SubConfigType::NativeFile,
        "program" => SubConfigType::Program,
        "plugin" => SubConfigType::Plugin,
        other => {
            return Err(SubConfigParseError::UnknownType {
                name: name.to_string(),
                kind: other.to_string(),
            });
        }
    };

    let pattern = parse_pattern(name, sub_config_type, &args)?;

    Ok(ParsedEntry::SubConfig(name.to_string(), pattern))
}

fn parse_pattern(
    name: &str,
    sub_config_type: SubConfigType,
    args: &[&str],
) -> Result<SubConfigPattern, SubConfigParseError> {
    let keyword = sub_config_type.keyword();

    match sub_config_type {
        SubConfigType::ConfigFile => {
            expect_arity(name, keyword, "2", args.len(), 2..=2)?;
            require_non_empty(name, args)?;

            Ok(SubConfigPattern::ConfigFile {
                pattern: parse_file_pattern(name, args[0])?,
                config_desc: args[1].to_string(),
            })
        }
        SubConfigType::NativeFile => {
            expect_arity(name, keyword, "2 or 3", args.len(), 2..=3)?;
            require_non_empty(name, &args[..2])?;

            Ok(SubConfigPattern::NativeFile {
                pattern: parse_file_pattern(name, args[0])?,
                mime_type: args[1].to_string(),
                native_path: args.get(2).copied().unwrap_or_default().to_string(),
            })
        }
        SubConfigType::Program => {
            expect_arity(name, keyword, "1", args.len(), 1..=1)?;
            require_non_empty(name, args)?;

            Ok(SubConfigPattern::Program {
                program: args[0].to_string(),
            })
        }
        SubConfigType::Plugin => {
            expect_arity(name, keyword, "1", args.len(), 1..=1)?;
            require_non_empty(name, args)?;

            Ok(SubConfigPattern::Plugin {
                native_path: args[0].to_string(),
            })
        }
    }
}

fn expect_arity(
    name: &str,
    kind: &'static str,
    expected: &'static str,
    found: usize,
    accepted: std::ops::RangeInclusive<usize>,
) -> Result<(), SubConfigParseError> {
    if accepted.contains(&found) {
        return Ok(());
    }

    Err(SubConfigParseError::Arity {
        name: name.to_string(),
        kind,
        expected,
        found,
    })
}

fn require_non_empty(name: &str, args: &[&str]) -> Result<(), SubConfigParseError> {
    if args.iter().any(|arg| arg.is_empty()) {
        return Err(SubConfigParseError::EmptyArgument {
            name: name.to_string(),
        });
    }

    Ok(())
}

fn parse_file_pattern(name: &str, pattern: &str) -> Result<PathPattern, SubConfigParseError> {
    PathPattern::parse(pattern).map_err(|source| SubConfigParseError::Pattern {
        name: name.to_string(),
        source,
    })
}
