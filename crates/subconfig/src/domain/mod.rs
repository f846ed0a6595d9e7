pub mod addon;
/// Path patterns and the sub-configuration declaration parser.
pub mod pattern;
pub mod subconfig;
