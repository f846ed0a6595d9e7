pub mod discover;
/// Segment-wise glob expansion below one root.
pub mod file_pattern;
pub mod program;
pub mod registry;
pub mod xdg;
