//! Column-name handling: normalization of raw headers and detection of the
//! canonical target fields among them.

pub mod normalize;
pub mod targets;

pub use normalize::normalize_column_name;
pub use targets::{resolve_targets, MatchMode, TargetBases, TargetField};
