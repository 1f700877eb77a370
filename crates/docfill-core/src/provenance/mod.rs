//! Source-line provenance: mapping extracted values back to the document
//! line they came from.

mod hints;
mod resolver;

pub use hints::{HintMap, SourceHint};
pub use resolver::{MatchStrategy, Resolution, SourceResolver};
