//! L-system vegetation generation

pub mod lsystem;
pub use lsystem::{BUSH_VARIANTS, RuleSet, bush_rules};

pub mod turtle;
pub use turtle::{BranchInstance, LSystemParams, LeafInstance, TreeGeometry, grow, interpret};
