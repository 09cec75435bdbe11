//! Assembly phase: fragment bucketing plus import consolidation.

pub mod fragments;
pub mod imports;

pub use fragments::{AssembledFragments, assemble};
pub use imports::{ImportStatement, consolidate, consolidate_block};
