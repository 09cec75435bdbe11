//! IR of a conversion run: context, fragments, result.

pub mod types;

pub use types::*;
