pub mod assemble;
pub mod codegen;
pub mod convert;
pub mod error;
pub mod graph;
pub mod ir;
pub mod order;
pub mod pipeline;
pub mod validate;
pub mod wasm;

pub use error::ConvertError;
pub use ir::{ConversionResult, GenerationContext};
pub use pipeline::{convert, convert_json};
