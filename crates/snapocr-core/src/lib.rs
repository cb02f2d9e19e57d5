pub mod error;
pub mod geometry;
pub mod overlay;
pub mod parser;
pub mod preprocess;
pub mod selector;

pub use error::{OcrError, Result};
