mod format;
mod generate;

pub use format::GoFormatter;
pub use generate::{GenerateOutcome, GenerateRequest, Generator, TypeReport};
