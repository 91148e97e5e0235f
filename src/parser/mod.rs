mod scanner;
mod types;

pub use scanner::SourceScanner;
pub use types::{FunctionDecl, ModuleOutline, Segment, SyntaxError};
