mod monitor;
mod tool_file;
mod types;

pub use monitor::FunctionStore;
pub use tool_file::ToolFile;
pub use types::ToolFunction;
