use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod parser;
pub mod store;

pub use config::StoreConfig;
pub use error::{Result, ToolsmithError};
pub use store::{FunctionStore, ToolFile, ToolFunction};

pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .pretty()
        .init();
}
