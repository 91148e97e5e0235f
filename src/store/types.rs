use serde::{Deserialize, Serialize};

/// API-facing record for one stored tool function. The presentation layer
/// moves this over JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFunction {
    pub name: String,
    pub code: String,
}
