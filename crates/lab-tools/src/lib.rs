//! # lab-tools
//!
//! The two tools the agent ships with:
//!
//! - **calculator**: arithmetic over `+ - * / // % **` and parentheses,
//!   evaluated by a small parser instead of anything that executes code
//! - **web_search**: simulated search backed by a fixed knowledge table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::ToolRegistry;
//! use lab_tools::tools::{CalculatorTool, WebSearchTool};
//!
//! let mut tools = ToolRegistry::new();
//! tools.register(WebSearchTool)?;
//! tools.register(CalculatorTool)?;
//! ```

pub mod error;
pub mod expr;
pub mod knowledge;
pub mod svckit;

pub use error::{CalcError, ExprError};
pub use expr::{Number, evaluate};

/// Tool re-exports
pub mod tools {
    pub use crate::svckit::{CalculatorTool, WebSearchTool, calculate, search};
}

use agent_core::{Result, ToolRegistry};

/// Registry with the default tools in prompt order: search, then calculator
pub fn default_registry() -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(svckit::WebSearchTool)?;
    registry.register(svckit::CalculatorTool)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.names(), vec!["web_search", "calculator"]);
    }
}
