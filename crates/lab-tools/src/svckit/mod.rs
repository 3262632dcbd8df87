//! Tool Implementations
//!
//! Agent-facing wrappers around the calculator and the simulated search.

mod calculator;
mod web_search;

pub use calculator::{CalculatorTool, calculate};
pub use web_search::{MATH_REDIRECT, WebSearchTool, search};
