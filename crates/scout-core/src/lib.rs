//! Scout Core Library
//!
//! Host-side tool interface and configuration for the Scout search agent.

pub mod config;
pub mod toolkit;
pub mod tools;

// Re-export key types for convenience
pub use config::Config;
pub use toolkit::{Tool, ToolRegistry, ToolResult, Toolkit};
pub use tools::BraveSearch;
