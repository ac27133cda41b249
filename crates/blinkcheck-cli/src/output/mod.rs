//! Output adapters for the CLI.

mod json;

pub use json::JsonOutput;
