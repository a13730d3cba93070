pub mod config;
pub mod filter;
pub mod keys;
pub mod model;
pub mod reducer;
pub mod state;
pub mod stream;
pub mod task;

// Parsing of the orchestration tool's JSON and text output
pub mod tool_output;
