// Library interface for newsdesk modules
// This allows tests and other binaries to import modules

pub mod ingestion;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod rewriting;
pub mod server;
pub mod store;
pub mod worker;
