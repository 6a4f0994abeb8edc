pub mod agents;
pub mod chunking;
pub mod config;
pub mod driver;
pub mod embeddings;
pub mod error;
pub mod files;
pub mod index;
pub mod llm;
pub mod policy;
pub mod query;
pub mod reply;
pub mod retriever;
pub mod server;
