// ecom-insights/crates/ecom-insights/src/api/mod.rs
//! API module - HTTP handlers for the catalog dumps and the chat proxy

pub mod catalog_api;
pub mod chat_api;

pub use catalog_api::{banner, dump_endpoint, register_dump_endpoints, DUMP_ROUTES};
pub use chat_api::{chat, ChatError, ChatRequest, ChatResponse};
