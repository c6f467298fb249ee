// ecom-insights/crates/ecom-insights/src/lib.rs

pub mod api;
pub mod catalog_db;
pub mod chat_db;
pub mod config;
pub mod llm_client;
pub mod metrics;
pub mod server;
pub mod shared_state;
pub mod telemetry;

// Public API exports
pub use catalog_db::{run_import, CatalogStore, ImportReport, Importer, Table, DATASETS};
pub use chat_db::ChatLog;
pub use config::Config;
pub use llm_client::CompletionClient;
pub use server::{build_router, run_server};
pub use shared_state::AppState;

// API exports
pub use api::{
    catalog_api::{banner, register_dump_endpoints},
    chat_api::{chat, ChatError, ChatRequest, ChatResponse},
};
