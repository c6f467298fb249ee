//! Request-scoped state shared by the API handlers
//!
//! Every handler receives its storage and upstream handles through axum's
//! `State` extractor; nothing lives in module-level globals.

use std::sync::Arc;

use crate::{catalog_db::CatalogStore, chat_db::ChatLog, llm_client::CompletionClient};

#[derive(Clone)]
pub struct AppState {
    /// Read-only view over the imported tables
    pub catalog: Arc<CatalogStore>,
    /// Conversations and chat messages
    pub chat_log: Arc<ChatLog>,
    pub completions: Arc<CompletionClient>,
}

impl AppState {
    pub fn new(catalog: CatalogStore, chat_log: ChatLog, completions: CompletionClient) -> Self {
        Self {
            catalog: Arc::new(catalog),
            chat_log: Arc::new(chat_log),
            completions: Arc::new(completions),
        }
    }
}
