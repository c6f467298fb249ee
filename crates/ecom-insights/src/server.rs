//! Server startup
//!
//! Opens the chat log (creating its tables if needed), then a read-only
//! view over the imported catalog, and serves both through one router.
//! The only outbound network call is to the completion API.

use tracing::{info, warn};

use crate::{
    catalog_db::CatalogStore,
    chat_db::ChatLog,
    config::Config,
    llm_client::CompletionClient,
    shared_state::AppState,
};

/// Run the HTTP API until the process is stopped
pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    if let Err(e) = crate::metrics::init_metrics() {
        warn!("Failed to register metrics: {}", e);
    }
    cfg.print_config();

    // Must precede the read-only open so the database file exists.
    let chat_log = ChatLog::open(&cfg.database_path)?;
    match chat_log.get_stats() {
        Ok(stats) => info!(
            "Chat log holds {} conversations and {} messages",
            stats.conversations, stats.messages
        ),
        Err(e) => warn!("Could not read chat log stats: {}", e),
    }

    let catalog = CatalogStore::open_read_only(&cfg.database_path)?;
    let completions = CompletionClient::from_config(&cfg);
    info!("Using completion model {}", completions.model());

    let state = AppState::new(catalog, chat_log, completions);

    let addr = cfg.api_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("✅ Server is running on http://{}", addr);

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

/// Build the full router: banner, catalog dumps, chat proxy and metrics
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{
        routing::{get, post},
        Router,
    };
    use tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    let router = Router::new().route("/", get(crate::api::banner));

    crate::api::register_dump_endpoints(router)
        .route("/api/chat", post(crate::api::chat))
        .route("/metrics", get(crate::metrics::get_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{body_text, TestApp};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = TestApp::new("http://127.0.0.1:9");

        let response = app
            .router()
            .oneshot(Request::builder().uri("/customers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = TestApp::new("http://127.0.0.1:9");

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/users")
                    .header("origin", "http://dashboard.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_metrics_endpoint_reports_requests() {
        crate::metrics::init_metrics().unwrap();
        let app = TestApp::new("http://127.0.0.1:9");
        app.router()
            .oneshot(Request::builder().uri("/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let response = app
            .router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("requests_total"));
    }
}
