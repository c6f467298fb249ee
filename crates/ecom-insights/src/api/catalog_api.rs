//! Dump endpoints for the imported catalog tables

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use tracing::error;

use crate::catalog_db::Table;
use crate::metrics;
use crate::shared_state::AppState;

/// Route path → table, in the order the banner advertises them
pub const DUMP_ROUTES: [(&str, Table); 6] = [
    ("/users", Table::Users),
    ("/products", Table::Products),
    ("/orders", Table::Orders),
    ("/order-items", Table::OrderItems),
    ("/inventory", Table::InventoryItems),
    ("/distribution-centers", Table::DistributionCenters),
];

/// GET / - plain-text capability banner
pub async fn banner() -> String {
    let routes = DUMP_ROUTES.iter().map(|(route, _)| *route).collect::<Vec<_>>();
    format!("✅ API is working! Available endpoints: {}", routes.join(", "))
}

/// Build a GET handler that returns every row of `table`
pub fn dump_endpoint(route: &'static str, table: Table) -> MethodRouter<AppState> {
    get(move |State(state): State<AppState>| async move {
        let response = dump_table(state, table).await;
        metrics::inc_request(route, response.status());
        response
    })
}

/// Mount one dump endpoint per entry of [`DUMP_ROUTES`]
pub fn register_dump_endpoints(router: Router<AppState>) -> Router<AppState> {
    DUMP_ROUTES
        .iter()
        .fold(router, |router, (route, table)| router.route(route, dump_endpoint(*route, *table)))
}

async fn dump_table(state: AppState, table: Table) -> Response {
    let catalog = state.catalog.clone();
    match tokio::task::spawn_blocking(move || catalog.dump_table(table)).await {
        Ok(Ok(rows)) => Json(rows).into_response(),
        Ok(Err(e)) => {
            error!("Failed to dump {}: {:#}", table, e);
            internal_error()
        }
        Err(e) => {
            error!("Dump task for {} panicked: {}", table, e);
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, body_text, TestApp};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_banner_lists_dump_routes() {
        let app = TestApp::new("http://127.0.0.1:9");

        let response = app.router().oneshot(get_request("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert_eq!(
            text,
            "✅ API is working! Available endpoints: /users, /products, /orders, /order-items, /inventory, /distribution-centers"
        );
    }

    #[tokio::test]
    async fn test_products_returns_inserted_row_verbatim() {
        let app = TestApp::new("http://127.0.0.1:9");
        app.writer()
            .execute(
                "INSERT INTO products (id, cost, retail_price, department, sku)
                 VALUES ('1000', 8.5, 19.99, 'Women', 'SKU-1')",
                [],
            )
            .unwrap();

        let response = app.router().oneshot(get_request("/products")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!([{
                "id": "1000",
                "cost": 8.5,
                "retail_price": 19.99,
                "department": "Women",
                "sku": "SKU-1"
            }])
        );
    }

    #[tokio::test]
    async fn test_every_dump_route_serves_its_table() {
        let app = TestApp::new("http://127.0.0.1:9");

        for (route, _) in DUMP_ROUTES {
            let response = app.router().oneshot(get_request(route)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", route);
            assert_eq!(body_json(response).await, serde_json::json!([]));
        }
    }

    #[tokio::test]
    async fn test_storage_error_is_generic_500() {
        let app = TestApp::new("http://127.0.0.1:9");
        app.writer().execute_batch("DROP TABLE inventory_items;").unwrap();

        let response = app.router().oneshot(get_request("/inventory")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Internal server error" })
        );
    }
}
