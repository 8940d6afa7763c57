//! Axum router: `GET /` (HTML status page) and `GET /health` (JSON).

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub products: usize,
    pub sessions: usize,
    pub version: &'static str,
}

/// Build the liveness router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    let products = state.store.len().await;
    Html(format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>Vitrina</title>
  <style>
    body {{ font-family: Arial, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }}
    .status {{ background: #e6ffe6; padding: 10px; border-radius: 8px; }}
  </style>
</head>
<body>
  <h1>🤖 Vitrina</h1>
  <div class="status"><strong>✅ Bot activo</strong><br>📦 Productos: {products}</div>
</body>
</html>
"#
    ))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        products: state.store.len().await,
        sessions: state.sessions.len(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use vitrina_types::price::Price;
    use vitrina_types::product::{Category, Product, ProductId};

    use super::*;
    use crate::state::test_support::local_state;

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let state = local_state(dir.path(), 1);
        state
            .store
            .upsert(Product {
                id: ProductId::generate(),
                name: "Gorra".into(),
                price: Price::parse_input("35000").unwrap(),
                description: String::new(),
                sizes: String::new(),
                category: Category::Clothing,
                primary_media: None,
                extra_images: vec![],
                videos: vec![],
                created_at: chrono::Utc::now(),
                created_by: None,
                extra: Default::default(),
            })
            .await;
        state.sessions.begin(1, 1);

        let (status, body) = get_body(build_router(state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["products"], 1);
        assert_eq!(json["sessions"], 1);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn home_page_shows_product_count() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_body(build_router(local_state(dir.path(), 1)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Productos: 0"));
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = get_body(build_router(local_state(dir.path(), 1)), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
