//! HTTP route handlers for the web interface.
//!
//! Recipe pages are always revalidated, static files are cached for a day and
//! health endpoints are never cached.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod recipes;

use axum::{
    middleware,
    response::Html,
    routing::get,
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::{
    services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::config::{CACHE_CONTROL_HEALTH, CACHE_CONTROL_PAGES, CACHE_CONTROL_STATIC};
use crate::error::AppError;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Template context shared by every page (site name and version for the layout).
pub fn page_context(state: &AppState) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("config", &state.config.ui);
    context
}

pub fn render(
    state: &AppState,
    template: &str,
    context: &tera::Context,
) -> Result<Html<String>, AppError> {
    Ok(Html(state.tera.render(template, context)?))
}

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // `/recipes/add` is a static segment and takes precedence over `/recipes/{id}`
    let recipe_routes = Router::new()
        .route("/", get(recipes::index))
        .route("/recipes/add", get(recipes::new).post(recipes::create))
        .route("/recipes/{id}", get(recipes::edit).post(recipes::update))
        .route("/recipes/delete/{id}", get(recipes::delete))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_PAGES),
        ));

    let static_routes = Router::new()
        .nest_service("/static", ServeDir::new(state.config.theme.static_path()))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_STATIC),
        ));

    let health_routes = Router::new()
        .route("/liveness", get(health::liveness))
        .route("/readiness", get(health::readiness))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ));

    Router::new()
        .merge(recipe_routes)
        .merge(health_routes)
        .merge(static_routes)
        .with_state(state)
        // Runs inside the request span, so its events carry the request id
        .layer(TraceLayer::new_for_http())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AppConfig, ThemeConfig};
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::store::memory::{MemoryStore, CONNECT_ERROR_TEXT, QUERY_ERROR_TEXT};
    use crate::templates::init_templates;

    fn test_app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let tera = init_templates(&ThemeConfig::default()).unwrap();
        let state = AppState::new(AppConfig::default(), tera, store.clone());
        (create_router(state), store)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn assert_redirects_home(response: &Response) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_add_then_list_shows_recipe() {
        let (app, store) = test_app();

        let response = post_form(
            &app,
            "/recipes/add",
            "title=Soup&ingredients=water%2C+salt&instructions=boil",
        )
        .await;
        assert_redirects_home(&response);

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].title, "Soup");
        assert_eq!(rows[0].ingredients, "water, salt");
        assert_eq!(rows[0].instructions, "boil");
        assert_eq!(rows[0].created_at, rows[0].updated_at);

        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], CACHE_CONTROL_PAGES);
        let body = body_text(response).await;
        assert!(body.contains("Soup"));
        assert!(body.contains("water, salt"));
        assert!(body.contains("boil"));
        assert!(body.contains("/recipes/1"));
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_created_at() {
        let (app, store) = test_app();
        post_form(&app, "/recipes/add", "title=Tea&ingredients=leaves&instructions=steep").await;
        let before = store.rows().remove(0);

        let response = post_form(
            &app,
            "/recipes/1",
            "title=Green+Tea&ingredients=green+leaves&instructions=steep+briefly",
        )
        .await;
        assert_redirects_home(&response);

        let after = store.rows().remove(0);
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, "Green Tea");
        assert_eq!(after.ingredients, "green leaves");
        assert_eq!(after.instructions, "steep briefly");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_of_missing_recipe_still_redirects() {
        let (app, store) = test_app();

        let response =
            post_form(&app, "/recipes/42", "title=Ghost&ingredients=none&instructions=none").await;
        assert_redirects_home(&response);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_edit_page_shows_recipe() {
        let (app, _store) = test_app();
        post_form(&app, "/recipes/add", "title=Pancakes&ingredients=flour&instructions=fry").await;

        let response = get(&app, "/recipes/1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Pancakes"));
        assert!(body.contains("action=\"/recipes/1\""));
    }

    #[tokio::test]
    async fn test_edit_page_for_missing_recipe_renders_empty_form() {
        let (app, _store) = test_app();

        let response = get(&app, "/recipes/7").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("action=\"/recipes/7\""));
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let (app, _store) = test_app();

        let response = get(&app, "/recipes/soup").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_form_renders() {
        let (app, _store) = test_app();

        let response = get(&app, "/recipes/add").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("action=\"/recipes/add\""));
    }

    #[tokio::test]
    async fn test_add_with_missing_field_is_rejected() {
        let (app, store) = test_app();

        let response = post_form(&app, "/recipes/add", "title=Soup&ingredients=water").await;
        assert!(response.status().is_client_error());
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_recipe() {
        let (app, store) = test_app();
        post_form(&app, "/recipes/add", "title=Soup&ingredients=water&instructions=boil").await;
        post_form(&app, "/recipes/add", "title=Salad&ingredients=greens&instructions=toss").await;

        let response = get(&app, "/recipes/delete/1").await;
        assert_redirects_home(&response);

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Salad");

        let body = body_text(get(&app, "/").await).await;
        assert!(!body.contains("Soup"));
        assert!(body.contains("Salad"));
    }

    #[tokio::test]
    async fn test_delete_of_missing_recipe_redirects() {
        let (app, _store) = test_app();

        let response = get(&app, "/recipes/delete/99").await;
        assert_redirects_home(&response);
    }

    #[tokio::test]
    async fn test_unreachable_database_renders_unavailable_page() {
        let (app, store) = test_app();
        store.set_unavailable(true);

        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[CACHE_CONTROL], CACHE_CONTROL_PAGES);
        let request_id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();

        let body = body_text(response).await;
        assert!(body.contains("Database unavailable"));
        assert!(body.contains(&request_id));
        assert!(!body.contains(CONNECT_ERROR_TEXT));
    }

    #[tokio::test]
    async fn test_failed_statement_renders_internal_error_page() {
        let (app, store) = test_app();
        store.set_failing(true);

        let response = post_form(
            &app,
            "/recipes/add",
            "title=Soup&ingredients=water&instructions=boil",
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let request_id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();

        let body = body_text(response).await;
        assert!(body.contains("Internal server error"));
        assert!(body.contains(&request_id));
        assert!(!body.contains(QUERY_ERROR_TEXT));

        store.set_failing(false);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_liveness_is_ok_even_when_database_is_down() {
        let (app, store) = test_app();
        store.set_unavailable(true);

        let response = get(&app, "/liveness").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], CACHE_CONTROL_HEALTH);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_readiness_reflects_database_reachability() {
        let (app, store) = test_app();

        let response = get(&app, "/readiness").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);

        store.set_unavailable(true);
        let response = get(&app, "/readiness").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, r#"{"status":"fail"}"#);
    }
}
