//! # HTTP Server
//!
//! Combines the public pages and the provider API into one router and
//! applies the response headers every reply carries.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{
    CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA, STRICT_TRANSPORT_SECURITY,
};
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};
use uuid::Uuid;

use super::errors::ApiError;
use super::pages::page_routes;
use super::routes::{api_routes, RouteRecorder};
use super::state::AppState;

const POWERED_BY: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP server for the timetable API
pub struct HttpServer {
    addr: String,
    router: Router,
}

impl HttpServer {
    /// Build the router over `state`; the route table is filled in here
    pub fn new(addr: impl Into<String>, state: AppState) -> Self {
        Self {
            addr: addr.into(),
            router: Self::build_router(state),
        }
    }

    fn build_router(mut state: AppState) -> Router {
        let (routes, table) = api_routes(page_routes(RouteRecorder::new())).finish();
        state.routes = table;

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers([CONTENT_TYPE]);

        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        });

        routes
            .fallback(not_found)
            .with_state(Arc::new(state))
            .layer(SetResponseHeaderLayer::overriding(
                HeaderName::from_static("x-powered-by"),
                HeaderValue::from_static(POWERED_BY),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            ))
            .layer(SetResponseHeaderLayer::overriding(PRAGMA, HeaderValue::from_static("no-cache")))
            .layer(SetResponseHeaderLayer::overriding(EXPIRES, HeaderValue::from_static("0")))
            .layer(SetResponseHeaderLayer::overriding(
                STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static("max-age=123456; includeSubDomains; preload"),
            ))
            .layer(cors)
            .layer(trace)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> &str {
        &self.addr
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.addr).await?;
        info!(addr = %listener.local_addr()?, "listening");

        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
