//! Provider API routes
//!
//! Every route here is key-gated: the provider segment is checked first
//! (unknown providers are a 404 and cost nothing), then the key is admitted
//! and counted, then the read runs on the blocking pool.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, State};
use axum::handler::Handler;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::errors::{ApiError, ApiResult};
use super::state::AppState;
use crate::transit::{StopFilter, StopRef, TransitResult, TransitService};

/// Paths in registration order, for the status and discovery pages
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    paths: Vec<String>,
}

impl RouteTable {
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Router builder that records each GET path it registers
pub struct RouteRecorder<S> {
    router: Router<S>,
    table: RouteTable,
}

impl<S> RouteRecorder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            table: RouteTable::default(),
        }
    }

    pub fn get<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self.table.paths.push(path.to_string());
        self
    }

    pub fn finish(self) -> (Router<S>, RouteTable) {
        (self.router, self.table)
    }
}

impl<S> Default for RouteRecorder<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Path parameters of the provider routes
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPath {
    pub key: String,
    pub provider: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub stop: Option<String>,
    pub route: Option<String>,
}

impl ApiPath {
    /// The stop named by `:id`/`:stop` or `:name`, if any
    fn stop_ref(&self) -> Option<StopRef> {
        self.id
            .clone()
            .or_else(|| self.stop.clone())
            .map(StopRef::Id)
            .or_else(|| self.name.clone().map(StopRef::Name))
    }
}

/// Register the provider routes
pub fn api_routes(routes: RouteRecorder<Arc<AppState>>) -> RouteRecorder<Arc<AppState>> {
    routes
        .get("/api/:key/:provider", feed_info_handler)
        .get("/api/:key/:provider/agencies", agencies_handler)
        .get("/api/:key/:provider/agencies/byid/:id", agencies_handler)
        .get("/api/:key/:provider/agencies/byname/:name", agencies_handler)
        .get("/api/:key/:provider/departures/byid/:id", departures_handler)
        .get("/api/:key/:provider/departures/byname/:name", departures_handler)
        .get("/api/:key/:provider/alerts", alerts_handler)
        .get("/api/:key/:provider/alerts/bystop/:stop", alerts_handler)
        .get("/api/:key/:provider/alerts/byroute/:route", alerts_handler)
        .get("/api/:key/:provider/alerts/bycombination/:route/:stop", alerts_handler)
        .get("/api/:key/:provider/stops", stops_handler)
        .get("/api/:key/:provider/stops/byid/:id", stops_handler)
        .get("/api/:key/:provider/stops/byname/:name", stops_handler)
        .get("/api/:key/:provider/stops/byname/all/:name", all_stops_handler)
        .get("/api/:key/:provider/routes", routes_handler)
        .get("/api/:key/:provider/routes/bystopid/:stop", routes_handler)
        .get("/api/:key/:provider/routes/bystopname/:name", routes_handler)
        .get("/api/:key/:provider/trips", trips_handler)
        .get("/api/:key/:provider/trips/byrouteid/:route", trips_handler)
}

type Peer = Option<ConnectInfo<SocketAddr>>;

/// Gate, run `op` off the runtime and render the result
async fn respond<F, T>(state: Arc<AppState>, peer: Peer, path: ApiPath, op: F) -> Response
where
    F: FnOnce(&TransitService, &ApiPath, NaiveDateTime) -> TransitResult<T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let peer = peer.map(|ConnectInfo(addr)| addr);
    match execute(&state, path, op).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => err.into_response_for(peer),
    }
}

async fn execute<F, T>(state: &AppState, path: ApiPath, op: F) -> ApiResult<T>
where
    F: FnOnce(&TransitService, &ApiPath, NaiveDateTime) -> TransitResult<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = state.datasets.get(&path.provider).ok_or(ApiError::NotFound)?;
    state.admission.admit(&path.key)?;

    let now = state.now();
    let result = tokio::task::spawn_blocking(move || op(&TransitService::new(handle), &path, now))
        .await
        .map_err(|e| ApiError::Internal(format!("query task failed: {}", e)))?;

    Ok(result?)
}

async fn feed_info_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, _| {
        Ok(json!({
            "provider": path.provider,
            "feeds": service.feed_info()?,
        }))
    })
    .await
}

async fn agencies_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, _| {
        service.agencies(path.id.as_deref(), path.name.as_deref())
    })
    .await
}

async fn departures_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, now| match path.stop_ref() {
        Some(stop) => service.departures(&stop, now),
        None => Ok(Vec::new()),
    })
    .await
}

async fn alerts_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, _| {
        service.alerts(path.stop.as_deref(), path.route.as_deref())
    })
    .await
}

async fn stops_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, _| {
        service.stops(&StopFilter {
            id: path.id.clone(),
            name: path.name.clone(),
            include_children: false,
        })
    })
    .await
}

async fn all_stops_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, _| {
        service.stops(&StopFilter {
            id: None,
            name: path.name.clone(),
            include_children: true,
        })
    })
    .await
}

async fn routes_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, _| {
        service.routes(path.stop_ref().as_ref())
    })
    .await
}

async fn trips_handler(
    State(state): State<Arc<AppState>>,
    peer: Peer,
    Path(path): Path<ApiPath>,
) -> Response {
    respond(state, peer, path, |service, path, _| service.trips(path.route.as_deref())).await
}
