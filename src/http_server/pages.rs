//! Public pages: landing, status, discovery and key inspection.
//! None of these are admission-gated.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;
use serde::Serialize;

use super::errors::{ApiError, ApiResult};
use super::routes::RouteRecorder;
use super::state::AppState;
use crate::admission::ApiKeyRecord;

/// Register the public pages
pub fn page_routes(routes: RouteRecorder<Arc<AppState>>) -> RouteRecorder<Arc<AppState>> {
    routes
        .get("/", landing_handler)
        .get("/status", status_handler)
        .get("/api", discovery_handler)
        .get("/api/:key", key_info_handler)
}

/// Discovery document
#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub software: String,
    pub version: String,
    pub mode: &'static str,
    pub contact: String,
    pub providers: Vec<String>,
    pub paths: Vec<String>,
}

async fn landing_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut page = header(&state);
    page.push_str(&footer(&state));
    Html(page)
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut page = header(&state);
    page.push_str(&table("Available providers", &state.providers()));
    page.push_str(&table("Available methods", state.routes.paths()));
    page.push_str(&footer(&state));
    Html(page)
}

async fn discovery_handler(State(state): State<Arc<AppState>>) -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        software: state.info.software.clone(),
        version: state.info.version.clone(),
        mode: state.admission.mode().label(),
        contact: state.info.contact.clone(),
        providers: state.providers(),
        paths: state.routes.paths().to_vec(),
    })
}

/// Inspect a key without counting it
async fn key_info_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<ApiKeyRecord>> {
    state
        .admission
        .key_info(&key)
        .map(Json)
        .map_err(ApiError::from)
}

fn header(state: &AppState) -> String {
    let status = if state.admission.mode().is_open() {
        "running normally"
    } else {
        "in maintenance mode"
    };

    format!(
        "<html><head><title>Timetable API</title></head><body>\
         <h2><strong>Timetable API</strong></h2>\
         <p>This server is <b>{}</b>.</p>",
        status
    )
}

fn footer(state: &AppState) -> String {
    let contact = escape_html(&state.info.contact);
    format!(
        "<hr/><p><em>{} v{}, operated by <a href=\"mailto:{}\">{}</a></em></p></body></html>",
        state.info.software, state.info.version, contact, contact
    )
}

/// Single-column table with alternating row shading
fn table(title: &str, rows: &[String]) -> String {
    let mut html = format!(
        "<table style=\"border-collapse: collapse;\" border=\"1\"><tbody>\
         <tr style=\"background-color: #797979;\"><td style=\"color: #ffffff;\"><strong><pre> {} </pre></strong></td></tr>",
        title
    );

    for (i, row) in rows.iter().enumerate() {
        let shade = if i % 2 == 0 { "#eeedea" } else { "#ffffff" };
        html.push_str(&format!(
            "<tr style=\"background-color: {};\"><td><pre> {} </pre></td></tr>",
            shade,
            escape_html(row)
        ));
    }

    html.push_str("</tbody></table><br/>");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("ops@example.org"), "ops@example.org");
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_table_alternates_shading() {
        let html = table("Providers", &["sl".to_string(), "ul".to_string()]);

        assert!(html.contains("Providers"));
        let first = html.find("#eeedea").unwrap();
        let second = html.find("#ffffff;\"><td><pre> ul").unwrap();
        assert!(first < second);
    }
}
