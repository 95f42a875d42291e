//! HTTP handlers: the proxy entry point and mapping administration.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri, header, uri::Authority},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use wayback_core::MappingEntry;

use crate::state::AppState;

/// Host and path a request is proxied under.
#[derive(Debug, PartialEq, Eq)]
pub struct ProxyTarget {
    pub host: String,
    pub path: String,
}

impl ProxyTarget {
    /// Absolute-form requests (browser configured to use us as an HTTP
    /// proxy) keep their authority in the path; origin-form requests use
    /// the path alone with the `Host` header as the virtual host.
    pub fn from_request(uri: &Uri, headers: &HeaderMap) -> Self {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        match uri.authority() {
            Some(authority) => Self {
                host: authority.host().to_string(),
                path: format!("{}{}", authority.as_str(), path_and_query),
            },
            None => Self {
                host: headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<Authority>().ok())
                    .map(|a| a.host().to_string())
                    .unwrap_or_default(),
                path: path_and_query.trim_start_matches('/').to_string(),
            },
        }
    }
}

/// Proxy any path through the archive.
pub async fn proxy(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let target = ProxyTarget::from_request(&uri, &headers);
    let mappings = state.mappings.snapshot().await;

    match state.proxy.handle(&target.host, &target.path, &mappings).await {
        Ok(reply) => reply.into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct RedirectParams {
    pub url: String,
}

/// Redirect `?url=X` to the proxied path `/X`.
pub async fn redirect(Query(params): Query<RedirectParams>) -> Redirect {
    Redirect::to(&format!("/{}", params.url.trim_start_matches('/')))
}

/// List persisted mapping entries.
pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<MappingEntry>> {
    Json(state.mappings.entries().await)
}

/// Append a mapping entry.
pub async fn add_entry(State(state): State<AppState>, Json(entry): Json<MappingEntry>) -> Response {
    match state.mappings.add(entry).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to add mapping");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Update the archive URL of an existing mapping entry.
pub async fn update_entry(State(state): State<AppState>, Json(entry): Json<MappingEntry>) -> Response {
    match state.mappings.update(entry).await {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to update mapping");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use wayback_client::{FetchClient, FetchConfig};
    use wayback_core::{CacheTiers, MappingStore};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::notifier::NoopNotifier;
    use crate::proxy::Proxy;
    use crate::routes::create_router;

    fn state(dir: &tempfile::TempDir, entries: Vec<MappingEntry>) -> AppState {
        let proxy = Proxy::new(
            FetchClient::new(FetchConfig::default()).unwrap(),
            Arc::new(CacheTiers::new()),
            Arc::new(NoopNotifier),
            None,
        );
        let mappings = MappingStore::with_entries(dir.path().join("domainMappings.json"), entries);
        AppState { proxy: Arc::new(proxy), mappings: Arc::new(mappings) }
    }

    fn entry(url: &str, archive_url: &str) -> MappingEntry {
        MappingEntry { url: url.into(), archive_url: Some(archive_url.into()), skip_root_page: false }
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_target_origin_form() {
        let uri: Uri = "/example.com/index.html?x=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "retro.local:5271".parse().unwrap());

        let target = ProxyTarget::from_request(&uri, &headers);
        assert_eq!(target, ProxyTarget { host: "retro.local".into(), path: "example.com/index.html?x=1".into() });
    }

    #[test]
    fn test_target_absolute_form() {
        let uri: Uri = "http://www.example.com/news/today.html".parse().unwrap();
        let target = ProxyTarget::from_request(&uri, &HeaderMap::new());
        assert_eq!(
            target,
            ProxyTarget { host: "www.example.com".into(), path: "www.example.com/news/today.html".into() }
        );
    }

    #[test]
    fn test_target_missing_host() {
        let uri: Uri = "/".parse().unwrap();
        let target = ProxyTarget::from_request(&uri, &HeaderMap::new());
        assert_eq!(target, ProxyTarget { host: String::new(), path: String::new() });
    }

    #[tokio::test]
    async fn test_txt_request_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(&dir, vec![entry("example.com", "https://archive.example/snap/")]));

        let response = app
            .oneshot(Request::builder().uri("/example.com/robots.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unmapped_request_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(&dir, Vec::new()));

        let response = app
            .oneshot(Request::builder().uri("/nowhere.org/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("no mapping"));
    }

    #[tokio::test]
    async fn test_proxied_document_is_html() {
        let server = MockServer::start().await;
        let origin = format!("{}/snap/", server.uri());
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                format!(r#"<a href="{origin}page2.html">x</a>"#).into_bytes(),
                "text/html",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(&dir, vec![entry("example.com", &origin)]));

        let response = app
            .oneshot(Request::builder().uri("/example.com/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert!(body_string(response).await.contains(r#"href="page2.html""#));
    }

    #[tokio::test]
    async fn test_unexpected_failure_renders_error_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(&dir, vec![entry("example.com", "http://127.0.0.1:9/snap/")]));

        let response = app
            .oneshot(Request::builder().uri("/example.com/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("Error occurred while trying to fetch 90's internet"));
    }

    #[tokio::test]
    async fn test_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(&dir, Vec::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/waybackproxyredirect?url=example.com%2Findex.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/example.com/index.html");
    }

    #[tokio::test]
    async fn test_entries_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(&dir, Vec::new()));

        let add = Request::builder()
            .method("POST")
            .uri("/entries")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url":"example.com","archiveUrl":"https://a/","skipRootPage":false}"#))
            .unwrap();
        let response = app.clone().oneshot(add).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let update = Request::builder()
            .method("PUT")
            .uri("/entries")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url":"example.com","archiveUrl":"https://b/","skipRootPage":true}"#))
            .unwrap();
        let response = app.clone().oneshot(update).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/entries").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let entries: Vec<MappingEntry> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(entries, vec![MappingEntry {
            url: "example.com".into(),
            archive_url: Some("https://b/".into()),
            skip_root_page: true,
        }]);

        let missing = Request::builder()
            .method("PUT")
            .uri("/entries")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"url":"other.com","archiveUrl":"https://c/"}"#))
            .unwrap();
        let response = app.oneshot(missing).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
