//! Request resolution pipeline.
//!
//! inbound path → known-failure check → image cache → mapping resolution
//! → document cache → fetch and rewrite → cache write. The status signal
//! is updated at phase boundaries and released when the request ends.

use std::sync::Arc;
use std::time::Instant;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use wayback_client::{FetchClient, RenderedImage, is_image_url, render_document, render_image, resolve, with_scheme};
use wayback_core::{CacheTiers, Error, MappingTable, RenderedDocument, document_key};

use crate::error::ProxyError;
use crate::notifier::{Phase, SignalGuard, StatusNotifier, Urgency};

/// Paths containing this marker are fetched verbatim, without mapping.
pub const RAW_FETCH_MARKER: &str = "web-static";

/// What a successful request serves.
#[derive(Debug, Clone)]
pub enum Reply {
    Document(Arc<RenderedDocument>),
    Image(RenderedImage),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Document(doc) => ([(header::CONTENT_TYPE, doc.content_type)], doc.body()).into_response(),
            Reply::Image(image) => ([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response(),
        }
    }
}

/// The proxy core: shared client, caches and notifier.
pub struct Proxy {
    client: FetchClient,
    caches: Arc<CacheTiers>,
    notifier: Arc<dyn StatusNotifier>,
    base_path: Option<String>,
}

impl Proxy {
    pub fn new(
        client: FetchClient, caches: Arc<CacheTiers>, notifier: Arc<dyn StatusNotifier>, base_path: Option<String>,
    ) -> Self {
        Self { client, caches, notifier, base_path }
    }

    #[cfg(test)]
    pub fn caches(&self) -> &CacheTiers {
        &self.caches
    }

    /// Serve `path` as requested under virtual host `host`.
    pub async fn handle(&self, host: &str, path: &str, mappings: &MappingTable) -> Result<Reply, ProxyError> {
        let mut path = path.to_lowercase();

        if path.ends_with(".txt") {
            return Err(ProxyError::TextFile(path));
        }

        let skip_mapping = path.contains(RAW_FETCH_MARKER);
        if skip_mapping {
            path = with_scheme(path.trim_start_matches('/'));
        }
        let path = self.strip_base_path(path);

        let started = Instant::now();
        tracing::debug!(%path, host, "proxy hit");

        let mut signal = SignalGuard::new(self.notifier.acquire().await);
        signal.notify(Phase::Working, Urgency::Medium).await;

        let result = self.run(host, &path, skip_mapping, mappings, &mut signal).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => {
                signal.notify(Phase::Success, Urgency::Fast).await;
                tracing::debug!(%path, host, elapsed_ms, "proxy done");
            }
            Err(err) if err.is_rejection() => {
                signal.notify(Phase::Error, Urgency::Fast).await;
                tracing::info!(%path, host, elapsed_ms, error = %err, "request rejected");
            }
            Err(err) => {
                signal.notify(Phase::Error, Urgency::Fast).await;
                tracing::error!(%path, host, elapsed_ms, error = %err, "request failed");
            }
        }

        result
    }

    fn strip_base_path(&self, path: String) -> String {
        let Some(base) = self.base_path.as_deref() else {
            return path;
        };
        let base = base.to_lowercase();
        match path.strip_prefix(base.as_str()) {
            Some(rest) => rest.trim_start_matches('/').to_string(),
            None => path,
        }
    }

    async fn run(
        &self, host: &str, path: &str, skip_mapping: bool, mappings: &MappingTable, signal: &mut SignalGuard,
    ) -> Result<Reply, ProxyError> {
        if self.caches.failures.is_known_bad(path).await {
            return Err(ProxyError::KnownBad(path.to_string()));
        }

        let is_image = is_image_url(path);
        if is_image {
            if let Some(archive_url) = self.caches.images.get(path).await {
                tracing::debug!(%path, %archive_url, "image cache hit");
                return self.serve_image(path, &archive_url).await;
            }
            tracing::debug!(%path, "image cache miss");
        }

        let resolved = resolve(path, mappings, skip_mapping)?;

        if is_image {
            return self.serve_image(path, &resolved.fetch_url).await;
        }

        let key = document_key(host, path);
        if let Some(doc) = self.caches.documents.get(&key).await {
            tracing::debug!(%key, "document cache hit");
            return Ok(Reply::Document(doc));
        }
        tracing::debug!(%key, url = %resolved.fetch_url, "document cache miss, loading");

        let rendered = match render_document(&self.client, &resolved, self.base_path.as_deref()).await {
            Ok(rendered) => rendered,
            Err(err) => return Err(self.remember_failure(path, err).await),
        };
        signal.notify(Phase::Working, Urgency::Fast).await;

        for image in rendered.images {
            self.caches.images.set(image.local_path, image.archive_url).await;
        }

        let doc = Arc::new(rendered.document);
        self.caches.documents.set(key, doc.clone()).await;

        Ok(Reply::Document(doc))
    }

    async fn serve_image(&self, path: &str, archive_url: &str) -> Result<Reply, ProxyError> {
        match render_image(&self.client, archive_url).await {
            Ok(image) => Ok(Reply::Image(image)),
            Err(err) => Err(self.remember_failure(path, err).await),
        }
    }

    async fn remember_failure(&self, path: &str, err: Error) -> ProxyError {
        if err.is_upstream_failure() {
            self.caches.failures.mark_failed(path).await;
        }
        err.into()
    }
}
