use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use tracing::debug;

use crate::config::Routes;
use crate::engine::EngineError;
use crate::model::{Booking, BookingPatch, StatusChange};
use crate::observability;
use crate::wire;

/// The REST calls the engine depends on. Every call receives the bearer
/// token the engine obtained from its session source.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// Entire booking collection, in backend order.
    async fn list(&self, token: &str) -> Result<Vec<Booking>, EngineError>;

    async fn get(&self, token: &str, id: &str) -> Result<Option<Booking>, EngineError>;

    /// Returns the canonical booking after the change.
    async fn update_status(
        &self,
        token: &str,
        id: &str,
        change: &StatusChange,
    ) -> Result<Booking, EngineError>;

    /// Returns the canonical booking after the change.
    async fn update_fields(
        &self,
        token: &str,
        id: &str,
        patch: &BookingPatch,
    ) -> Result<Booking, EngineError>;

    async fn delete(&self, token: &str, id: &str) -> Result<(), EngineError>;
}

/// JSON-over-HTTP backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    routes: Routes,
    fetch_limit: Option<u32>,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        routes: Routes,
        fetch_limit: Option<u32>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| EngineError::FetchFailed(format!("invalid backend url: {base_url}")))?;
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::FetchFailed(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            routes,
            fetch_limit,
        })
    }

    /// Base URL with `segments` appended. Each segment is percent-encoded,
    /// so opaque ids cannot escape their path position.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], token: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(segments))
            .header("content-type", "application/json")
            .bearer_auth(token)
    }

    fn status_request(&self, id: &str, token: &str) -> RequestBuilder {
        match self.routes {
            Routes::Admin => self.request(Method::PUT, &["admin", "bookings", id, "status"], token),
            Routes::Public => self.request(Method::PATCH, &["bookings", id, "status"], token),
        }
    }

    fn delete_request(&self, id: &str, token: &str) -> RequestBuilder {
        match self.routes {
            Routes::Admin => self.request(Method::DELETE, &["admin", "bookings", id], token),
            Routes::Public => self.request(Method::DELETE, &["bookings", id], token),
        }
    }
}

/// Send a request and return the body of a 2xx response.
///
/// `fail` wraps the error text in the variant the caller reports; `fallback`
/// is used when a non-2xx response carries no usable `message`.
async fn send(
    op: &'static str,
    builder: RequestBuilder,
    fail: fn(String) -> EngineError,
    fallback: &str,
) -> Result<Vec<u8>, EngineError> {
    let started = Instant::now();
    let result = exchange(builder, fail, fallback).await;
    observability::record_request(op, result.is_ok(), started);
    result
}

async fn exchange(
    builder: RequestBuilder,
    fail: fn(String) -> EngineError,
    fallback: &str,
) -> Result<Vec<u8>, EngineError> {
    let response: Response = builder
        .send()
        .await
        .map_err(|e| fail(format!("{fallback}: {e}")))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| fail(format!("{fallback}: {e}")))?;
    if status.is_success() {
        return Ok(body.to_vec());
    }
    debug!("backend answered {status}");
    let reason = status.canonical_reason().unwrap_or("unexpected status");
    Err(fail(
        wire::error_message(&body).unwrap_or_else(|| format!("{fallback}: {reason}")),
    ))
}

#[async_trait]
impl BookingBackend for HttpBackend {
    async fn list(&self, token: &str) -> Result<Vec<Booking>, EngineError> {
        let mut builder = self.request(Method::GET, &["admin", "bookings"], token);
        if let Some(limit) = self.fetch_limit {
            builder = builder.query(&[("limit", limit)]);
        }
        let body = send(
            "list",
            builder,
            EngineError::FetchFailed,
            "Failed to fetch bookings",
        )
        .await?;
        wire::decode_list(&body)
    }

    async fn get(&self, token: &str, id: &str) -> Result<Option<Booking>, EngineError> {
        let builder = self.request(Method::GET, &["bookings", id], token);
        let body = send("get", builder, EngineError::FetchFailed, "Failed to fetch booking").await?;
        wire::decode_optional_booking(&body)
    }

    async fn update_status(
        &self,
        token: &str,
        id: &str,
        change: &StatusChange,
    ) -> Result<Booking, EngineError> {
        let builder = self.status_request(id, token).json(change);
        let body = send(
            "update_status",
            builder,
            EngineError::MutationRejected,
            "Failed to update booking status",
        )
        .await?;
        wire::decode_booking(&body)
    }

    async fn update_fields(
        &self,
        token: &str,
        id: &str,
        patch: &BookingPatch,
    ) -> Result<Booking, EngineError> {
        let builder = self
            .request(Method::PUT, &["admin", "bookings", id], token)
            .json(patch);
        let body = send(
            "update_fields",
            builder,
            EngineError::MutationRejected,
            "Failed to update booking",
        )
        .await?;
        wire::decode_booking(&body)
    }

    async fn delete(&self, token: &str, id: &str) -> Result<(), EngineError> {
        let builder = self.delete_request(id, token);
        send(
            "delete",
            builder,
            EngineError::MutationRejected,
            "Failed to delete booking",
        )
        .await?;
        Ok(())
    }
}
