//! Mission control: route one request and decode the single response
//!
//! The [`Router`] trait is the boundary to whatever does the actual fan-out.
//! [`MissionControl`] turns its raw answer into a typed response or a
//! [`RouteError`], and records each call in a tracing span.

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, field, info_span, Instrument};

#[cfg(test)]
use mockall::automock;

use crate::error::RouteError;

/// A request submitted to the router
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouterRequest {
    /// Encoded request body
    pub payload: Bytes,
    /// Request headers forwarded to upstreams
    pub metadata: BTreeMap<String, String>,
}

impl RouterRequest {
    /// Create a request with a payload and no metadata
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The router's answer to a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterResponse {
    /// Whether the upstream handled the request
    pub success: bool,
    /// Upstream status code
    pub status_code: i32,
    /// Encoded response body
    pub payload: Bytes,
    /// Response headers to propagate to the caller
    pub metadata: BTreeMap<String, String>,
}

impl RouterResponse {
    /// A successful response
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            success: true,
            status_code: 200,
            payload: payload.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// A failed response carrying the upstream's status and body
    pub fn failed(status_code: i32, payload: impl Into<Bytes>) -> Self {
        Self {
            success: false,
            status_code,
            payload: payload.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Dispatches a request to upstream services.
///
/// Returns `None` when no upstream produced a response.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Router: Send + Sync {
    /// Dispatch a request and wait for the single selected response
    async fn dispatch(&self, request: RouterRequest) -> Option<RouterResponse>;
}

/// A decoded response and the metadata the caller should forward
#[derive(Clone, Debug, PartialEq)]
pub struct Routed<T> {
    /// Decoded response body
    pub response: T,
    /// Response metadata from the upstream
    pub metadata: BTreeMap<String, String>,
}

/// Routes requests through a [`Router`] and decodes JSON responses
pub struct MissionControl<R> {
    router: R,
}

impl<R: Router> MissionControl<R> {
    /// Create a mission control over a router
    pub fn new(router: R) -> Self {
        Self { router }
    }

    /// Route a request and decode the response body as `T`
    pub async fn route<T: DeserializeOwned>(
        &self,
        request: RouterRequest,
    ) -> Result<Routed<T>, RouteError> {
        let span = info_span!(
            "route",
            outcome = field::Empty,
            duration_ms = field::Empty
        );
        let start = Instant::now();

        let result = self.dispatch_and_decode(request).instrument(span.clone()).await;

        span.record("outcome", outcome(&result));
        span.record("duration_ms", start.elapsed().as_millis() as u64);
        result
    }

    async fn dispatch_and_decode<T: DeserializeOwned>(
        &self,
        request: RouterRequest,
    ) -> Result<Routed<T>, RouteError> {
        let response = self.router.dispatch(request).await.ok_or_else(|| {
            RouteError::bad_response("did not get back a valid response from the router")
        })?;

        if !response.success {
            debug!(code = response.status_code, "upstream returned failure");
            return Err(RouteError::upstream(
                response.status_code,
                String::from_utf8_lossy(&response.payload),
            ));
        }

        let decoded = serde_json::from_slice(&response.payload).map_err(|e| {
            RouteError::bad_response(format!(
                "unable to decode response into expected type: {}",
                e
            ))
        })?;

        Ok(Routed {
            response: decoded,
            metadata: response.metadata,
        })
    }
}

fn outcome<T>(result: &Result<T, RouteError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(RouteError::BadResponse(_)) => "bad_response",
        Err(RouteError::Upstream { .. }) => "upstream_error",
    }
}
