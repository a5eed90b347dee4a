//! Client side of the admin HTTP API.
//!
//! [`AdminApi`] is the seam reducers depend on. [`HttpAdminApi`] talks to the
//! real backend; [`MockAdminApi`] is an in-memory backend for tests and the
//! CLI's demo mode.

use crate::types::{CreatedProduct, FilterCriteria, NewProduct, Order, OrderId, OrderStatus};
use futures::future::BoxFuture;
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpAdminApi;
pub use mock::{MockAdminApi, RecordedRequest};

/// Errors that can occur when talking to the admin API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-2xx status
    #[error("API error (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The HTTP client gave up waiting
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the given input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Whether the server rejected the request (as opposed to it never arriving)
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// Operations of the admin backend the console consumes.
///
/// Object safe so environments can hold an `Arc<dyn AdminApi>`.
pub trait AdminApi: Send + Sync {
    /// `GET /orders` with the non-empty criteria as query parameters
    fn fetch_orders(&self, criteria: FilterCriteria) -> BoxFuture<'_, Result<Vec<Order>, ApiError>>;

    /// `PUT /orders/{order_id}/status`, returning the updated order
    fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> BoxFuture<'_, Result<Order, ApiError>>;

    /// `POST /products` as multipart form data
    fn add_product(&self, product: NewProduct) -> BoxFuture<'_, Result<CreatedProduct, ApiError>>;
}
