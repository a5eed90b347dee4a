//! `reqwest` implementation of [`AdminApi`].

use super::{AdminApi, ApiError};
use crate::types::{
    CreatedProduct, FilterCriteria, NewProduct, Order, OrderId, OrderStatus, ProductEnvelope,
    StatusChange, UpdatedOrder,
};
use futures::future::BoxFuture;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Admin API client over HTTP
#[derive(Clone, Debug)]
pub struct HttpAdminApi {
    client: Client,
    base_url: Url,
}

impl HttpAdminApi {
    /// Create a client for the backend at `base_url` (e.g. `http://localhost:8000`).
    ///
    /// `timeout` bounds every request end to end.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] if `base_url` does not parse, or
    /// [`ApiError::RequestFailed`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidInput(format!("invalid API URL '{base_url}': {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::InvalidInput(format!("'{}' cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn transport_error(error: &reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::RequestFailed(error.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::ResponseParseFailed(e.to_string())
        }
    })
}

fn record_latency(endpoint: &'static str, started: Instant) {
    metrics::histogram!("api.request.duration_seconds", "endpoint" => endpoint)
        .record(started.elapsed().as_secs_f64());
}

impl AdminApi for HttpAdminApi {
    fn fetch_orders(&self, criteria: FilterCriteria) -> BoxFuture<'_, Result<Vec<Order>, ApiError>> {
        Box::pin(async move {
            let url = self.endpoint(&["orders"])?;
            let query = criteria.query_pairs();
            tracing::debug!(%url, ?query, "Fetching orders");

            let started = Instant::now();
            let result = async {
                let response = self
                    .client
                    .get(url)
                    .query(&query)
                    .send()
                    .await
                    .map_err(|e| transport_error(&e))?;
                read_json::<Vec<Order>>(response).await
            }
            .await;
            record_latency("fetch_orders", started);

            match &result {
                Ok(orders) => tracing::debug!(count = orders.len(), "Orders fetched"),
                Err(error) => tracing::warn!(%error, "Order fetch failed"),
            }
            result
        })
    }

    fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> BoxFuture<'_, Result<Order, ApiError>> {
        Box::pin(async move {
            let url = self.endpoint(&["orders", order_id.as_str(), "status"])?;
            tracing::debug!(%url, %status, "Updating order status");

            let started = Instant::now();
            let result = async {
                let response = self
                    .client
                    .put(url)
                    .json(&StatusChange { status })
                    .send()
                    .await
                    .map_err(|e| transport_error(&e))?;
                read_json::<UpdatedOrder>(response).await.map(|updated| updated.order)
            }
            .await;
            record_latency("update_status", started);

            if let Err(error) = &result {
                tracing::warn!(%order_id, %error, "Status update failed");
            }
            result
        })
    }

    fn add_product(&self, product: NewProduct) -> BoxFuture<'_, Result<CreatedProduct, ApiError>> {
        Box::pin(async move {
            let url = self.endpoint(&["products"])?;
            tracing::debug!(%url, name = %product.name, "Submitting product");

            let image = Part::bytes(product.image.bytes)
                .file_name(product.image.file_name)
                .mime_str(&product.image.mime)
                .map_err(|e| ApiError::InvalidInput(format!("image type: {e}")))?;
            let form = Form::new()
                .text("name", product.name)
                .text("description", product.description)
                .text("price", product.price)
                .part("image", image);

            let started = Instant::now();
            let result = async {
                let response = self
                    .client
                    .post(url)
                    .multipart(form)
                    .send()
                    .await
                    .map_err(|e| transport_error(&e))?;
                read_json::<ProductEnvelope>(response).await.map(|envelope| envelope.product)
            }
            .await;
            record_latency("add_product", started);
            result
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_extend_the_base_path() {
        let api = HttpAdminApi::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            api.endpoint(&["orders", "17", "status"]).unwrap().as_str(),
            "http://localhost:8000/orders/17/status"
        );

        let nested = HttpAdminApi::new("http://admin.local/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            nested.endpoint(&["orders"]).unwrap().as_str(),
            "http://admin.local/api/orders"
        );
    }

    #[test]
    fn order_ids_are_path_encoded() {
        let api = HttpAdminApi::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            api.endpoint(&["orders", "a/b", "status"]).unwrap().as_str(),
            "http://localhost:8000/orders/a%2Fb/status"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = HttpAdminApi::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}
