//! In-memory admin backend.
//!
//! Applies the same filtering the real backend does, records every request
//! and can script failures and latency. Used by tests and by `tp-admin --demo`.

use super::{AdminApi, ApiError};
use crate::types::{
    CreatedProduct, FilterCriteria, ItemId, LineItem, NewProduct, Order, OrderId, OrderStatus,
};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A request received by [`MockAdminApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedRequest {
    /// `GET /orders`
    FetchOrders(FilterCriteria),
    /// `PUT /orders/{id}/status`
    UpdateStatus {
        /// Target order
        order_id: OrderId,
        /// Requested status
        status: OrderStatus,
    },
    /// `POST /products`
    AddProduct {
        /// Product name
        name: String,
    },
}

#[derive(Debug, Default)]
struct Backend {
    orders: Vec<Order>,
    products: Vec<NewProduct>,
    requests: Vec<RecordedRequest>,
    failures: VecDeque<ApiError>,
    latencies: VecDeque<Duration>,
    latency: Duration,
}

impl Backend {
    /// Latency for the next request: scripted first, then the default
    fn next_latency(&mut self) -> Duration {
        self.latencies.pop_front().unwrap_or(self.latency)
    }
}

/// In-memory [`AdminApi`]
///
/// Cloning shares the same backend.
#[derive(Clone, Debug, Default)]
pub struct MockAdminApi {
    backend: Arc<Mutex<Backend>>,
}

impl MockAdminApi {
    /// Backend serving `orders`
    #[must_use]
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Backend {
                orders,
                ..Backend::default()
            })),
        }
    }

    /// Backend pre-loaded with a dozen demo orders
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(demo_orders())
    }

    /// Delay every response by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Delay the next not-yet-scripted request by `latency`
    pub fn push_latency(&self, latency: Duration) {
        self.lock().latencies.push_back(latency);
    }

    /// Fail the next not-yet-scripted request with `error`
    pub fn fail_next(&self, error: ApiError) {
        self.lock().failures.push_back(error);
    }

    /// Every request received so far, in arrival order
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Current server-side orders
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    /// Products created so far
    #[must_use]
    pub fn products(&self) -> Vec<NewProduct> {
        self.lock().products.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `request` and take the scripted latency and failure for it
    fn receive(&self, request: RecordedRequest) -> (Duration, Option<ApiError>) {
        let mut backend = self.lock();
        backend.requests.push(request);
        let latency = backend.next_latency();
        (latency, backend.failures.pop_front())
    }
}

fn matches(order: &Order, criteria: &FilterCriteria) -> bool {
    let name = criteria.customer_name.trim().to_lowercase();
    let id = criteria.order_id.trim();

    (name.is_empty() || order.customer_name.to_lowercase().contains(&name))
        && (id.is_empty() || order.id.as_str() == id)
        && criteria.status.is_none_or(|status| order.status == status)
}

impl AdminApi for MockAdminApi {
    fn fetch_orders(&self, criteria: FilterCriteria) -> BoxFuture<'_, Result<Vec<Order>, ApiError>> {
        let (latency, failure) = self.receive(RecordedRequest::FetchOrders(criteria.clone()));

        Box::pin(async move {
            tokio::time::sleep(latency).await;
            if let Some(error) = failure {
                return Err(error);
            }
            Ok(self
                .lock()
                .orders
                .iter()
                .filter(|order| matches(order, &criteria))
                .cloned()
                .collect())
        })
    }

    fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> BoxFuture<'_, Result<Order, ApiError>> {
        let (latency, failure) = self.receive(RecordedRequest::UpdateStatus {
            order_id: order_id.clone(),
            status,
        });

        Box::pin(async move {
            tokio::time::sleep(latency).await;
            if let Some(error) = failure {
                return Err(error);
            }
            let mut backend = self.lock();
            let order = backend
                .orders
                .iter_mut()
                .find(|order| order.id == order_id)
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    body: format!("Order {order_id} not found"),
                })?;
            order.status = status;
            Ok(order.clone())
        })
    }

    fn add_product(&self, product: NewProduct) -> BoxFuture<'_, Result<CreatedProduct, ApiError>> {
        let (latency, failure) = self.receive(RecordedRequest::AddProduct {
            name: product.name.clone(),
        });

        Box::pin(async move {
            tokio::time::sleep(latency).await;
            if let Some(error) = failure {
                return Err(error);
            }
            let mut details = serde_json::Map::new();
            details.insert("description".into(), product.description.clone().into());
            details.insert("price".into(), product.price.clone().into());
            details.insert("image".into(), product.image.file_name.clone().into());
            let created = CreatedProduct {
                name: product.name.clone(),
                details,
            };
            self.lock().products.push(product);
            Ok(created)
        })
    }
}

fn demo_orders() -> Vec<Order> {
    const CUSTOMERS: [&str; 6] = [
        "Asha Menon",
        "Ravi Kumar",
        "Meera Iyer",
        "Arjun Nair",
        "Divya Pillai",
        "Karthik Rao",
    ];
    const PRODUCTS: [(&str, &str); 4] = [
        ("Masala Dosa Batter", "₹120.00"),
        ("Filter Coffee Powder", "₹250.50"),
        ("Banana Chips", "₹80.00"),
        ("Ghee 500ml", "₹399.99"),
    ];
    const SLOTS: [&str; 3] = ["9 AM - 12 PM", "12 PM - 3 PM", "3 PM - 6 PM"];
    // 2024-03-01T08:00:00Z
    const FIRST_ORDER: i64 = 1_709_280_000;

    (0..12_u32)
        .map(|n| {
            let i = n as usize;
            let status = OrderStatus::ALL[i % OrderStatus::ALL.len()];
            let items = (0..=n % 3)
                .map(|k| {
                    let (name, price) = PRODUCTS[(i + k as usize) % PRODUCTS.len()];
                    LineItem {
                        id: ItemId::from(u64::from(n * 10 + k + 1)),
                        name: name.to_string(),
                        quantity: k + 1,
                        price: price.to_string(),
                    }
                })
                .collect();

            Order {
                id: OrderId::from(u64::from(n + 1)),
                customer_name: CUSTOMERS[i % CUSTOMERS.len()].to_string(),
                date: DateTime::<Utc>::from_timestamp(FIRST_ORDER + i64::from(n) * 5_400, 0)
                    .unwrap_or_default(),
                delivery_address: (n % 4 != 3).then(|| format!("{} MG Road, Kochi", 10 + n)),
                time_slot: (n % 5 != 4).then(|| SLOTS[i % SLOTS.len()].to_string()),
                status,
                items,
            }
        })
        .collect()
}
