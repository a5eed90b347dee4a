//! Wire model for the admin API.
//!
//! Orders, line items and products as the backend serves them (camelCase
//! JSON), plus the filter criteria the console sends with every fetch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Ids arrive as JSON strings or numbers depending on the backend build.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a `", stringify!($name), "` from its raw value")]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw id
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

string_id! {
    /// Server-assigned order identifier
    OrderId
}

string_id! {
    /// Line item identifier (unique within an order, not across orders)
    ItemId
}

// ============================================================================
// Order status
// ============================================================================

/// Fulfilment status of an order.
///
/// The lifecycle is fixed: `Pending → Processing → Delivered`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed, not yet picked up
    Pending,
    /// Being prepared
    Processing,
    /// Handed to the customer
    Delivered,
}

impl OrderStatus {
    /// All statuses in lifecycle order
    pub const ALL: [Self; 3] = [Self::Pending, Self::Processing, Self::Delivered];

    /// Status an operator action on this order moves it to.
    ///
    /// `Pending` proposes `Processing`; everything else proposes `Delivered`,
    /// so a delivered order proposes itself again.
    #[must_use]
    pub const fn proposed_next(self) -> Self {
        match self {
            Self::Pending => Self::Processing,
            Self::Processing | Self::Delivered => Self::Delivered,
        }
    }

    /// Label of the row action that applies [`OrderStatus::proposed_next`]
    #[must_use]
    pub const fn action_label(self) -> &'static str {
        match self.proposed_next() {
            Self::Processing => "Mark as Processing",
            Self::Pending | Self::Delivered => "Mark as Delivered",
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown order status name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status '{0}' (expected Pending, Processing or Delivered)")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// Orders
// ============================================================================

/// One purchased product line of an order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item id
    pub id: ItemId,
    /// Product name
    pub name: String,
    /// Units ordered
    pub quantity: u32,
    /// Unit price with a leading currency symbol, e.g. `"₹120.00"`
    pub price: String,
}

/// A customer order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id
    pub id: OrderId,
    /// Customer display name
    #[serde(default)]
    pub customer_name: String,
    /// When the order was placed
    #[serde(deserialize_with = "lenient_date")]
    pub date: DateTime<Utc>,
    /// Delivery address, if the customer gave one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    /// Requested delivery slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    /// Current status
    pub status: OrderStatus,
    /// Line items in display order
    #[serde(default, deserialize_with = "items_or_empty")]
    pub items: Vec<LineItem>,
}

/// Order dates arrive as RFC 3339, as ISO without an offset (UTC), or as
/// epoch milliseconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Millis(i64),
}

fn parse_order_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDate::deserialize(deserializer)? {
        RawDate::Text(text) => parse_order_date(&text)
            .ok_or_else(|| D::Error::custom(format!("unrecognised order date '{text}'"))),
        RawDate::Millis(millis) => DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("order date {millis} out of range"))),
    }
}

fn items_or_empty<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<LineItem>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Filter criteria
// ============================================================================

/// The three independent search constraints of the orders screen.
///
/// Empty (or whitespace-only) fields and `None` mean "no constraint".
/// Non-empty values are sent as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Customer-name substring
    pub customer_name: String,
    /// Exact order id
    pub order_id: String,
    /// Exact status
    pub status: Option<OrderStatus>,
}

impl FilterCriteria {
    /// Query parameters for the non-empty criteria, in wire order
    /// (`customerName`, `status`, `id`).
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if !self.customer_name.trim().is_empty() {
            pairs.push(("customerName", self.customer_name.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if !self.order_id.trim().is_empty() {
            pairs.push(("id", self.order_id.clone()));
        }
        pairs
    }

    /// Whether no constraint is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

// ============================================================================
// Status updates
// ============================================================================

/// Body of `PUT /orders/{id}/status`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Target status
    pub status: OrderStatus,
}

/// Response of `PUT /orders/{id}/status`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdatedOrder {
    /// The order as stored after the change
    pub order: Order,
}

// ============================================================================
// Products
// ============================================================================

/// Image attached to a new product listing
#[derive(Clone, PartialEq, Eq)]
pub struct ProductImage {
    /// Original file name
    pub file_name: String,
    /// MIME type, e.g. `image/png`
    pub mime: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ProductImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductImage")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A product listing to create (`POST /products`, multipart)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Description
    pub description: String,
    /// Price as typed by the operator
    pub price: String,
    /// Product image
    pub image: ProductImage,
}

/// Product as echoed back by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProduct {
    /// Product name
    pub name: String,
    /// Any other fields the backend returns
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Response of `POST /products`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEnvelope {
    /// The stored product
    pub product: CreatedProduct,
}
