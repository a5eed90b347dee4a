//! Flattening orders into table rows.
//!
//! Every line item of every order on the visible page becomes one row that
//! carries its order's date, delivery details, status and status action.
//! Price parsing happens here, per row: a bad price makes that row's total
//! unavailable and never fails the table.

use crate::types::{ItemId, Order, OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Shown for missing delivery details and unavailable totals
pub const NOT_AVAILABLE: &str = "N/A";

/// A line-item price that is not a currency symbol followed by a number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed price '{price}'")]
pub struct MalformedPriceError {
    /// The price as received
    pub price: String,
}

/// Numeric value of a price such as `"₹120.50"`.
///
/// Exactly the first character (the currency symbol) is dropped and the rest
/// must be a finite decimal number.
///
/// # Errors
///
/// Returns [`MalformedPriceError`] for an empty price or a non-numeric
/// remainder.
pub fn parse_price(price: &str) -> Result<f64, MalformedPriceError> {
    let mut chars = price.chars();
    chars.next();

    chars
        .as_str()
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| MalformedPriceError {
            price: price.to_string(),
        })
}

/// `quantity × price`, rounded to 2 decimal places
///
/// # Errors
///
/// Returns [`MalformedPriceError`] if `price` does not parse.
pub fn line_total(quantity: u32, price: &str) -> Result<f64, MalformedPriceError> {
    let unit = parse_price(price)?;
    Ok((f64::from(quantity) * unit * 100.0).round() / 100.0)
}

/// Order timestamp as shown in the table (UTC, `dd/mm/yyyy, HH:MM:SS`)
#[must_use]
pub fn format_order_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Row identity: item ids are only unique within their order
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    /// Owning order
    pub order_id: OrderId,
    /// Line item
    pub item_id: ItemId,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.order_id, self.item_id)
    }
}

/// The status transition offered on a row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusAction {
    /// Button label
    pub label: &'static str,
    /// Status the action proposes
    pub proposed: OrderStatus,
}

impl StatusAction {
    /// The action offered for an order currently in `status`
    #[must_use]
    pub const fn for_status(status: OrderStatus) -> Self {
        Self {
            label: status.action_label(),
            proposed: status.proposed_next(),
        }
    }
}

/// One displayable line of the orders table
#[derive(Clone, Debug, PartialEq)]
pub struct OrderRow {
    /// Composite identity
    pub key: RowKey,
    /// Product name
    pub name: String,
    /// Units ordered
    pub quantity: u32,
    /// Unit price as received
    pub price: String,
    /// Line total, or why it is unavailable
    pub total: Result<f64, MalformedPriceError>,
    /// Formatted order date
    pub order_date: String,
    /// Delivery address or `N/A`
    pub delivery_address: String,
    /// Time slot or `N/A`
    pub time_slot: String,
    /// Order status
    pub status: OrderStatus,
    /// Status action for the owning order
    pub action: StatusAction,
}

impl OrderRow {
    /// Total with the price's currency symbol, or `N/A`
    #[must_use]
    pub fn total_label(&self) -> String {
        match &self.total {
            Ok(total) => {
                let symbol = self.price.chars().next().map(String::from).unwrap_or_default();
                format!("{symbol}{total:.2}")
            },
            Err(_) => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Rows for `orders`, in order then item order
#[must_use]
pub fn project_rows(orders: &[Order]) -> Vec<OrderRow> {
    orders
        .iter()
        .flat_map(|order| {
            let order_date = format_order_date(&order.date);
            let delivery_address = order
                .delivery_address
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let time_slot = order
                .time_slot
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let action = StatusAction::for_status(order.status);

            order.items.iter().map(move |item| {
                let total = line_total(item.quantity, &item.price);
                if let Err(error) = &total {
                    tracing::debug!(order_id = %order.id, item_id = %item.id, %error, "Row total unavailable");
                }

                OrderRow {
                    key: RowKey {
                        order_id: order.id.clone(),
                        item_id: item.id.clone(),
                    },
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: item.price.clone(),
                    total,
                    order_date: order_date.clone(),
                    delivery_address: delivery_address.clone(),
                    time_slot: time_slot.clone(),
                    status: order.status,
                    action,
                }
            })
        })
        .collect()
}
