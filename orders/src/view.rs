//! Plain-text rendering of the orders screen.

use crate::projection::format_order_date;
use crate::reducer::{LoadState, ManageOrdersState, StatusUpdate};
use std::fmt::Write;

/// Column headings of the orders table
pub const HEADER: [&str; 10] = [
    "ID",
    "Name",
    "Quantity",
    "Price",
    "Total",
    "Date",
    "Delivery Address",
    "Time Slot",
    "Status",
    "Update Status",
];

const SEPARATOR: &str = " | ";

/// Render the orders screen.
///
/// While loading only the loading line is shown, after a failed fetch only
/// the error, and an empty set shows an explicit message instead of a table.
#[must_use]
pub fn render(state: &ManageOrdersState) -> String {
    match &state.load {
        LoadState::Loading => return "Loading orders...\n".to_string(),
        LoadState::Failed(error) => return format!("Error loading orders: {error}\n"),
        LoadState::Loaded => {},
    }

    let mut out = String::new();
    if state.orders.is_empty() {
        out.push_str("No orders to display.\n");
    } else {
        out.push_str(&HEADER.join(SEPARATOR));
        out.push('\n');

        for row in state.rows() {
            let cells = [
                row.key.item_id.to_string(),
                row.name.clone(),
                row.quantity.to_string(),
                row.price.clone(),
                row.total_label(),
                row.order_date.clone(),
                row.delivery_address.clone(),
                row.time_slot.clone(),
                row.status.to_string(),
                format!("[{}] (order {})", row.action.label, row.key.order_id),
            ];
            out.push_str(&cells.join(SEPARATOR));
            out.push('\n');
        }
    }

    match &state.status_update {
        StatusUpdate::Idle => {},
        StatusUpdate::Selected { order_id, proposed } => {
            let _ = writeln!(out, "Update Order Status: order {order_id} → {proposed}");
        },
        StatusUpdate::Submitting { order_id, proposed } => {
            let _ = writeln!(
                out,
                "Update Order Status: order {order_id} → {proposed} (submitting...)"
            );
        },
    }

    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "{notice}");
    }

    if !state.orders.is_empty() {
        out.push_str(&pagination_bar(state));
        out.push('\n');
        if let Some(at) = &state.last_loaded_at {
            let _ = writeln!(out, "Last updated: {}", format_order_date(at));
        }
    }
    out
}

/// `Previous [1] 2 3 Next`, with unavailable ends in parentheses
#[must_use]
pub fn pagination_bar(state: &ManageOrdersState) -> String {
    let pagination = &state.pagination;
    let len = state.orders.len();

    let mut parts = Vec::with_capacity(pagination.page_count(len) + 2);
    parts.push(if pagination.has_prev() {
        "Previous".to_string()
    } else {
        "(Previous)".to_string()
    });
    for page in 1..=pagination.page_count(len) {
        parts.push(if page == pagination.current_page() {
            format!("[{page}]")
        } else {
            page.to_string()
        });
    }
    parts.push(if pagination.has_next(len) {
        "Next".to_string()
    } else {
        "(Next)".to_string()
    });
    parts.join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::reducer::{FetchError, Notice};
    use crate::types::{ItemId, LineItem, Order, OrderId, OrderStatus};
    use chrono::{TimeZone, Utc};

    fn order(id: u64) -> Order {
        Order {
            id: OrderId::from(id),
            customer_name: "Asha".into(),
            date: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
            delivery_address: Some("12 MG Road".into()),
            time_slot: None,
            status: OrderStatus::Pending,
            items: vec![LineItem {
                id: ItemId::from(10),
                name: "Widget".into(),
                quantity: 2,
                price: "₹50".into(),
            }],
        }
    }

    fn loaded(orders: Vec<Order>) -> ManageOrdersState {
        let mut state = ManageOrdersState::default();
        state.load = LoadState::Loaded;
        state.orders = orders;
        state
    }

    #[test]
    fn loading_and_failure_hide_the_table() {
        assert_eq!(render(&ManageOrdersState::default()), "Loading orders...\n");

        let mut state = loaded(vec![order(1)]);
        state.load = LoadState::Failed(FetchError::Api(ApiError::RequestFailed("refused".into())));
        assert_eq!(render(&state), "Error loading orders: Request failed: refused\n");
    }

    #[test]
    fn empty_set_shows_message_instead_of_table() {
        let out = render(&loaded(Vec::new()));
        assert_eq!(out, "No orders to display.\n");
        assert!(!out.contains("Delivery Address"));
    }

    #[test]
    fn rows_render_with_totals_and_actions() {
        let out = render(&loaded(vec![order(1)]));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], HEADER.join(" | "));
        assert_eq!(
            lines[1],
            "10 | Widget | 2 | ₹50 | ₹100.00 | 05/03/2024, 09:30:00 | 12 MG Road | N/A | Pending | [Mark as Processing] (order 1)"
        );
        assert_eq!(lines[2], "(Previous) [1] (Next)");
    }

    #[test]
    fn last_load_time_follows_the_pagination_bar() {
        let mut state = loaded(vec![order(1)]);
        state.last_loaded_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 8, 5, 0).unwrap());

        let out = render(&state);
        assert!(out.ends_with("(Previous) [1] (Next)\nLast updated: 01/01/2025, 08:05:00\n"));

        state.orders.clear();
        assert_eq!(render(&state), "No orders to display.\n");
    }

    #[test]
    fn selection_and_notice_are_shown() {
        let mut state = loaded(vec![order(1)]);
        state.status_update = StatusUpdate::Selected {
            order_id: OrderId::from(1),
            proposed: OrderStatus::Processing,
        };
        state.notice = Some(Notice::StatusUpdated {
            order_id: OrderId::from(2),
            status: OrderStatus::Delivered,
        });

        let out = render(&state);
        assert!(out.contains("Update Order Status: order 1 → Processing\n"));
        assert!(out.contains("Order 2 marked as Delivered\n"));
    }

    #[test]
    fn pagination_bar_marks_current_page() {
        let mut state = loaded((1..=25).map(order).collect());
        assert_eq!(pagination_bar(&state), "(Previous) [1] 2 3 Next");

        state.pagination.go_to(2, 25);
        assert_eq!(pagination_bar(&state), "Previous 1 [2] 3 Next");

        state.pagination.go_to(3, 25);
        assert_eq!(pagination_bar(&state), "Previous 1 2 [3] (Next)");
    }
}
