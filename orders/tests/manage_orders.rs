//! End-to-end tests of the orders screen: reducer + Store + in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tp_admin_orders::api::{ApiError, MockAdminApi, RecordedRequest};
use tp_admin_orders::reducer::{
    FetchError, LoadState, ManageOrdersAction, ManageOrdersReducer, ManageOrdersState,
    OrdersEnvironment, RequestId,
};
use tp_admin_orders::types::{FilterCriteria, ItemId, LineItem, Order, OrderId, OrderStatus};
use tp_admin_orders::view;
use tp_admin_runtime::Store;
use tp_admin_testing::test_clock;

// ============================================================================
// Fixtures
// ============================================================================

type OrdersStore =
    Store<ManageOrdersState, ManageOrdersAction, OrdersEnvironment, ManageOrdersReducer>;

const WAIT: Duration = Duration::from_secs(2);

fn order(id: u64, customer: &str, status: OrderStatus) -> Order {
    Order {
        id: OrderId::from(id),
        customer_name: customer.to_string(),
        date: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
        delivery_address: None,
        time_slot: None,
        status,
        items: vec![LineItem {
            id: ItemId::from(10),
            name: "Widget".to_string(),
            quantity: 2,
            price: "₹50".to_string(),
        }],
    }
}

fn store_with_timeout(api: &MockAdminApi, timeout: Duration) -> OrdersStore {
    let env = OrdersEnvironment::new(Arc::new(api.clone()), Arc::new(test_clock()), timeout);
    Store::new(ManageOrdersState::default(), ManageOrdersReducer::new(), env)
}

fn store(api: &MockAdminApi) -> OrdersStore {
    store_with_timeout(api, WAIT)
}

fn is_fetch_result(action: &ManageOrdersAction) -> bool {
    matches!(
        action,
        ManageOrdersAction::OrdersLoaded { .. } | ManageOrdersAction::OrdersFailed { .. }
    )
}

fn is_update_result(action: &ManageOrdersAction) -> bool {
    matches!(
        action,
        ManageOrdersAction::StatusUpdated { .. } | ManageOrdersAction::StatusUpdateFailed { .. }
    )
}

async fn send_and_settle(store: &OrdersStore, action: ManageOrdersAction) -> ManageOrdersAction {
    store
        .send_and_wait_for(action, is_fetch_result, WAIT)
        .await
        .expect("a fetch result")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn single_pending_order_can_be_advanced_to_processing() {
    let api = MockAdminApi::new(vec![order(1, "Asha", OrderStatus::Pending)]);
    let store = store(&api);

    send_and_settle(&store, ManageOrdersAction::Load).await;

    let rows = store.state(ManageOrdersState::rows).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_label(), "₹100.00");
    assert_eq!(rows[0].action.label, "Mark as Processing");

    store
        .send(ManageOrdersAction::SelectOrder {
            order_id: OrderId::from(1),
        })
        .await
        .unwrap();
    store
        .send_and_wait_for(ManageOrdersAction::ConfirmStatusUpdate, is_update_result, WAIT)
        .await
        .unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(state.orders.len(), 1);
    assert_eq!(state.orders[0].status, OrderStatus::Processing);
    assert_eq!(state.orders[0].items, order(1, "Asha", OrderStatus::Pending).items);
    assert!(state.status_update.is_idle());

    let rows = state.rows();
    assert_eq!(rows[0].action.label, "Mark as Delivered");
    assert_eq!(rows[0].action.proposed, OrderStatus::Delivered);

    assert_eq!(
        api.requests(),
        vec![
            RecordedRequest::FetchOrders(FilterCriteria::default()),
            RecordedRequest::UpdateStatus {
                order_id: OrderId::from(1),
                status: OrderStatus::Processing,
            },
        ]
    );
}

#[tokio::test]
async fn filter_changes_refetch_from_the_server() {
    let api = MockAdminApi::new(vec![
        order(1, "Asha Menon", OrderStatus::Pending),
        order(2, "Ravi Kumar", OrderStatus::Delivered),
        order(3, "Asha Iyer", OrderStatus::Delivered),
    ]);
    let store = store(&api);

    send_and_settle(&store, ManageOrdersAction::Load).await;
    assert_eq!(store.state(|s| s.orders.len()).await, 3);

    send_and_settle(&store, ManageOrdersAction::SetCustomerName("asha".into())).await;
    send_and_settle(&store, ManageOrdersAction::SetStatusFilter(Some(OrderStatus::Delivered))).await;

    let ids: Vec<OrderId> = store
        .state(|s| s.orders.iter().map(|o| o.id.clone()).collect())
        .await;
    assert_eq!(ids, vec![OrderId::from(3)]);

    assert_eq!(
        api.requests().last(),
        Some(&RecordedRequest::FetchOrders(FilterCriteria {
            customer_name: "asha".into(),
            order_id: String::new(),
            status: Some(OrderStatus::Delivered),
        }))
    );
}

#[tokio::test]
async fn superseded_fetch_never_overwrites_newer_data() {
    let api = MockAdminApi::new(vec![
        order(1, "Asha", OrderStatus::Pending),
        order(2, "Ravi", OrderStatus::Delivered),
    ]);
    api.push_latency(Duration::from_millis(300));
    let store = store(&api);

    store.send(ManageOrdersAction::Load).await.unwrap();
    // Let the first fetch reach the backend before superseding it
    tokio::time::sleep(Duration::from_millis(20)).await;
    send_and_settle(&store, ManageOrdersAction::SetStatusFilter(Some(OrderStatus::Delivered))).await;

    // Past the point where the slow, unfiltered response would have landed
    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = store.state(Clone::clone).await;
    assert_eq!(state.latest_request, RequestId::default().next().next());
    assert_eq!(state.load, LoadState::Loaded);
    assert_eq!(state.orders.len(), 1);
    assert_eq!(state.orders[0].status, OrderStatus::Delivered);
    assert_eq!(api.requests().len(), 2);
    assert_eq!(store.cancellable_in_flight(), 0);
}

#[tokio::test]
async fn slow_backend_times_out_into_fetch_error() {
    let api = MockAdminApi::new(vec![order(1, "Asha", OrderStatus::Pending)])
        .with_latency(Duration::from_millis(500));
    let timeout = Duration::from_millis(50);
    let store = store_with_timeout(&api, timeout);

    let result = send_and_settle(&store, ManageOrdersAction::Load).await;

    assert!(matches!(
        result,
        ManageOrdersAction::OrdersFailed {
            error: FetchError::TimedOut(_),
            ..
        }
    ));
    assert_eq!(
        store.state(|s| s.load.clone()).await,
        LoadState::Failed(FetchError::TimedOut(timeout))
    );
    assert!(store.state(view::render).await.starts_with("Error loading orders:"));
}

#[tokio::test]
async fn retry_recovers_from_a_failed_fetch() {
    let api = MockAdminApi::new(vec![order(1, "Asha", OrderStatus::Pending)]);
    api.fail_next(ApiError::Status {
        status: 503,
        body: "maintenance".into(),
    });
    let store = store(&api);

    send_and_settle(&store, ManageOrdersAction::Load).await;
    assert!(matches!(store.state(|s| s.load.clone()).await, LoadState::Failed(_)));
    assert!(store.state(|s| s.orders.is_empty()).await);

    send_and_settle(&store, ManageOrdersAction::Retry).await;
    assert_eq!(store.state(|s| s.load.clone()).await, LoadState::Loaded);
    assert_eq!(store.state(|s| s.orders.len()).await, 1);
}

#[tokio::test]
async fn failed_update_keeps_the_order_set() {
    let api = MockAdminApi::new(vec![order(1, "Asha", OrderStatus::Pending)]);
    let store = store(&api);
    send_and_settle(&store, ManageOrdersAction::Load).await;
    let before = store.state(|s| s.orders.clone()).await;

    api.fail_next(ApiError::RequestFailed("connection reset".into()));
    store
        .send(ManageOrdersAction::SelectOrder {
            order_id: OrderId::from(1),
        })
        .await
        .unwrap();
    let result = store
        .send_and_wait_for(ManageOrdersAction::ConfirmStatusUpdate, is_update_result, WAIT)
        .await
        .unwrap();

    assert!(matches!(result, ManageOrdersAction::StatusUpdateFailed { .. }));
    let state = store.state(Clone::clone).await;
    assert_eq!(state.orders, before);
    assert_eq!(state.load, LoadState::Loaded);
    assert!(state.status_update.is_idle());
    assert!(state.notice.as_ref().is_some_and(|n| n.is_error()));
}

#[tokio::test]
async fn empty_result_shows_no_orders_message() {
    let api = MockAdminApi::new(Vec::new());
    let store = store(&api);

    send_and_settle(&store, ManageOrdersAction::Load).await;

    assert_eq!(store.state(view::render).await, "No orders to display.\n");
}

#[tokio::test]
async fn new_fetch_returns_to_the_first_page() {
    let api = MockAdminApi::new(
        (1..=25)
            .map(|id| order(id, "Asha", OrderStatus::Pending))
            .collect(),
    );
    let store = store(&api);
    send_and_settle(&store, ManageOrdersAction::Load).await;

    store.send(ManageOrdersAction::GoToPage(3)).await.unwrap();
    assert_eq!(store.state(|s| s.visible_orders().len()).await, 5);

    send_and_settle(&store, ManageOrdersAction::SetOrderId("7".into())).await;

    let (page, visible) = store
        .state(|s| (s.pagination.current_page(), s.visible_orders().len()))
        .await;
    assert_eq!(page, 1);
    assert_eq!(visible, 1);
}
