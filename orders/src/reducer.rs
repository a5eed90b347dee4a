//! Manage-Orders view state.
//!
//! One reducer owns the whole orders screen:
//!
//! - **Fetcher**: every load is tagged with a fresh [`RequestId`] and issued
//!   as a cancellable effect, so starting a new fetch aborts the previous one
//!   and any late result carrying an older id is discarded.
//! - **Filters**: changing a criterion moves the screen back to
//!   [`LoadState::Loading`] and refetches; nothing is filtered client side.
//! - **Pagination**: page navigation over the fetched set, reset to page 1
//!   by every successful fetch.
//! - **Status updates**: `Idle → Selected → Submitting → Idle`; a successful
//!   update patches the one matching order in place.

use crate::api::{AdminApi, ApiError};
use crate::pagination::Pagination;
use crate::projection::{project_rows, OrderRow};
use crate::types::{FilterCriteria, Order, OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tp_admin_core::effect::{Effect, EffectId};
use tp_admin_core::environment::Clock;
use tp_admin_core::reducer::Reducer;
use tp_admin_core::{async_effect, cancellable, smallvec, SmallVec};

/// Cancellation group shared by all order fetches
pub const FETCH_ORDERS: EffectId = EffectId::new("orders.fetch");

// ============================================================================
// Errors
// ============================================================================

/// Why a fetch produced no order set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure or non-2xx response
    #[error("{0}")]
    Api(#[from] ApiError),

    /// No response within the configured timeout
    #[error("no response within {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Why a status update was not applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// Transport failure or non-2xx response
    #[error("{0}")]
    Api(#[from] ApiError),

    /// No response within the configured timeout
    #[error("no response within {}s", .0.as_secs())]
    TimedOut(Duration),
}

// ============================================================================
// State
// ============================================================================

/// Monotonic tag of an issued fetch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// The id following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw sequence number
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the current order set
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// A fetch is in flight; neither orders nor an error are shown
    Loading,
    /// The last fetch succeeded
    Loaded,
    /// The last fetch failed; shown instead of the table until the next fetch
    Failed(FetchError),
}

/// The single-order status transition workflow
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum StatusUpdate {
    /// Nothing selected
    #[default]
    Idle,
    /// Operator picked a row; awaiting confirmation
    Selected {
        /// Target order
        order_id: OrderId,
        /// Status that confirming will request
        proposed: OrderStatus,
    },
    /// Request in flight; further selections and confirmations are ignored
    Submitting {
        /// Target order
        order_id: OrderId,
        /// Requested status
        proposed: OrderStatus,
    },
}

impl StatusUpdate {
    /// Whether no update is pending
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether an update awaits confirmation
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        matches!(self, Self::Selected { .. })
    }

    /// Whether an update request is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    /// Target order and proposed status, unless idle
    #[must_use]
    pub const fn pending(&self) -> Option<(&OrderId, OrderStatus)> {
        match self {
            Self::Idle => None,
            Self::Selected { order_id, proposed } | Self::Submitting { order_id, proposed } => {
                Some((order_id, *proposed))
            },
        }
    }
}

/// Outcome message of the last status update
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The update was applied
    StatusUpdated {
        /// Updated order
        order_id: OrderId,
        /// Its new status
        status: OrderStatus,
    },
    /// The update failed; the order set is unchanged
    UpdateFailed {
        /// Target order
        order_id: OrderId,
        /// What went wrong
        error: UpdateError,
    },
}

impl Notice {
    /// Whether this notice reports a failure
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusUpdated { order_id, status } => {
                write!(f, "Order {order_id} marked as {status}")
            },
            Self::UpdateFailed { order_id, error } => {
                write!(f, "Failed to update order {order_id}: {error}")
            },
        }
    }
}

/// Everything the orders screen shows
#[derive(Clone, Debug, PartialEq)]
pub struct ManageOrdersState {
    /// Active search constraints
    pub criteria: FilterCriteria,
    /// Lifecycle of `orders`
    pub load: LoadState,
    /// Order set from the latest successful fetch, patched by status updates
    pub orders: Vec<Order>,
    /// Paging over `orders`
    pub pagination: Pagination,
    /// Status transition workflow
    pub status_update: StatusUpdate,
    /// Id of the most recently issued fetch
    pub latest_request: RequestId,
    /// Outcome of the last status update
    pub notice: Option<Notice>,
    /// When `orders` was last replaced
    pub last_loaded_at: Option<DateTime<Utc>>,
}

impl Default for ManageOrdersState {
    fn default() -> Self {
        Self::new(crate::pagination::DEFAULT_PAGE_SIZE)
    }
}

impl ManageOrdersState {
    /// Fresh screen with no criteria, waiting for its first fetch
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self::with_criteria(page_size, FilterCriteria::default())
    }

    /// Fresh screen whose first fetch uses `criteria`
    #[must_use]
    pub fn with_criteria(page_size: usize, criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            load: LoadState::Loading,
            orders: Vec::new(),
            pagination: Pagination::new(page_size),
            status_update: StatusUpdate::Idle,
            latest_request: RequestId::default(),
            notice: None,
            last_loaded_at: None,
        }
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading)
    }

    /// Orders on the current page
    #[must_use]
    pub fn visible_orders(&self) -> &[Order] {
        self.pagination.visible(&self.orders)
    }

    /// Table rows for the current page
    #[must_use]
    pub fn rows(&self) -> Vec<OrderRow> {
        project_rows(self.visible_orders())
    }

    /// Number of pages over the current set
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.orders.len())
    }

    /// Order with `order_id`, if loaded
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == order_id)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs of the orders screen: operator intents and API results
#[derive(Clone, Debug, PartialEq)]
pub enum ManageOrdersAction {
    /// Fetch with the current criteria (screen opened)
    Load,
    /// Fetch again after a failure
    Retry,
    /// Change the customer-name filter
    SetCustomerName(String),
    /// Change the order-id filter
    SetOrderId(String),
    /// Change the status filter
    SetStatusFilter(Option<OrderStatus>),
    /// A fetch succeeded
    OrdersLoaded {
        /// Fetch this result belongs to
        request: RequestId,
        /// Orders returned by the server
        orders: Vec<Order>,
    },
    /// A fetch failed
    OrdersFailed {
        /// Fetch this result belongs to
        request: RequestId,
        /// What went wrong
        error: FetchError,
    },
    /// Jump to a page (rejected when out of range)
    GoToPage(usize),
    /// Next page
    NextPage,
    /// Previous page
    PrevPage,
    /// Operator clicked a row's status action
    SelectOrder {
        /// Order on that row
        order_id: OrderId,
    },
    /// Operator abandoned the pending selection
    CancelSelection,
    /// Operator confirmed the pending selection
    ConfirmStatusUpdate,
    /// The server applied a status update
    StatusUpdated {
        /// The order as stored after the update
        order: Order,
    },
    /// A status update failed
    StatusUpdateFailed {
        /// Target order
        order_id: OrderId,
        /// What went wrong
        error: UpdateError,
    },
    /// Clear the status update notice
    DismissNotice,
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of [`ManageOrdersReducer`]
#[derive(Clone)]
pub struct OrdersEnvironment {
    /// Admin backend
    pub api: Arc<dyn AdminApi>,
    /// Clock for load timestamps
    pub clock: Arc<dyn Clock>,
    /// Upper bound on every API call
    pub request_timeout: Duration,
}

impl OrdersEnvironment {
    /// Creates a new `OrdersEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn AdminApi>, clock: Arc<dyn Clock>, request_timeout: Duration) -> Self {
        Self {
            api,
            clock,
            request_timeout,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the orders screen
#[derive(Clone, Debug, Default)]
pub struct ManageOrdersReducer;

impl ManageOrdersReducer {
    /// Creates a new `ManageOrdersReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Start a fetch with the current criteria, superseding any in flight
    fn begin_fetch(
        state: &mut ManageOrdersState,
        env: &OrdersEnvironment,
    ) -> SmallVec<[Effect<ManageOrdersAction>; 4]> {
        let request = state.latest_request.next();
        state.latest_request = request;
        state.load = LoadState::Loading;

        metrics::counter!("orders.fetch.started").increment(1);
        tracing::info!(%request, criteria = ?state.criteria, "Fetching orders");

        let api = Arc::clone(&env.api);
        let criteria = state.criteria.clone();
        let timeout = env.request_timeout;

        smallvec![cancellable! {
            id: FETCH_ORDERS,
            async {
                match tokio::time::timeout(timeout, api.fetch_orders(criteria)).await {
                    Ok(Ok(orders)) => Some(ManageOrdersAction::OrdersLoaded { request, orders }),
                    Ok(Err(error)) => Some(ManageOrdersAction::OrdersFailed {
                        request,
                        error: FetchError::Api(error),
                    }),
                    Err(_) => Some(ManageOrdersAction::OrdersFailed {
                        request,
                        error: FetchError::TimedOut(timeout),
                    }),
                }
            }
        }]
    }

    /// Whether a fetch result belongs to the latest request
    fn is_current(state: &ManageOrdersState, request: RequestId) -> bool {
        if request == state.latest_request {
            return true;
        }
        metrics::counter!("orders.fetch.stale_discarded").increment(1);
        tracing::debug!(%request, latest = %state.latest_request, "Discarding stale fetch result");
        false
    }

    fn submit_update(
        order_id: OrderId,
        proposed: OrderStatus,
        env: &OrdersEnvironment,
    ) -> Effect<ManageOrdersAction> {
        let api = Arc::clone(&env.api);
        let timeout = env.request_timeout;

        async_effect! {
            match tokio::time::timeout(timeout, api.update_status(order_id.clone(), proposed)).await {
                Ok(Ok(order)) => Some(ManageOrdersAction::StatusUpdated { order }),
                Ok(Err(error)) => Some(ManageOrdersAction::StatusUpdateFailed {
                    order_id,
                    error: UpdateError::Api(error),
                }),
                Err(_) => Some(ManageOrdersAction::StatusUpdateFailed {
                    order_id,
                    error: UpdateError::TimedOut(timeout),
                }),
            }
        }
    }
}

impl Reducer for ManageOrdersReducer {
    type State = ManageOrdersState;
    type Action = ManageOrdersAction;
    type Environment = OrdersEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per screen transition
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Fetcher ==========
            ManageOrdersAction::Load | ManageOrdersAction::Retry => Self::begin_fetch(state, env),

            ManageOrdersAction::OrdersLoaded { request, orders } => {
                if !Self::is_current(state, request) {
                    return SmallVec::new();
                }

                tracing::info!(%request, count = orders.len(), "Orders loaded");
                state.orders = orders;
                state.load = LoadState::Loaded;
                state.pagination.reset();
                state.last_loaded_at = Some(env.clock.now());

                // A surviving selection proposes the step after the refetched status
                if let StatusUpdate::Selected { order_id, .. } = &state.status_update {
                    state.status_update = match state.order(order_id) {
                        Some(order) => StatusUpdate::Selected {
                            order_id: order.id.clone(),
                            proposed: order.status.proposed_next(),
                        },
                        None => StatusUpdate::Idle,
                    };
                }
                SmallVec::new()
            },

            ManageOrdersAction::OrdersFailed { request, error } => {
                if !Self::is_current(state, request) {
                    return SmallVec::new();
                }

                metrics::counter!("orders.fetch.failed").increment(1);
                tracing::warn!(%request, %error, "Order fetch failed");
                state.orders.clear();
                state.pagination.reset();
                state.load = LoadState::Failed(error);
                if state.status_update.is_selected() {
                    state.status_update = StatusUpdate::Idle;
                }
                SmallVec::new()
            },

            // ========== Filters ==========
            ManageOrdersAction::SetCustomerName(customer_name) => {
                if state.criteria.customer_name == customer_name {
                    return SmallVec::new();
                }
                state.criteria.customer_name = customer_name;
                Self::begin_fetch(state, env)
            },

            ManageOrdersAction::SetOrderId(order_id) => {
                if state.criteria.order_id == order_id {
                    return SmallVec::new();
                }
                state.criteria.order_id = order_id;
                Self::begin_fetch(state, env)
            },

            ManageOrdersAction::SetStatusFilter(status) => {
                if state.criteria.status == status {
                    return SmallVec::new();
                }
                state.criteria.status = status;
                Self::begin_fetch(state, env)
            },

            // ========== Pagination ==========
            ManageOrdersAction::GoToPage(page) => {
                if !state.pagination.go_to(page, state.orders.len()) {
                    tracing::debug!(page, pages = state.page_count(), "Rejected out-of-range page");
                }
                SmallVec::new()
            },

            ManageOrdersAction::NextPage => {
                state.pagination.next(state.orders.len());
                SmallVec::new()
            },

            ManageOrdersAction::PrevPage => {
                state.pagination.prev();
                SmallVec::new()
            },

            // ========== Status updates ==========
            ManageOrdersAction::SelectOrder { order_id } => {
                if state.status_update.is_submitting() {
                    tracing::debug!(%order_id, "Selection ignored while an update is in flight");
                    return SmallVec::new();
                }
                let Some(order) = state.order(&order_id) else {
                    tracing::warn!(%order_id, "Selected order is not in the current set");
                    return SmallVec::new();
                };

                let proposed = order.status.proposed_next();
                tracing::debug!(%order_id, %proposed, "Order selected");
                state.status_update = StatusUpdate::Selected { order_id, proposed };
                SmallVec::new()
            },

            ManageOrdersAction::CancelSelection => {
                if state.status_update.is_selected() {
                    state.status_update = StatusUpdate::Idle;
                }
                SmallVec::new()
            },

            ManageOrdersAction::ConfirmStatusUpdate => {
                let StatusUpdate::Selected { order_id, proposed } = state.status_update.clone()
                else {
                    tracing::debug!("Nothing selected to confirm");
                    return SmallVec::new();
                };

                metrics::counter!("orders.status_update.submitted").increment(1);
                tracing::info!(%order_id, %proposed, "Submitting status update");
                state.status_update = StatusUpdate::Submitting {
                    order_id: order_id.clone(),
                    proposed,
                };
                state.notice = None;
                smallvec![Self::submit_update(order_id, proposed, env)]
            },

            ManageOrdersAction::StatusUpdated { order } => {
                tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");
                state.notice = Some(Notice::StatusUpdated {
                    order_id: order.id.clone(),
                    status: order.status,
                });
                if let Some(existing) = state.orders.iter_mut().find(|o| o.id == order.id) {
                    *existing = order;
                }
                state.status_update = StatusUpdate::Idle;
                SmallVec::new()
            },

            ManageOrdersAction::StatusUpdateFailed { order_id, error } => {
                metrics::counter!("orders.status_update.failed").increment(1);
                tracing::warn!(%order_id, %error, "Status update failed");
                state.notice = Some(Notice::UpdateFailed { order_id, error });
                state.status_update = StatusUpdate::Idle;
                SmallVec::new()
            },

            ManageOrdersAction::DismissNotice => {
                state.notice = None;
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::api::MockAdminApi;
    use crate::types::{ItemId, LineItem};
    use chrono::TimeZone;
    use tp_admin_testing::{assertions, test_clock, ReducerTest};

    fn env() -> OrdersEnvironment {
        OrdersEnvironment::new(
            Arc::new(MockAdminApi::default()),
            Arc::new(test_clock()),
            Duration::from_secs(5),
        )
    }

    fn order(id: u64, status: OrderStatus) -> Order {
        Order {
            id: OrderId::from(id),
            customer_name: format!("Customer {id}"),
            date: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
            delivery_address: None,
            time_slot: None,
            status,
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
        state.latest_request = RequestId(1);
        state.load = LoadState::Loaded;
        state.orders = orders;
        state
    }

    #[test]
    fn load_issues_a_cancellable_fetch() {
        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(ManageOrdersState::default())
            .when_action(ManageOrdersAction::Load)
            .then_state(|state| {
                assert!(state.is_loading());
                assert_eq!(state.latest_request, RequestId(1));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_cancellable_effect(effects, &FETCH_ORDERS);
            })
            .run();
    }

    #[test]
    fn filter_change_refetches_and_same_value_does_not() {
        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(loaded(vec![order(1, OrderStatus::Pending)]))
            .when_action(ManageOrdersAction::SetCustomerName("asha".into()))
            .then_state(|state| {
                assert_eq!(state.criteria.customer_name, "asha");
                assert!(state.is_loading());
                assert_eq!(state.latest_request, RequestId(2));
            })
            .then_effects(|effects| {
                assertions::assert_has_cancellable_effect(effects, &FETCH_ORDERS);
            })
            .run();

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(loaded(vec![order(1, OrderStatus::Pending)]))
            .when_action(ManageOrdersAction::SetStatusFilter(None))
            .then_state(|state| {
                assert_eq!(state.load, LoadState::Loaded);
                assert_eq!(state.latest_request, RequestId(1));
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn successful_fetch_replaces_orders_and_resets_page() {
        let mut state = loaded((1..=25).map(|id| order(id, OrderStatus::Pending)).collect());
        state.pagination.go_to(3, 25);
        state.load = LoadState::Loading;
        state.latest_request = RequestId(4);

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(ManageOrdersAction::OrdersLoaded {
                request: RequestId(4),
                orders: vec![order(7, OrderStatus::Processing)],
            })
            .then_state(|state| {
                assert_eq!(state.load, LoadState::Loaded);
                assert_eq!(state.orders.len(), 1);
                assert_eq!(state.pagination.current_page(), 1);
                assert_eq!(state.last_loaded_at, Some(test_clock().now()));
            })
            .run();
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut state = loaded(vec![order(1, OrderStatus::Pending)]);
        state.latest_request = RequestId(3);
        state.load = LoadState::Loading;

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_actions([
                ManageOrdersAction::OrdersLoaded {
                    request: RequestId(2),
                    orders: Vec::new(),
                },
                ManageOrdersAction::OrdersFailed {
                    request: RequestId(1),
                    error: FetchError::TimedOut(Duration::from_secs(5)),
                },
            ])
            .then_state(|state| {
                assert!(state.is_loading());
                assert_eq!(state.orders.len(), 1);
            })
            .run();
    }

    #[test]
    fn failed_fetch_shows_error_instead_of_orders() {
        let mut state = loaded(vec![order(1, OrderStatus::Pending)]);
        state.load = LoadState::Loading;
        let error = FetchError::Api(ApiError::Status {
            status: 500,
            body: "boom".into(),
        });

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(ManageOrdersAction::OrdersFailed {
                request: RequestId(1),
                error: error.clone(),
            })
            .then_state(move |state| {
                assert_eq!(state.load, LoadState::Failed(error));
                assert!(state.orders.is_empty());
            })
            .run();
    }

    #[test]
    fn page_navigation_respects_bounds() {
        let state = loaded((1..=25).map(|id| order(id, OrderStatus::Pending)).collect());

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_actions([
                ManageOrdersAction::NextPage,
                ManageOrdersAction::NextPage,
                ManageOrdersAction::NextPage,
                ManageOrdersAction::GoToPage(9),
            ])
            .then_state(|state| {
                assert_eq!(state.pagination.current_page(), 3);
                assert_eq!(state.visible_orders().len(), 5);
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn selecting_proposes_the_next_status() {
        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(loaded(vec![
                order(1, OrderStatus::Pending),
                order(2, OrderStatus::Processing),
            ]))
            .when_action(ManageOrdersAction::SelectOrder {
                order_id: OrderId::from(2),
            })
            .then_state(|state| {
                assert_eq!(
                    state.status_update,
                    StatusUpdate::Selected {
                        order_id: OrderId::from(2),
                        proposed: OrderStatus::Delivered,
                    }
                );
            })
            .run();
    }

    #[test]
    fn a_later_selection_replaces_an_unconfirmed_one() {
        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(loaded(vec![
                order(1, OrderStatus::Pending),
                order(2, OrderStatus::Processing),
            ]))
            .when_actions([
                ManageOrdersAction::SelectOrder { order_id: OrderId::from(2) },
                ManageOrdersAction::SelectOrder { order_id: OrderId::from(1) },
            ])
            .then_state(|state| {
                assert_eq!(
                    state.status_update.pending(),
                    Some((&OrderId::from(1), OrderStatus::Processing))
                );
            })
            .run();
    }

    #[test]
    fn unknown_orders_cannot_be_selected() {
        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(loaded(vec![order(1, OrderStatus::Pending)]))
            .when_action(ManageOrdersAction::SelectOrder {
                order_id: OrderId::from(99),
            })
            .then_state(|state| assert!(state.status_update.is_idle()))
            .run();
    }

    #[test]
    fn confirm_submits_once() {
        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(loaded(vec![order(1, OrderStatus::Pending)]))
            .when_actions([
                ManageOrdersAction::SelectOrder { order_id: OrderId::from(1) },
                ManageOrdersAction::ConfirmStatusUpdate,
            ])
            .then_state(|state| {
                assert!(state.status_update.is_submitting());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();

        let mut submitting = loaded(vec![order(1, OrderStatus::Pending), order(2, OrderStatus::Pending)]);
        submitting.status_update = StatusUpdate::Submitting {
            order_id: OrderId::from(1),
            proposed: OrderStatus::Processing,
        };

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(submitting)
            .when_actions([
                ManageOrdersAction::SelectOrder { order_id: OrderId::from(2) },
                ManageOrdersAction::ConfirmStatusUpdate,
            ])
            .then_state(|state| {
                assert_eq!(
                    state.status_update.pending(),
                    Some((&OrderId::from(1), OrderStatus::Processing))
                );
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn successful_update_patches_only_the_matching_order() {
        let mut state = loaded(vec![order(1, OrderStatus::Pending), order(2, OrderStatus::Pending)]);
        state.status_update = StatusUpdate::Submitting {
            order_id: OrderId::from(1),
            proposed: OrderStatus::Processing,
        };

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(ManageOrdersAction::StatusUpdated {
                order: order(1, OrderStatus::Processing),
            })
            .then_state(|state| {
                assert_eq!(state.orders[0].status, OrderStatus::Processing);
                assert_eq!(state.orders[1].status, OrderStatus::Pending);
                assert!(state.status_update.is_idle());
                assert_eq!(state.load, LoadState::Loaded);

                let rows = state.rows();
                assert_eq!(rows[0].action.label, "Mark as Delivered");
                assert_eq!(
                    state.notice.as_ref().map(ToString::to_string).as_deref(),
                    Some("Order 1 marked as Processing")
                );
            })
            .run();
    }

    #[test]
    fn failed_update_leaves_orders_untouched() {
        let mut state = loaded(vec![order(1, OrderStatus::Pending)]);
        state.status_update = StatusUpdate::Submitting {
            order_id: OrderId::from(1),
            proposed: OrderStatus::Processing,
        };
        let before = state.orders.clone();

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(ManageOrdersAction::StatusUpdateFailed {
                order_id: OrderId::from(1),
                error: UpdateError::Api(ApiError::RequestFailed("connection refused".into())),
            })
            .then_state(move |state| {
                assert_eq!(state.orders, before);
                assert!(state.status_update.is_idle());
                assert_eq!(state.load, LoadState::Loaded);
                assert!(state.notice.as_ref().is_some_and(Notice::is_error));
            })
            .run();
    }

    #[test]
    fn cancel_returns_to_idle() {
        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(loaded(vec![order(1, OrderStatus::Pending)]))
            .when_actions([
                ManageOrdersAction::SelectOrder { order_id: OrderId::from(1) },
                ManageOrdersAction::CancelSelection,
                ManageOrdersAction::ConfirmStatusUpdate,
            ])
            .then_state(|state| assert!(state.status_update.is_idle()))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn refetch_drops_a_selection_whose_order_disappeared() {
        let mut state = loaded(vec![order(1, OrderStatus::Pending)]);
        state.status_update = StatusUpdate::Selected {
            order_id: OrderId::from(1),
            proposed: OrderStatus::Processing,
        };
        state.latest_request = RequestId(2);

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(ManageOrdersAction::OrdersLoaded {
                request: RequestId(2),
                orders: vec![order(2, OrderStatus::Pending)],
            })
            .then_state(|state| assert!(state.status_update.is_idle()))
            .run();
    }

    #[test]
    fn refetch_recomputes_the_proposal_of_a_surviving_selection() {
        let mut state = loaded(vec![order(1, OrderStatus::Pending)]);
        state.status_update = StatusUpdate::Selected {
            order_id: OrderId::from(1),
            proposed: OrderStatus::Processing,
        };
        state.latest_request = RequestId(2);

        ReducerTest::new(ManageOrdersReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(ManageOrdersAction::OrdersLoaded {
                request: RequestId(2),
                orders: vec![order(1, OrderStatus::Processing)],
            })
            .then_state(|state| {
                assert_eq!(
                    state.status_update,
                    StatusUpdate::Selected {
                        order_id: OrderId::from(1),
                        proposed: OrderStatus::Delivered,
                    }
                );
            })
            .run();
    }
}
