//! # TP Admin Orders
//!
//! The admin console for a small e-commerce operation: search, page through
//! and advance customer orders, and add product listings, against the admin
//! HTTP API.
//!
//! ## Modules
//!
//! - [`types`]: wire model (orders, line items, products, filter criteria)
//! - [`api`]: the [`api::AdminApi`] seam with HTTP and in-memory backends
//! - [`pagination`]: fixed-size paging over the fetched set
//! - [`projection`]: line items flattened into table rows with totals
//! - [`reducer`]: the orders screen state machine
//! - [`products`]: the add-product form
//! - [`view`]: plain-text rendering
//! - [`config`]: environment configuration
//!
//! ## Example
//!
//! ```ignore
//! use tp_admin_orders::{api::MockAdminApi, reducer::*};
//! use tp_admin_runtime::Store;
//!
//! let env = OrdersEnvironment::new(Arc::new(MockAdminApi::seeded()), Arc::new(SystemClock), timeout);
//! let store = Store::new(ManageOrdersState::default(), ManageOrdersReducer::new(), env);
//!
//! store.send_and_wait_for(
//!     ManageOrdersAction::Load,
//!     |a| matches!(a, ManageOrdersAction::OrdersLoaded { .. } | ManageOrdersAction::OrdersFailed { .. }),
//!     timeout,
//! ).await?;
//! println!("{}", store.state(tp_admin_orders::view::render).await);
//! ```

pub mod api;
pub mod config;
pub mod pagination;
pub mod products;
pub mod projection;
pub mod reducer;
pub mod types;
pub mod view;

pub use api::{AdminApi, ApiError, HttpAdminApi, MockAdminApi};
pub use config::{Config, ConfigError};
pub use reducer::{
    ManageOrdersAction, ManageOrdersReducer, ManageOrdersState, OrdersEnvironment,
};
pub use types::{FilterCriteria, Order, OrderId, OrderStatus};
