//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for API calls whose result is fed back into the reducer.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use tp_admin_core::async_effect;
///
/// async_effect! {
///     match api.fetch_orders(criteria).await {
///         Ok(orders) => Some(ManageOrdersAction::OrdersLoaded { request, orders }),
///         Err(error) => Some(ManageOrdersAction::OrdersFailed { request, error: error.into() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Cancellable` around an async block
///
/// Starting a new effect with the same id aborts the one still in flight.
///
/// # Example
///
/// ```rust,ignore
/// use tp_admin_core::cancellable;
///
/// cancellable! {
///     id: FETCH_ORDERS,
///     async {
///         match api.fetch_orders(criteria).await {
///             Ok(orders) => Some(ManageOrdersAction::OrdersLoaded { request, orders }),
///             Err(error) => Some(ManageOrdersAction::OrdersFailed { request, error: error.into() }),
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        async { $($body:tt)* }
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($crate::async_effect! { $($body)* }),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::{Effect, EffectId};

    #[derive(Clone, Debug)]
    enum TestAction {
        AsyncResult { value: i32 },
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::AsyncResult { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[test]
    fn test_cancellable_macro() {
        let effect = cancellable! {
            id: EffectId::new("orders.fetch"),
            async { Some(TestAction::AsyncResult { value: 7 }) }
        };

        assert!(matches!(
            effect,
            Effect::Cancellable { ref id, ref effect }
                if id.as_str() == "orders.fetch" && matches!(**effect, Effect::Future(_))
        ));
    }

    #[tokio::test]
    async fn async_effect_yields_action() {
        let Effect::Future(fut) = async_effect!(Some(TestAction::AsyncResult { value: 3 })) else {
            unreachable!("async_effect! always builds a Future");
        };

        assert!(matches!(fut.await, Some(TestAction::AsyncResult { value: 3 })));
    }
}
