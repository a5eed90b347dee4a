//! # TP Admin Core
//!
//! Core traits and types for the TP Admin console.
//!
//! The console is built as a set of small state machines. Each screen owns an
//! explicit state value, every change to that state goes through a named
//! action, and all I/O is described as data and executed elsewhere.
//!
//! ## Core Concepts
//!
//! - **State**: The view state for a feature (orders table, product form)
//! - **Action**: All possible inputs to a reducer (operator intents and API results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use tp_admin_core::*;
//!
//! #[derive(Clone, Debug, Default)]
//! struct FormState {
//!     message: Option<String>,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum FormAction {
//!     Submit,
//!     Submitted { name: String },
//! }
//!
//! impl Reducer for FormReducer {
//!     type State = FormState;
//!     type Action = FormAction;
//!     type Environment = FormEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut FormState,
//!         action: FormAction,
//!         env: &FormEnvironment,
//!     ) -> SmallVec<[Effect<FormAction>; 4]> {
//!         match action {
//!             FormAction::Submit => smallvec![async_effect! {
//!                 Some(FormAction::Submitted { name: "Widget".to_string() })
//!             }],
//!             FormAction::Submitted { name } => {
//!                 state.message = Some(format!("Added {name}"));
//!                 smallvec![Effect::None]
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for view logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all state transitions and are deterministic and testable
/// without a runtime, a network, or a terminal.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for view logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The view state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for OrdersReducer {
    ///     type State = OrdersState;
    ///     type Action = OrdersAction;
    ///     type Environment = OrdersEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut OrdersState,
    ///         action: OrdersAction,
    ///         env: &OrdersEnvironment,
    ///     ) -> SmallVec<[Effect<OrdersAction>; 4]> {
    ///         match action {
    ///             OrdersAction::NextPage => {
    ///                 state.page += 1;
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime. Most actions produce a
        /// single effect, so the inline capacity avoids heap allocation.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier for a group of cancellable effects
    ///
    /// At most one effect runs per id: starting a new
    /// [`Effect::Cancellable`] with an id that is still in flight aborts the
    /// earlier one.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The id as a string slice
        #[must_use]
        pub const fn as_str(&self) -> &'static str {
            self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts, debouncing)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run `effect` under a cancellation id
        ///
        /// Any effect still running under the same id is aborted first, so the
        /// latest request always wins. Only `Future` and `Delay` effects can be
        /// aborted once started.
        Cancellable {
            /// Cancellation group
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Abort whatever is running under `id` (no-op if nothing is)
        Cancel {
            /// Cancellation group to abort
            id: EffectId,
        },
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> fmt::Debug for Effect<Action>
    where
        Action: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel { id } => {
                    f.debug_struct("Effect::Cancel").field("id", id).finish()
                },
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
