//! Add-Product form.
//!
//! A single-submission form: fill in the four required fields, submit once,
//! show the outcome. The draft is cleared only after the backend accepts it.

use crate::api::{AdminApi, ApiError};
use crate::types::{CreatedProduct, NewProduct, ProductImage};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tp_admin_core::effect::Effect;
use tp_admin_core::reducer::Reducer;
use tp_admin_core::{async_effect, smallvec, SmallVec};

/// Whether a submission is in flight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormPhase {
    /// Accepting edits
    #[default]
    Editing,
    /// Waiting for the backend
    Submitting,
}

/// Outcome shown under the form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMessage {
    /// The backend stored the product
    Added {
        /// Name echoed by the backend
        name: String,
    },
    /// The backend rejected the product (non-2xx)
    Rejected,
    /// The request never completed
    Error(String),
    /// Submit was attempted with required fields empty
    MissingFields(Vec<&'static str>),
}

impl FormMessage {
    /// Whether this message reports a failure
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Added { .. })
    }
}

impl fmt::Display for FormMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { name } => write!(f, "Product added successfully: {name}"),
            Self::Rejected => f.write_str("Failed to add product"),
            Self::Error(message) => write!(f, "Error: {message}"),
            Self::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            },
        }
    }
}

/// Draft product and submission outcome
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFormState {
    /// Product name
    pub name: String,
    /// Description
    pub description: String,
    /// Price as typed
    pub price: String,
    /// Chosen image
    pub image: Option<ProductImage>,
    /// Submission phase
    pub phase: FormPhase,
    /// Outcome of the last submit
    pub message: Option<FormMessage>,
}

impl ProductFormState {
    /// Names of the required fields that are still empty
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.trim().is_empty()),
            ("description", self.description.trim().is_empty()),
            ("price", self.price.trim().is_empty()),
            ("image", self.image.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, missing)| missing.then_some(field))
        .collect()
    }

    /// The draft as a submittable product, if complete
    #[must_use]
    pub fn to_product(&self) -> Option<NewProduct> {
        let image = self.image.clone()?;
        self.missing_fields().is_empty().then(|| NewProduct {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.trim().to_string(),
            image,
        })
    }
}

/// Inputs of the product form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductFormAction {
    /// Edit the name
    SetName(String),
    /// Edit the description
    SetDescription(String),
    /// Edit the price
    SetPrice(String),
    /// Choose the image
    SetImage(ProductImage),
    /// Submit the draft
    Submit,
    /// The backend stored the product
    ProductAdded {
        /// Product as echoed back
        product: CreatedProduct,
    },
    /// Submission failed
    ProductFailed {
        /// What went wrong
        error: ApiError,
    },
}

/// Dependencies of [`ProductFormReducer`]
#[derive(Clone)]
pub struct ProductsEnvironment {
    /// Admin backend
    pub api: Arc<dyn AdminApi>,
    /// Upper bound on the upload
    pub request_timeout: Duration,
}

impl ProductsEnvironment {
    /// Creates a new `ProductsEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn AdminApi>, request_timeout: Duration) -> Self {
        Self {
            api,
            request_timeout,
        }
    }
}

/// Reducer for the product form
#[derive(Clone, Debug, Default)]
pub struct ProductFormReducer;

impl ProductFormReducer {
    /// Creates a new `ProductFormReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for ProductFormReducer {
    type State = ProductFormState;
    type Action = ProductFormAction;
    type Environment = ProductsEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ProductFormAction::SetName(name) => state.name = name,
            ProductFormAction::SetDescription(description) => state.description = description,
            ProductFormAction::SetPrice(price) => state.price = price,
            ProductFormAction::SetImage(image) => state.image = Some(image),

            ProductFormAction::Submit => {
                if state.phase == FormPhase::Submitting {
                    return SmallVec::new();
                }
                let Some(product) = state.to_product() else {
                    state.message = Some(FormMessage::MissingFields(state.missing_fields()));
                    return SmallVec::new();
                };

                metrics::counter!("products.submitted").increment(1);
                tracing::info!(name = %product.name, "Submitting product");
                state.phase = FormPhase::Submitting;
                state.message = None;

                let api = Arc::clone(&env.api);
                let timeout = env.request_timeout;
                return smallvec![async_effect! {
                    match tokio::time::timeout(timeout, api.add_product(product)).await {
                        Ok(Ok(product)) => Some(ProductFormAction::ProductAdded { product }),
                        Ok(Err(error)) => Some(ProductFormAction::ProductFailed { error }),
                        Err(_) => Some(ProductFormAction::ProductFailed { error: ApiError::Timeout }),
                    }
                }];
            },

            ProductFormAction::ProductAdded { product } => {
                tracing::info!(name = %product.name, "Product added");
                *state = ProductFormState {
                    message: Some(FormMessage::Added { name: product.name }),
                    ..ProductFormState::default()
                };
            },

            ProductFormAction::ProductFailed { error } => {
                tracing::warn!(%error, "Product submission failed");
                state.phase = FormPhase::Editing;
                state.message = Some(if error.is_status() {
                    FormMessage::Rejected
                } else {
                    FormMessage::Error(error.to_string())
                });
            },
        }

        SmallVec::new()
    }
}
