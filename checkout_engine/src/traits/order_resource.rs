use thiserror::Error;

use crate::order_objects::{NewOrderRequest, Order};

/// The remote order service.
#[allow(async_fn_in_trait)]
pub trait OrderResource {
    /// Create an order from the authenticated cart and the given request.
    ///
    /// This is the single irreversible boundary of the engine: once it succeeds, the cart is
    /// cleared on both stores and the checkout session is discarded. It is never retried
    /// automatically.
    async fn create(&self, request: &NewOrderRequest) -> Result<Order, OrderResourceError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderResourceError {
    #[error("The order service is unavailable: {0}")]
    Unavailable(String),
    /// The service refused the request (missing proof of payment, empty remote cart, ...).
    #[error("The order was rejected: {0}")]
    Rejected(String),
    #[error("No authenticated identity is attached to this session")]
    Unauthenticated,
}
