use thiserror::Error;

use crate::order_objects::{AddressId, ShippingAddress};

/// The remote address book for the authenticated account.
#[allow(async_fn_in_trait)]
pub trait AddressResource {
    /// Persist the address as the account's primary shipping address, returning its identifier.
    ///
    /// Checkout calls this as phase one of order submission. A persisted address is never rolled
    /// back, even if the subsequent order creation fails.
    async fn save_primary(&self, address: &ShippingAddress) -> Result<AddressId, AddressResourceError>;
}

#[derive(Debug, Clone, Error)]
pub enum AddressResourceError {
    #[error("The address service is unavailable: {0}")]
    Unavailable(String),
    #[error("The address was rejected: {0}")]
    Rejected(String),
    #[error("No authenticated identity is attached to this session")]
    Unauthenticated,
}
