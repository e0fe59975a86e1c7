use thiserror::Error;

use crate::cart_types::{Cart, ProductId};

/// The remote cart resource, scoped to the authenticated identity.
///
/// Every mutation returns the server's view of the cart after the change. The reconciler replaces
/// its snapshot with that response wholesale; it never merges computed totals client-side.
#[allow(async_fn_in_trait)]
pub trait CartResource {
    /// Fetch the current cart for the authenticated identity.
    async fn fetch_cart(&self) -> Result<Cart, CartResourceError>;

    /// Add `quantity` of the product to the cart. If the product is already present, the server
    /// accumulates quantities.
    async fn add_item(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, CartResourceError>;

    /// Set the quantity of an existing cart line.
    async fn update_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, CartResourceError>;

    /// Remove the cart line for the product.
    async fn remove_item(&self, product_id: &ProductId) -> Result<Cart, CartResourceError>;

    /// Empty the cart.
    async fn clear(&self) -> Result<(), CartResourceError>;
}

#[derive(Debug, Clone, Error)]
pub enum CartResourceError {
    /// The service could not be reached, or answered with a server-side failure. Treated as
    /// transient by the reconciler.
    #[error("The remote cart service is unavailable: {0}")]
    Unavailable(String),
    /// The server refused the mutation (inactive product, insufficient stock, ...).
    #[error("The remote cart rejected the change for product {0}: {1}")]
    Rejected(ProductId, String),
    /// The product is not in the remote cart.
    #[error("Product {0} is not in the cart")]
    ItemNotFound(ProductId),
    /// No valid credential accompanied the request.
    #[error("No authenticated identity is attached to this session")]
    Unauthenticated,
}
