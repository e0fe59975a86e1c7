use thiserror::Error;

use crate::cart_types::{Coupon, ProductId, ProductInfo};

/// Read-only product lookup. The reconciler uses it for price snapshots and stock ceilings on
/// the anonymous path.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn product_info(&self, product_id: &ProductId) -> Result<ProductInfo, CatalogError>;
}

/// Read-only lookup into the catalog of discount instruments.
#[allow(async_fn_in_trait)]
pub trait CouponCatalog {
    /// Find a coupon by code. Matching is case-insensitive; `Ok(None)` means no such coupon.
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("The catalog service is unavailable: {0}")]
    Unavailable(String),
    #[error("Product {0} does not exist in the catalog")]
    ProductNotFound(ProductId),
}
