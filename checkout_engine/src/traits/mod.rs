//! # Remote collaborator contracts.
//!
//! This module defines the interface contracts of the services the checkout core talks to. The
//! engine is provider-agnostic: any host that can satisfy these traits (an HTTP client, a gRPC
//! client, an in-process fake) can drive the cart and checkout flows.
//!
//! * [`CartResource`] is the server-side cart scoped to the authenticated identity. It is the
//!   single source of truth while a shopper is logged in; every mutation returns the server's
//!   authoritative cart snapshot.
//! * [`AddressResource`] persists shipping addresses. Checkout's submission flow uses it for
//!   phase one of the two-phase order creation.
//! * [`OrderResource`] creates orders. Its `create` call is the single irreversible boundary of
//!   the whole engine.
//! * [`ProductCatalog`] and [`CouponCatalog`] are read-only lookups for prices, stock levels and
//!   discount instruments.
mod address_resource;
mod cart_resource;
mod catalogs;
mod order_resource;

pub use address_resource::{AddressResource, AddressResourceError};
pub use cart_resource::{CartResource, CartResourceError};
pub use catalogs::{CatalogError, CouponCatalog, ProductCatalog};
pub use order_resource::{OrderResource, OrderResourceError};
