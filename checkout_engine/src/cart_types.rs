use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use scf_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

//--------------------------------------     ProductId       ---------------------------------------------------------
/// A lightweight wrapper around the product reference assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ProductId(pub String);

impl FromStr for ProductId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl<S: Into<String>> From<S> for ProductId {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    IdentityMode     ---------------------------------------------------------
/// Whether the acting shopper has a verified identity. The engine only observes this; issuing and
/// validating credentials is the identity service's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityMode {
    /// No verified identity. Cart state lives in the local store only.
    Anonymous,
    /// A verified identity is present. The remote cart resource is authoritative.
    Authenticated,
}

impl Display for IdentityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityMode::Anonymous => write!(f, "Anonymous"),
            IdentityMode::Authenticated => write!(f, "Authenticated"),
        }
    }
}

//--------------------------------------    ProductInfo      ---------------------------------------------------------
/// The slice of a catalog product the cart core needs: price for subtotals, stock for quantity
/// ceilings, `active` for add-to-cart refusals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Money,
    /// `None` means the catalog does not know; the server is the final authority then.
    pub available_stock: Option<u32>,
    pub minimum_stock: u32,
    pub active: bool,
}

impl ProductInfo {
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            available_stock: self.available_stock,
            minimum_stock: self.minimum_stock,
        }
    }
}

//--------------------------------------   ProductSnapshot   ---------------------------------------------------------
/// Denormalized product data carried on a cart item for display and quantity-ceiling checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub available_stock: Option<u32>,
    pub minimum_stock: u32,
}

//--------------------------------------      CartItem       ---------------------------------------------------------
/// A single line in a cart. Owned exclusively by its cart; at most one item exists per distinct
/// product reference, and `quantity >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time the item entered the cart.
    pub unit_price: Money,
    pub product: Option<ProductSnapshot>,
}

impl CartItem {
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self { product_id, quantity, unit_price, product: None }
    }

    pub fn with_snapshot(mut self, snapshot: ProductSnapshot) -> Self {
        self.product = Some(snapshot);
        self
    }

    pub fn subtotal(&self) -> Money {
        self.unit_price * i64::from(self.quantity)
    }
}

//--------------------------------------        Cart         ---------------------------------------------------------
/// The reconciled cart snapshot. Single-writer (the reconciler), many readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }
}

//--------------------------------------   LocalCartRecord   ---------------------------------------------------------
/// The minimal `(product, quantity)` pair persisted for an anonymous session. Survives reloads;
/// never outlives the first successful login.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LocalCartRecord {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LocalCartRecord {
    pub fn new<P: Into<ProductId>>(product_id: P, quantity: u32) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

//--------------------------------------      Discount       ---------------------------------------------------------
/// The discount a coupon grants. Each variant's fields are statically enforced; the cap only
/// exists for percentage coupons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discount {
    Percentage {
        percent: u8,
        /// Upper bound for the computed discount, if the coupon carries one.
        cap: Option<Money>,
    },
    Fixed {
        amount: Money,
    },
}

//--------------------------------------       Coupon        ---------------------------------------------------------
/// A discount instrument from the offer catalog. Immutable once issued; read-only to this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique, matched case-insensitively.
    pub code: String,
    pub discount: Discount,
    /// The cart total must reach this amount before the coupon qualifies.
    pub min_amount: Money,
    pub expires_at: DateTime<Utc>,
    pub description: Option<String>,
}

//--------------------------------------   AppliedDiscount   ---------------------------------------------------------
/// A coupon that passed validation, together with the amount it takes off the current cart total.
/// At most one of these exists per checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub coupon: Coupon,
    pub amount: Money,
}
