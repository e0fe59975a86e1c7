//! Storefront Checkout Engine
//!
//! This library is the cart reconciliation and checkout orchestration core of the storefront. It
//! keeps a shopping cart consistent across an anonymous (locally persisted) session and an
//! authenticated (server persisted) session, merges the two at the login boundary, enforces stock
//! and pricing invariants, applies at most one discount instrument, and drives a multi-step
//! checkout to an atomic order-creation call. It is provider-agnostic.
//!
//! The library is divided into two main sections:
//! 1. The remote collaborator contracts ([`mod@traits`]). The remote cart, address book, order
//!    service and catalogs are traits the host application implements; the engine never talks to
//!    the network itself. The data types these contracts exchange are
//!    defined in [`mod@cart_types`] and [`mod@order_objects`] and are public.
//! 2. The engine public API: [`CartReconciler`] owns the single reconciled cart snapshot,
//!    [`CouponEngine`] validates discount instruments, and [`CheckoutOrchestrator`] drives the
//!    Shipping → Payment → Review workflow through its two-phase order submission.
//!
//! The only durable state the engine owns is the anonymous cart, persisted in SQLite via
//! [`LocalCartStore`]. Everything an authenticated session touches lives behind the remote
//! resource traits.
pub mod cart_types;
mod checkout;
mod coupon_engine;
pub mod helpers;
pub mod order_objects;
pub mod traits;

#[cfg(feature = "sqlite")]
mod reconciler;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use checkout::{CheckoutError, CheckoutOrchestrator, CheckoutSession, CheckoutStep, FeeSchedule, Totals};
pub use coupon_engine::{compute_discount, CouponEngine, CouponError};
#[cfg(feature = "sqlite")]
pub use reconciler::{CartReconciler, DroppedItem, MergeReport, ReconcilerError};
#[cfg(feature = "sqlite")]
pub use sqlite::{LocalCartStore, LocalStoreError};
