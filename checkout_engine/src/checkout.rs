use std::fmt::Display;

use log::*;
use scf_common::Money;
use thiserror::Error;

use crate::{
    cart_types::{AppliedDiscount, Cart},
    helpers::card,
    order_objects::{NewOrderRequest, OrderId, PaymentSelection, ShippingAddress},
    traits::{AddressResource, AddressResourceError, OrderResource, OrderResourceError},
};

//--------------------------------------    CheckoutStep     ---------------------------------------------------------
/// The three ordered checkout steps. Forward movement is guarded; backward movement is always
/// allowed and discards nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutStep::Shipping => write!(f, "Shipping"),
            CheckoutStep::Payment => write!(f, "Payment"),
            CheckoutStep::Review => write!(f, "Review"),
        }
    }
}

//--------------------------------------   CheckoutSession   ---------------------------------------------------------
/// The in-memory state of one checkout attempt. Never persisted; abandoning checkout simply
/// drops it.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub step: CheckoutStep,
    pub shipping: ShippingAddress,
    pub payment: Option<PaymentSelection>,
    pub note: Option<String>,
    pub accept_terms: bool,
}

impl CheckoutSession {
    fn new() -> Self {
        Self {
            step: CheckoutStep::Shipping,
            shipping: ShippingAddress::draft(),
            payment: None,
            note: None,
            accept_terms: false,
        }
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------     FeeSchedule     ---------------------------------------------------------
/// Shipping fee policy: a flat fee, waived above the free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub flat_fee: Money,
    pub free_shipping_threshold: Money,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { flat_fee: Money::from_units(15), free_shipping_threshold: Money::from_units(100) }
    }
}

impl FeeSchedule {
    /// Zero for an empty cart (nothing to ship) and at or above the threshold; the flat fee
    /// otherwise.
    pub fn shipping_fee(&self, subtotal: Money) -> Money {
        if subtotal.is_zero() || subtotal >= self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_fee
        }
    }
}

//--------------------------------------       Totals        ---------------------------------------------------------
/// The order summary presented at every step. Recomputed on demand, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping_fee: Money,
    /// `subtotal − discount + shipping_fee`, clamped at zero. A discount larger than the rest of
    /// the order never produces a negative total.
    pub total: Money,
}

//-------------------------------------- CheckoutOrchestrator -------------------------------------------------------
/// `CheckoutOrchestrator` drives the step-sequenced checkout workflow up to the atomic
/// order-creation call.
///
/// Submission is a two-phase, non-atomic sequence against two independent resources: the shipping
/// address is persisted first, then the order is created against the returned address id. A
/// failure in either phase is surfaced as its own error variant and nothing is retried
/// automatically; in particular, an address persisted in a failed attempt is never rolled back.
pub struct CheckoutOrchestrator<A, O> {
    addresses: A,
    orders: O,
    fees: FeeSchedule,
    session: CheckoutSession,
}

impl<A, O> CheckoutOrchestrator<A, O> {
    pub fn new(addresses: A, orders: O) -> Self {
        Self { addresses, orders, fees: FeeSchedule::default(), session: CheckoutSession::new() }
    }

    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    pub fn step(&self) -> CheckoutStep {
        self.session.step
    }

    /// The shipping form, for the UI to edit in place.
    pub fn shipping_mut(&mut self) -> &mut ShippingAddress {
        &mut self.session.shipping
    }

    pub fn select_payment(&mut self, payment: PaymentSelection) {
        self.session.payment = Some(payment);
    }

    pub fn set_note<S: Into<String>>(&mut self, note: S) {
        self.session.note = Some(note.into());
    }

    pub fn set_accept_terms(&mut self, accepted: bool) {
        self.session.accept_terms = accepted;
    }

    /// Advance to the next step if the current step's guard passes. On a guard failure the step
    /// does not change and the error names what is missing.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        match self.session.step {
            CheckoutStep::Shipping => {
                if let Some(field) = self.session.shipping.first_missing_field() {
                    return Err(CheckoutError::ShippingIncomplete(field));
                }
                self.session.step = CheckoutStep::Payment;
            },
            CheckoutStep::Payment => {
                validate_payment(self.session.payment.as_ref())?;
                self.session.step = CheckoutStep::Review;
            },
            CheckoutStep::Review => {},
        }
        Ok(self.session.step)
    }

    /// Go back one step. No data is discarded.
    pub fn step_back(&mut self) {
        self.session.step = match self.session.step {
            CheckoutStep::Shipping | CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Review => CheckoutStep::Payment,
        };
    }

    /// Jump directly to an earlier step. Forward jumps are refused; the guards in [`advance`]
    /// are the only way forward.
    ///
    /// [`advance`]: Self::advance
    pub fn go_to(&mut self, step: CheckoutStep) -> bool {
        if step < self.session.step {
            self.session.step = step;
            true
        } else {
            step == self.session.step
        }
    }

    /// Compute the order summary for the given cart and discount.
    pub fn totals(&self, cart: &Cart, discount: Option<&AppliedDiscount>) -> Totals {
        let subtotal = cart.total();
        let shipping_fee = self.fees.shipping_fee(subtotal);
        let discount = discount.map_or(Money::zero(), |d| d.amount);
        let total = (subtotal + shipping_fee).saturating_sub(discount);
        Totals { subtotal, discount, shipping_fee, total }
    }

    /// Discard the session, e.g. when the shopper abandons checkout. No remote compensation is
    /// triggered.
    pub fn reset(&mut self) {
        self.session = CheckoutSession::new();
    }
}

#[cfg(feature = "sqlite")]
impl<A, O> CheckoutOrchestrator<A, O>
where
    A: AddressResource,
    O: OrderResource,
{
    /// Submit the order: persist the shipping address, then create the order against the
    /// returned address id.
    ///
    /// Requires the session to be at Review with the terms accepted and a non-empty cart. On
    /// success the cart is cleared through the reconciler, the session is reset, and the new
    /// order's id is returned for navigation to the receipt view.
    ///
    /// On [`CheckoutError::AddressPersistenceFailed`] no order-creation call is made and the
    /// session stays at Review so the shopper can retry without re-entering anything. On
    /// [`CheckoutError::OrderCreationFailed`] the already-persisted address stays persisted; an
    /// address without an order is an accepted inconsistency.
    pub async fn submit<B, P>(
        &mut self,
        cart: &mut crate::reconciler::CartReconciler<B, P>,
        discount: Option<&AppliedDiscount>,
    ) -> Result<OrderId, CheckoutError>
    where
        B: crate::traits::CartResource,
        P: crate::traits::ProductCatalog,
    {
        if self.session.step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview);
        }
        if !self.session.accept_terms {
            return Err(CheckoutError::TermsNotAccepted);
        }
        if cart.current_cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let payment = self.session.payment.clone().ok_or(CheckoutError::NoPaymentMethod)?;

        // Phase one: the address. Nothing irreversible has happened if this fails.
        let address_id = self
            .addresses
            .save_primary(&self.session.shipping)
            .await
            .map_err(CheckoutError::AddressPersistenceFailed)?;
        debug!("🧾️ Shipping address persisted as {address_id}");

        // Phase two: the order, referencing the persisted address.
        let mut request = NewOrderRequest::new(address_id, payment);
        request.coupon_code = discount.map(|d| d.coupon.code.clone());
        request.note = self.session.note.clone();
        let order = self.orders.create(&request).await.map_err(CheckoutError::OrderCreationFailed)?;
        info!("🧾️ Order {} created for {}", order.id, order.total);

        if let Err(e) = cart.clear().await {
            warn!("🧾️ Order {} created but the cart could not be cleared: {e}", order.id);
        }
        self.session = CheckoutSession::new();
        Ok(order.id)
    }
}

/// The Payment → Review guard, per payment method.
fn validate_payment(payment: Option<&PaymentSelection>) -> Result<(), CheckoutError> {
    let payment = payment.ok_or(CheckoutError::NoPaymentMethod)?;
    match payment {
        PaymentSelection::Card { number, holder, expiry, cvv } => {
            if !card::is_valid_card_number(number) {
                return Err(CheckoutError::PaymentInvalid("card number must be 16 digits"));
            }
            if !card::is_valid_cvv(cvv) {
                return Err(CheckoutError::PaymentInvalid("CVV must be 3 digits"));
            }
            if holder.trim().is_empty() {
                return Err(CheckoutError::PaymentInvalid("card holder name is required"));
            }
            if expiry.trim().is_empty() {
                return Err(CheckoutError::PaymentInvalid("card expiry is required"));
            }
        },
        PaymentSelection::WalletTransfer { phone, .. } => {
            if phone.trim().is_empty() {
                return Err(CheckoutError::PaymentInvalid("a contact phone number is required"));
            }
        },
        // Validity is the order API's call.
        PaymentSelection::BankTransfer { .. } => {},
    }
    Ok(())
}

//--------------------------------------    CheckoutError    ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Shipping details are incomplete: {0} is required")]
    ShippingIncomplete(&'static str),
    #[error("Payment details are invalid: {0}")]
    PaymentInvalid(&'static str),
    #[error("No payment method has been selected")]
    NoPaymentMethod,
    #[error("The terms and conditions must be accepted before submitting")]
    TermsNotAccepted,
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Checkout is not at the review step")]
    NotAtReview,
    #[error("The shipping address could not be saved: {0}")]
    AddressPersistenceFailed(AddressResourceError),
    #[error("The order could not be created: {0}")]
    OrderCreationFailed(OrderResourceError),
}
