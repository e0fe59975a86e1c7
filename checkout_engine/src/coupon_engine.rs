use chrono::{DateTime, Utc};
use log::*;
use scf_common::Money;
use thiserror::Error;

use crate::{
    cart_types::{AppliedDiscount, Coupon, Discount},
    traits::{CatalogError, CouponCatalog},
};

/// `CouponEngine` validates coupon codes against the cart total and holds the single active
/// discount for the checkout session. At most one discount is ever active; applying a second
/// code replaces the first atomically, it never stacks.
pub struct CouponEngine<C> {
    catalog: C,
    active: Option<AppliedDiscount>,
}

impl<C> CouponEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog, active: None }
    }

    pub fn active(&self) -> Option<&AppliedDiscount> {
        self.active.as_ref()
    }

    /// Remove the active discount. Unconditional; always succeeds.
    pub fn remove(&mut self) {
        self.active = None;
    }

    /// The discount must not outlive the cart that qualified for it. Call this whenever the cart
    /// changes; an empty cart drops the active discount.
    pub fn refresh(&mut self, cart_total: Money) {
        if cart_total <= Money::zero() && self.active.take().is_some() {
            debug!("🎟️ Cart emptied, dropping the applied coupon");
        }
    }
}

impl<C> CouponEngine<C>
where C: CouponCatalog
{
    /// Validate `code` against the current cart total and make it the active discount.
    ///
    /// The rules run in order and short-circuit on the first failure: empty input, unknown code,
    /// expiry, minimum qualifying amount. The discount arithmetic itself is in
    /// [`compute_discount`], which is pure.
    pub async fn apply(&mut self, code: &str, cart_total: Money) -> Result<AppliedDiscount, CouponError> {
        let code = code.trim();
        if code.is_empty() || cart_total <= Money::zero() {
            return Err(CouponError::EmptyCartOrCode);
        }
        let coupon = self.catalog.find_coupon(code).await?.ok_or(CouponError::NotFound)?;
        let amount = compute_discount(&coupon, cart_total, Utc::now())?;
        debug!("🎟️ Coupon {} applied for {amount} off a cart of {cart_total}", coupon.code);
        let applied = AppliedDiscount { coupon, amount };
        self.active = Some(applied.clone());
        Ok(applied)
    }
}

/// Compute the discount a coupon grants on `cart_total` at instant `now`.
///
/// Pure function of its inputs; the same arguments always yield the same result. Percentage
/// discounts are clamped to the coupon's cap when it carries one. A fixed discount is returned
/// verbatim; callers clamp the final total at zero rather than this function second-guessing the
/// fee arithmetic.
pub fn compute_discount(coupon: &Coupon, cart_total: Money, now: DateTime<Utc>) -> Result<Money, CouponError> {
    if now > coupon.expires_at {
        return Err(CouponError::Expired(coupon.expires_at));
    }
    if cart_total < coupon.min_amount {
        return Err(CouponError::BelowMinimum(coupon.min_amount));
    }
    let amount = match &coupon.discount {
        Discount::Percentage { percent, cap } => {
            let raw = Money::from(cart_total.value() * i64::from(*percent) / 100);
            match cap {
                Some(cap) if raw > *cap => *cap,
                _ => raw,
            }
        },
        Discount::Fixed { amount } => *amount,
    };
    Ok(amount)
}

#[derive(Debug, Clone, Error)]
pub enum CouponError {
    #[error("Enter a coupon code and add something to the cart first")]
    EmptyCartOrCode,
    #[error("No coupon matches the supplied code")]
    NotFound,
    #[error("This coupon expired on {0}")]
    Expired(DateTime<Utc>),
    #[error("The cart total is below the minimum qualifying amount of {0}")]
    BelowMinimum(Money),
    #[error("Coupon lookup failed: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn percentage(code: &str, percent: u8, min: i64, cap: Option<i64>) -> Coupon {
        Coupon {
            code: code.to_string(),
            discount: Discount::Percentage { percent, cap: cap.map(Money::from_units) },
            min_amount: Money::from_units(min),
            expires_at: Utc::now() + Duration::days(30),
            description: None,
        }
    }

    fn fixed(code: &str, amount: i64, min: i64) -> Coupon {
        Coupon {
            code: code.to_string(),
            discount: Discount::Fixed { amount: Money::from_units(amount) },
            min_amount: Money::from_units(min),
            expires_at: Utc::now() + Duration::days(30),
            description: None,
        }
    }

    #[test]
    fn percentage_discount_is_capped() {
        // 25% of 1000 is 250, but the cap wins
        let coupon = percentage("SUMMER25", 25, 150, Some(150));
        let discount = compute_discount(&coupon, Money::from_units(1000), Utc::now()).unwrap();
        assert_eq!(discount, Money::from_units(150));
    }

    #[test]
    fn percentage_discount_without_cap() {
        let coupon = percentage("FIRST20", 20, 50, None);
        let discount = compute_discount(&coupon, Money::from_units(200), Utc::now()).unwrap();
        assert_eq!(discount, Money::from_units(40));
    }

    #[test]
    fn fixed_discount_below_minimum_is_rejected() {
        let coupon = fixed("WELCOME10", 10, 30);
        let err = compute_discount(&coupon, Money::from_units(20), Utc::now()).unwrap_err();
        assert!(matches!(err, CouponError::BelowMinimum(min) if min == Money::from_units(30)));
    }

    #[test]
    fn expired_coupon_is_rejected() {
        let mut coupon = fixed("WELCOME10", 10, 30);
        coupon.expires_at = Utc::now() - Duration::days(1);
        let err = compute_discount(&coupon, Money::from_units(100), Utc::now()).unwrap_err();
        assert!(matches!(err, CouponError::Expired(_)));
    }

    #[test]
    fn same_inputs_same_result() {
        let coupon = percentage("FIRST20", 20, 50, Some(100));
        let now = Utc::now();
        let a = compute_discount(&coupon, Money::from_units(300), now).unwrap();
        let b = compute_discount(&coupon, Money::from_units(300), now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn minimum_is_inclusive() {
        let coupon = fixed("WELCOME10", 10, 30);
        let discount = compute_discount(&coupon, Money::from_units(30), Utc::now()).unwrap();
        assert_eq!(discount, Money::from_units(10));
    }
}
