use std::fmt::Display;

use chrono::{DateTime, Utc};
use scf_common::{Money, CURRENCY_CODE};
use serde::{Deserialize, Serialize};

//--------------------------------------      OrderId        ---------------------------------------------------------
/// The identifier the order service assigns on creation. Opaque to this engine; callers use it
/// to navigate to the receipt view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     AddressId       ---------------------------------------------------------
/// Identifier of a persisted shipping address, assigned by the address resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressId(pub i64);

impl Display for AddressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "address #{}", self.0)
    }
}

//--------------------------------------   ContactProfile    ---------------------------------------------------------
/// Contact details of the logged-in shopper, used to prefill the shipping form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactProfile {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub document_id: String,
}

//--------------------------------------   ShippingAddress   ---------------------------------------------------------
/// The shipping form. Starts life as an all-empty draft on the checkout session and is persisted
/// verbatim as the account's primary address during submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub document_id: String,
    pub street: String,
    /// Free-text landmark or apartment reference. Never required.
    pub reference: Option<String>,
    pub city: String,
    pub district: String,
    pub postal_code: Option<String>,
}

impl ShippingAddress {
    /// An empty draft with the city defaulted, matching the storefront's single delivery region.
    pub fn draft() -> Self {
        Self { city: "Lima".to_string(), ..Self::default() }
    }

    /// Copy the shopper's known contact details into the draft, leaving address lines untouched.
    pub fn prefill_contact(&mut self, profile: &ContactProfile) {
        self.name = profile.name.clone();
        self.surname = profile.surname.clone();
        self.email = profile.email.clone();
        self.phone = profile.phone.clone();
        self.document_id = profile.document_id.clone();
    }

    /// The first required field that is still blank, if any. Drives the Shipping → Payment guard.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        let required = [
            (self.name.as_str(), "name"),
            (self.surname.as_str(), "surname"),
            (self.email.as_str(), "email"),
            (self.phone.as_str(), "phone"),
            (self.document_id.as_str(), "document id"),
            (self.street.as_str(), "street address"),
            (self.city.as_str(), "city"),
            (self.district.as_str(), "district"),
        ];
        required.into_iter().find(|(value, _)| value.trim().is_empty()).map(|(_, field)| field)
    }
}

//--------------------------------------   ProofOfPayment    ---------------------------------------------------------
/// Reference to an uploaded proof-of-payment artifact. The engine only records the reference;
/// storing and verifying the artifact is the order service's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfPayment {
    pub file_name: String,
    pub content_type: String,
}

//--------------------------------------  PaymentSelection   ---------------------------------------------------------
/// The selected payment method and its method-specific payload. One tagged union instead of
/// loosely coexisting field sets, so each variant's requirements are enforced by the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentSelection {
    /// Card payment. The number may contain display whitespace; it is normalized before
    /// validation and submission.
    Card { number: String, holder: String, expiry: String, cvv: String },
    /// Mobile-wallet instant transfer. The proof upload is optional client-side; the order API
    /// enforces its own requirement.
    WalletTransfer { phone: String, proof: Option<ProofOfPayment> },
    /// Bank transfer. Validity is deferred to the order API.
    BankTransfer { bank: String, operation_number: Option<String>, proof: Option<ProofOfPayment> },
}

impl PaymentSelection {
    pub fn method_code(&self) -> &'static str {
        match self {
            PaymentSelection::Card { .. } => "card",
            PaymentSelection::WalletTransfer { .. } => "wallet_transfer",
            PaymentSelection::BankTransfer { .. } => "bank_transfer",
        }
    }
}

//--------------------------------------   NewOrderRequest   ---------------------------------------------------------
/// The order-creation request assembled at the end of checkout. Items are not listed here; the
/// order service reads them from the authenticated remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub address_id: AddressId,
    pub payment: PaymentSelection,
    pub coupon_code: Option<String>,
    pub note: Option<String>,
    pub currency: String,
}

impl NewOrderRequest {
    pub fn new(address_id: AddressId, payment: PaymentSelection) -> Self {
        Self { address_id, payment, coupon_code: None, note: None, currency: CURRENCY_CODE.to_string() }
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
/// The order as returned by the order service. Owned by that service once created; this engine
/// only hands the identifier upward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}
