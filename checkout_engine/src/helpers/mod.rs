//! Pure helper functions with no I/O. Everything here is unit-testable in isolation.
pub mod card;
pub mod stock;

pub use card::{format_expiry, group_card_number, is_valid_card_number, is_valid_cvv, normalize_card_number};
pub use stock::clamp;
