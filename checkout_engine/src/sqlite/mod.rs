//! SQLite persistence for the anonymous cart.
//!
//! This is the only durable state the engine owns itself. Everything an authenticated session
//! touches lives behind the remote resource traits instead.
mod local_store;

pub use local_store::{LocalCartStore, LocalStoreError};
