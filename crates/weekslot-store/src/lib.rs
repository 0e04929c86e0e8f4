//! File-backed persistence of reconciled event collections, one JSON file per
//! place/language pair.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::EventStore;
