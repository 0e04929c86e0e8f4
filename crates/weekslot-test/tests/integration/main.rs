//! End-to-end tests across snapshot reading, reconciliation and storage.

mod override_schedule;
mod reconcile;
mod runner;
mod store;
