//! Core business logic - framework-agnostic donation platform operations.
//! Everything here takes a database connection and returns plain structs,
//! so it is callable from the REST handlers, future webhook handlers, and
//! tests alike.

pub mod donation;
pub mod ledger;
pub mod program;
pub mod reconcile;
pub mod report;
