//! Port definitions for the message subsystem.
//!
//! Ports define abstract interfaces that decouple domain logic from
//! infrastructure concerns.

pub mod store;
