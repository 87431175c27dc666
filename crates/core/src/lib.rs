//! Domain logic for the LEMOS monitoring backend.
//!
//! Everything in this crate is pure (no network, no global state beyond
//! environment lookups in [`contacts::EnvContacts`]), so it can be tested in
//! isolation and shared by the API server and the simulator.

pub mod alert;
pub mod contacts;
pub mod error;
pub mod metric;
pub mod reading;
pub mod thresholds;
pub mod types;
