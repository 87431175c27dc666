//! HTTP surface of the LEMOS alerting backend.
//!
//! The binary in `main.rs` wires configuration, the notifier and the
//! in-memory reading cache into [`router::build_app_router`]; integration
//! tests build the same router with fakes.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod latest;
pub mod router;
pub mod routes;
pub mod state;
