//! `lemos-simulator` library crate.
//!
//! Generates randomized sensor readings and pushes them to the LEMOS API on a
//! fixed period. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod generator;
pub mod scheduler;
pub mod sender;
