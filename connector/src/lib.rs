//! frostbench-connector: HTTP SQL API client for the warehouse
//!
//! Implements the `WarehouseClient`/`WarehouseSession` traits from
//! frostbench-core against the warehouse's HTTP SQL API: password login for
//! a bearer token, then statement execution with a per-request id.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;

pub use client::{HttpSession, HttpWarehouseClient};
