//! Workload runner: the per-principal query loop
//!
//! The runner is the execution unit of a load test. Each instance owns one
//! principal's session and drives the simple loop: **execute -> log latency
//! -> repeat** until the workload window elapses. Result caching is disabled
//! for the session up front so every iteration pays real execution cost.
//!
//! Runners are spawned by the orchestrator, one task per principal, and stop
//! promptly when a shutdown broadcast arrives.

mod executor;
mod stats;

pub use executor::WorkloadRunner;
pub use stats::WorkloadStats;
