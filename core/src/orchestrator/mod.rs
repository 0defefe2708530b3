//! Orchestrator for the load-test lifecycle
//!
//! The Orchestrator coordinates the whole run:
//! - Generating N ephemeral principals with fresh credentials
//! - Fanning out one provision -> workload task per principal
//! - Translating an interrupt into a broadcast shutdown
//! - Unconditionally tearing every principal down before releasing the
//!   administrative session
//!
//! # Example
//!
//! ```ignore
//! use frostbench_core::OrchestratorBuilder;
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .users(3)
//!     .duration(Duration::from_secs(10))
//!     .client(client)
//!     .admin_credentials(credentials)
//!     .build()?;
//!
//! let summary = orchestrator.run_with_signal_handling().await?;
//! println!("queries: {}", summary.total_queries);
//! ```

mod aggregator;
mod builder;
mod executor;
mod lifecycle;

pub use aggregator::{summarize_outcomes, RunSummary};
pub use builder::OrchestratorBuilder;
pub use executor::Orchestrator;
pub use lifecycle::{LifecycleManager, LifecycleState, PrincipalOutcome, SharedSession};

#[cfg(test)]
mod tests;
