//! frostbench-core: Orchestration for ephemeral-user warehouse load tests
//!
//! This crate provides the pieces shared by the frostbench commands:
//!
//! - Warehouse client traits (connect, execute, close)
//! - Ephemeral principals and credential generation
//! - The per-principal workload loop
//! - The orchestrator: concurrent provisioning, workload fan-out, and
//!   guaranteed teardown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod credential;
pub mod error;
pub mod orchestrator;
pub mod principal;
pub mod traits;
pub mod workload;

pub use config::*;
pub use credential::generate_password;
pub use error::*;
pub use orchestrator::{
    summarize_outcomes, LifecycleManager, LifecycleState, Orchestrator, OrchestratorBuilder,
    PrincipalOutcome, RunSummary, SharedSession,
};
pub use principal::Principal;
pub use traits::*;
pub use workload::{WorkloadRunner, WorkloadStats};
