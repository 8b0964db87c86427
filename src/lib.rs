// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![forbid(unsafe_code)]               // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Steward
//!
//! A declarative, idempotent configuration-management core.
//!
//! ## Overview
//!
//! Steward parses configuration documents into typed resource graphs and
//! reconciles each resource's declared state against observed reality:
//!
//! - Describe desired state (shell tasks, templates, containers, nested
//!   modules) in HCL
//! - Parse the document into a [`Module`] of typed resources, surfacing
//!   every semantic defect in one pass
//! - Reconcile each resource through a uniform two-phase protocol:
//!   a read-only [`Reconcile::check`] that produces a difference ledger,
//!   and a mutating [`Reconcile::apply`] that converges external state
//!
//! ## Architecture
//!
//! The system is built around **desired state reconciliation**:
//!
//! 1. **Desired state**: declared in configuration blocks
//! 2. **Observed state**: queried through the injected runtime client
//! 3. **Difference ledger**: per-attribute actual/expected/default entries
//!
//! ## Modules
//!
//! - [`config`]: parsing documents into resource graphs
//! - [`resource`]: the check/apply contract and its resource variants
//! - [`docker`]: the container runtime client and Engine API types
//! - [`error`]: the error hierarchy, including aggregated parse reports
//!
//! ## Example
//!
//! ```hcl
//! param "domain" {
//!   default = "example.org"
//! }
//!
//! task "hosts" {
//!   check = "grep -q example /etc/hosts"
//!   apply = "echo '127.0.0.1 example' >> /etc/hosts"
//! }
//!
//! container "web" {
//!   image  = "nginx:latest"
//!   expose = ["8080"]
//!   ports  = ["80:8080"]
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod docker;
pub mod error;
pub mod resource;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::Parser;
pub use docker::{ContainerClient, EngineClient};
pub use error::{DockerError, MultiError, ParseError, Pos, Result, StewardError};
pub use resource::{
    Container, Difference, Module, ModuleCall, Param, Reconcile, Resource, Severity, ShellTask,
    Status, Template,
};
