//! # updhub-core — Domain Types & Pure Logic
//!
//! Foundational crate for the updhub licensing-and-update coordination
//! service. Everything here is pure — no I/O, no clocks, no store handles:
//!
//! - [`module`] — the three tracked software modules (payroll, fiscal,
//!   accounting) and their per-module release state.
//! - [`password`] — the time-coded synchronization password codec.
//! - [`reconcile`] — the field-level merge that lets a partial publish
//!   coexist with previously published module state.
//!
//! ## Time convention
//!
//! All date and timestamp handling in updhub is **UTC**, fixed. The original
//! service compared against the host process's local zone, which made the
//! password protocol deployment-dependent; this codebase pins UTC for
//! password generation, validation, and artifact naming alike. Callers of
//! [`password::validate`] pass `Utc::now().date_naive()`.

pub mod module;
pub mod password;
pub mod reconcile;

pub use module::{ModuleKey, ModuleRelease, ReleaseSnapshot};
pub use password::{date_code, validate, PasswordError};
pub use reconcile::reconcile;
