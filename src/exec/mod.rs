// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`launcher`] provides the `ProcessLauncher` trait and the concrete
//!   `TokioProcessLauncher` used in production, which tests can replace
//!   with a recording implementation.

pub mod launcher;

pub use launcher::{ProcessLauncher, TokioProcessLauncher};
