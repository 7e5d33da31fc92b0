//! Core use-case services.
//!
//! # Responsibility
//! - Compose stores into operator-facing entry points.
//! - Keep CLI layers decoupled from SQL and pool details.

pub mod diagnostics;
