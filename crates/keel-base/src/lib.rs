//! # keel-base
//!
//! Core types and utilities for the Keel backbone extractor.
//!
//! This crate provides the foundational building blocks used across all other
//! Keel crates, including:
//!
//! - **Literals**: signed-integer literal and variable primitives
//! - **Error Types**: unified error handling across the tool
//! - **Verbosity**: the message-level ladder shared by the CLI and the engine

pub mod error;
pub mod lit;
pub mod verbosity;

pub use error::{Error, Result};
pub use lit::{is_pos, lit_index, var, Lit, Var};
pub use verbosity::Verbosity;
