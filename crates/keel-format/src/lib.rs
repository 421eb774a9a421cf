//! # keel-format
//!
//! Input handling for Keel.
//!
//! Supports:
//! - **DIMACS CNF**: the standard SAT competition format, parsed strictly
//! - **Compressed input**: gzip-compressed files, detected by extension

pub mod dimacs;
pub mod reader;

pub use dimacs::DimacsCnf;
pub use reader::open_input;
