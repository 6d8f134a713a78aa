//! # syncrow testkit
//!
//! Test utilities for syncrow.
//!
//! This crate provides:
//! - [`TestTable`], a table with a manual clock and automatic cleanup
//! - [`Note`], a small record type to store in it
//! - Property-based generators for ids, records and operation sequences
//!
//! ## Usage
//!
//! ```rust
//! use syncrow_testkit::prelude::*;
//!
//! with_temp_table(|table| {
//!     table.save_local("n1", 0, Note::new("groceries")).unwrap();
//!     assert_eq!(table.get("n1").unwrap().title, "groceries");
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
