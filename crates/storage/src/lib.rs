//! Tree definition sources for Onboard.
//!
//! This crate provides a trait-based source interface with a built-in
//! catalog and a JSON file implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod builtin;
pub mod json_storage;

pub use trait_::{TreeSource, StorageError, Result};
pub use builtin::BuiltinTreeSource;
pub use json_storage::JsonTreeSource;
