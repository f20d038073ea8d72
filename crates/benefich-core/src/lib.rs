//! # benefich-core
//!
//! Core crate for the BenefiCh dispatcher. Contains configuration schemas,
//! typed identifiers, the error-reporting collaborator trait, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other BenefiCh crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
