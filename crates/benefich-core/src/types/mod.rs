//! Core type definitions used across the BenefiCh workspace.

pub mod id;

pub use id::*;
