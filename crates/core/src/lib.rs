//! Tableside Core - Shared types library.
//!
//! This crate provides common types used across all Tableside components:
//! - `orderflow` - Client-resident order lifecycle core
//! - UI collaborators consuming the session state
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, customer info, and order wire types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
