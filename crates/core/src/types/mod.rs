//! Core types for Tableside.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod id;
pub mod item;
pub mod order;
pub mod price;

pub use customer::{CustomerField, CustomerInfo};
pub use id::*;
pub use item::MenuItem;
pub use order::{
    CartLine, OrderDraft, PaymentIntent, PaymentIntentEnvelope, ProviderCallback,
    VERIFICATION_SENTINEL, VerificationResponse,
};
pub use price::{CurrencyCode, format_price};
