//! Order, payment, and verification wire types.
//!
//! These mirror the backend's JSON shapes exactly:
//! - order creation takes `{ "order": { "items": [...], "customer": {...} } }`
//!   with each line flattened to `{id, name, description, image, price, quantity}`
//! - payment initiation returns its intent wrapped in a `{ "data": ... }`
//!   envelope
//! - verification answers with a bare `{ "message": ... }`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::customer::CustomerInfo;
use crate::types::id::{PaymentId, PaymentIntentId};
use crate::types::item::MenuItem;

/// Exact message the verification endpoint returns for a verified payment.
/// Anything else is a verification failure.
pub const VERIFICATION_SENTINEL: &str = "Payment verified successfully";

/// One cart entry: an item paired with how many of it the user wants.
///
/// The item is flattened on the wire so a line serializes to the flat
/// `{id, name, price, image, quantity}` shape order creation expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: MenuItem,
    /// Always >= 1 for a line present in the cart.
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.item.price * Decimal::from(self.quantity)
    }
}

/// Everything the backend needs to create an order record.
///
/// Constructed once at checkout submission, immutable afterwards, discarded
/// after finalization or abandonment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<CartLine>,
    pub customer: CustomerInfo,
}

impl OrderDraft {
    /// Total of all lines. Matches the cart total at submission time.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLine::line_total).sum()
    }
}

/// Provider-issued handle identifying one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    /// Cart total snapshot taken at submission time, in major units.
    pub amount: Decimal,
    pub currency: String,
}

/// Envelope the payment-initiation endpoint wraps its intent in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentEnvelope {
    pub data: PaymentIntent,
}

/// Payload the provider widget hands back after the user completes (or
/// fails) the payment inside the provider UI.
///
/// Forwarded verbatim to the verification endpoint. `intent_id` is the
/// identity the orchestrator uses to tie the callback to the pipeline that
/// opened the widget; callbacks referencing any other intent are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCallback {
    /// The payment intent this callback answers.
    pub intent_id: PaymentIntentId,
    /// Provider-side payment identifier.
    pub payment_id: PaymentId,
    /// Provider signature over the (intent, payment) pair.
    pub signature: String,
}

/// Response body of the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub message: String,
}

impl VerificationResponse {
    /// True iff the message equals [`VERIFICATION_SENTINEL`] exactly.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.message == VERIFICATION_SENTINEL
    }
}
