//! Checkout error taxonomy.
//!
//! Every pipeline failure is caught at the orchestrator boundary and
//! converted into one of these values: a user-visible message (the `Display`
//! impl) plus a machine-readable [`ErrorKind`]. Nothing propagates past the
//! orchestrator as an unhandled fault, and nothing retries automatically;
//! all retry is user-initiated resubmission.

use thiserror::Error;

use crate::backend::BackendError;
use tableside_core::CustomerField;

/// A failure of the checkout pipeline.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Required customer fields are empty. Never reaches the network.
    #[error("Missing required fields: {}", format_fields(.0))]
    Validation(Vec<CustomerField>),

    /// The order-creation endpoint failed. Cart and view state are left
    /// untouched so the user can resubmit without re-entering data.
    #[error("Failed to submit order: {0}")]
    OrderCreation(#[source] BackendError),

    /// The payment-initiation endpoint failed; no provider widget opened.
    #[error("Could not start payment: {0}")]
    PaymentInitiation(#[source] BackendError),

    /// Verification returned a non-success message or failed in transport.
    /// The order record may exist server-side without a verified payment;
    /// reconciliation is out of scope.
    #[error("Payment could not be verified: {0}")]
    PaymentVerification(String),

    /// A pipeline is already between submission and verification. Rejected
    /// to prevent duplicate order creation.
    #[error("A checkout is already in progress")]
    SubmissionInFlight,
}

impl CheckoutError {
    /// Machine-readable kind for UI dispatch.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::OrderCreation(_) => ErrorKind::OrderCreation,
            Self::PaymentInitiation(_) => ErrorKind::PaymentInitiation,
            Self::PaymentVerification(_) => ErrorKind::PaymentVerification,
            Self::SubmissionInFlight => ErrorKind::SubmissionInFlight,
        }
    }
}

/// Machine-readable checkout failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    OrderCreation,
    PaymentInitiation,
    PaymentVerification,
    SubmissionInFlight,
}

impl ErrorKind {
    /// Stable string form, suitable for logging and UI dispatch.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::OrderCreation => "order_creation_failed",
            Self::PaymentInitiation => "payment_initiation_failed",
            Self::PaymentVerification => "payment_verification_failed",
            Self::SubmissionInFlight => "submission_in_flight",
        }
    }
}

fn format_fields(fields: &[CustomerField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
