//! The checkout orchestrator.
//!
//! Drives the multi-step, partially-external sequence from "user submits the
//! checkout form" to either a confirmed order or a recoverable failure,
//! exactly once per submission:
//!
//! 1. validate customer fields (no network on failure)
//! 2. create the order record
//! 3. create a payment intent and hand it to the provider widget
//! 4. verify the provider callback against the verification endpoint
//! 5. finalize: confirmation email (best effort), then - on the user's
//!    acknowledgment - clear the cart, reset the form, return the view to idle
//!
//! Exactly one pipeline may be between submission and verification at a
//! time. Every submission gets a fresh attempt id; state is only mutated
//! after an await when that attempt is still the current one, so responses
//! to an abandoned pipeline (the user closed checkout, or a provider
//! callback arrived late or twice) are discarded rather than applied to
//! newer cart state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tableside_core::{
    CurrencyCode, CustomerInfo, OrderDraft, PaymentIntent, ProviderCallback,
};

use crate::backend::OrderBackend;
use crate::email;
use crate::error::{CheckoutError, ErrorKind};
use crate::http::RequestSlot;
use crate::session::SessionState;

/// Where the pipeline currently stands, for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    /// No pipeline open; submission is accepted.
    #[default]
    Idle,
    /// Stages 2-3 in flight (order record, payment intent).
    SubmittingOrder,
    /// Provider widget handed off; waiting for its callback. May last
    /// forever if the user abandons the provider UI - that is a valid
    /// terminal non-completion, not an error.
    AwaitingProvider,
    /// Verification request in flight.
    Verifying,
    /// Payment verified; waiting for the user to acknowledge.
    Confirmed,
    /// The last submission failed; resubmission is accepted.
    Failed(ErrorKind),
}

/// Result of a submission that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stages 2-3 completed; open the provider widget with this intent.
    HandedOff(PaymentIntent),
    /// The pipeline was cancelled while a request was in flight; the late
    /// response was discarded and no state was changed.
    Abandoned,
}

/// Result of a provider callback that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Verification succeeded; the pipeline is confirmed.
    Finalized,
    /// The callback did not match the open pipeline (stale, duplicate, or
    /// arriving after cancellation) and was discarded.
    Discarded,
}

/// One open checkout attempt.
#[derive(Debug, Clone)]
struct Pipeline {
    attempt: Uuid,
    draft: OrderDraft,
    /// Cart total captured at submission; never re-read from the live cart.
    amount: Decimal,
    intent: Option<PaymentIntent>,
}

#[derive(Debug, Default)]
struct OrchestratorInner {
    phase: CheckoutPhase,
    pipeline: Option<Pipeline>,
}

/// Coordinates order creation, payment, verification, and finalization.
pub struct CheckoutOrchestrator {
    backend: Arc<dyn OrderBackend>,
    session: Arc<SessionState>,
    currency: CurrencyCode,
    inner: Mutex<OrchestratorInner>,
    /// Observable lifecycle of the submit leg (stages 2-3), for the UI's
    /// "sending order data" affordance.
    submit_request: RequestSlot<PaymentIntent>,
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(
        backend: Arc<dyn OrderBackend>,
        session: Arc<SessionState>,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            backend,
            session,
            currency,
            inner: Mutex::new(OrchestratorInner::default()),
            submit_request: RequestSlot::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OrchestratorInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current pipeline phase.
    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        self.lock().phase
    }

    /// Observable state of the submit leg.
    #[must_use]
    pub fn submit_request(&self) -> &RequestSlot<PaymentIntent> {
        &self.submit_request
    }

    /// True if `attempt` is still the open pipeline.
    fn is_current(&self, attempt: Uuid) -> bool {
        self.lock()
            .pipeline
            .as_ref()
            .is_some_and(|p| p.attempt == attempt)
    }

    /// Record a stage failure for `attempt`, leaving cart and view state
    /// untouched so the user can resubmit. No-op when the attempt is stale.
    fn fail_stage(&self, attempt: Uuid, error: &CheckoutError) {
        let mut inner = self.lock();
        if inner.pipeline.as_ref().is_some_and(|p| p.attempt == attempt) {
            inner.phase = CheckoutPhase::Failed(error.kind());
            inner.pipeline = None;
        }
    }

    /// Submit the checkout form: stages 1-3.
    ///
    /// On success the provider widget should be opened with the returned
    /// intent; the orchestrator does not block on the provider - it waits
    /// for [`handle_provider_callback`](Self::handle_provider_callback).
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`] while a pipeline is open
    /// - [`CheckoutError::Validation`] before any network call
    /// - [`CheckoutError::OrderCreation`] / [`CheckoutError::PaymentInitiation`]
    ///   for stage failures; cart and view state are left untouched
    #[instrument(skip(self, customer))]
    pub async fn submit(&self, customer: CustomerInfo) -> Result<SubmitOutcome, CheckoutError> {
        // Stage 1: validate before anything leaves the process.
        let missing = customer.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::Validation(missing));
        }

        // Snapshot the cart and open the pipeline under one lock so two
        // concurrent submits cannot both pass the guard.
        let (attempt, draft, amount) = {
            let mut inner = self.lock();
            if matches!(
                inner.phase,
                CheckoutPhase::SubmittingOrder
                    | CheckoutPhase::AwaitingProvider
                    | CheckoutPhase::Verifying
                    | CheckoutPhase::Confirmed
            ) {
                return Err(CheckoutError::SubmissionInFlight);
            }

            let draft = OrderDraft {
                items: self.session.with_cart(|cart| cart.snapshot()),
                customer: customer.clone(),
            };
            let amount = draft.total();
            let attempt = Uuid::new_v4();

            inner.phase = CheckoutPhase::SubmittingOrder;
            inner.pipeline = Some(Pipeline {
                attempt,
                draft: draft.clone(),
                amount,
                intent: None,
            });
            (attempt, draft, amount)
        };

        // Keep the form contents for a possible retry.
        self.session.with_customer(|form| *form = customer);

        let token = self.submit_request.begin();
        info!(%attempt, %amount, "checkout submitted");

        // Stage 2: create the order record.
        if let Err(source) = self.backend.create_order(&draft).await {
            if !self.is_current(attempt) {
                warn!(%attempt, "discarding order-creation result for abandoned pipeline");
                return Ok(SubmitOutcome::Abandoned);
            }
            let error = CheckoutError::OrderCreation(source);
            self.fail_stage(attempt, &error);
            self.submit_request.fail(token, error.to_string());
            return Err(error);
        }
        if !self.is_current(attempt) {
            warn!(%attempt, "pipeline abandoned after order creation");
            return Ok(SubmitOutcome::Abandoned);
        }

        // Stage 3: create the payment intent for the snapshotted amount.
        let intent = match self.backend.create_payment_intent(amount).await {
            Ok(intent) => intent,
            Err(source) => {
                if !self.is_current(attempt) {
                    warn!(%attempt, "discarding payment-initiation result for abandoned pipeline");
                    return Ok(SubmitOutcome::Abandoned);
                }
                let error = CheckoutError::PaymentInitiation(source);
                self.fail_stage(attempt, &error);
                self.submit_request.fail(token, error.to_string());
                return Err(error);
            }
        };

        {
            let mut inner = self.lock();
            let Some(pipeline) = inner
                .pipeline
                .as_mut()
                .filter(|p| p.attempt == attempt)
            else {
                warn!(%attempt, "pipeline abandoned before provider handoff");
                return Ok(SubmitOutcome::Abandoned);
            };
            pipeline.intent = Some(intent.clone());
            inner.phase = CheckoutPhase::AwaitingProvider;
        }

        self.submit_request.succeed(token, intent.clone());
        info!(%attempt, intent = %intent.id, "handed off to payment provider");
        Ok(SubmitOutcome::HandedOff(intent))
    }

    /// Stage 4, invoked by the provider's callback: verify the payment and,
    /// on the exact success sentinel, finalize.
    ///
    /// Callbacks that do not reference the currently open intent are
    /// discarded, never applied - this covers duplicates, callbacks after
    /// cancellation, and callbacks raced by a newer submission.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::PaymentVerification`] when the endpoint fails or
    /// answers anything but the sentinel. The cart is untouched and a new
    /// submission is accepted afterwards.
    #[instrument(skip(self, callback), fields(intent = %callback.intent_id))]
    pub async fn handle_provider_callback(
        &self,
        callback: ProviderCallback,
    ) -> Result<CallbackOutcome, CheckoutError> {
        let (attempt, draft) = {
            let mut inner = self.lock();
            let open = if inner.phase == CheckoutPhase::AwaitingProvider {
                inner
                    .pipeline
                    .as_ref()
                    .filter(|p| {
                        p.intent.as_ref().is_some_and(|i| i.id == callback.intent_id)
                    })
                    .map(|p| (p.attempt, p.draft.clone()))
            } else {
                None
            };

            let Some(pair) = open else {
                warn!(intent = %callback.intent_id, "discarding provider callback with no matching pipeline");
                return Ok(CallbackOutcome::Discarded);
            };
            inner.phase = CheckoutPhase::Verifying;
            pair
        };

        let verification = self.backend.verify_payment(&callback).await;

        if !self.is_current(attempt) {
            warn!(%attempt, "discarding verification result for abandoned pipeline");
            return Ok(CallbackOutcome::Discarded);
        }

        let response = match verification {
            Ok(response) => response,
            Err(source) => {
                let error = CheckoutError::PaymentVerification(source.to_string());
                self.fail_stage(attempt, &error);
                return Err(error);
            }
        };

        if !response.is_verified() {
            let error = CheckoutError::PaymentVerification(response.message);
            self.fail_stage(attempt, &error);
            return Err(error);
        }

        self.lock().phase = CheckoutPhase::Confirmed;
        info!(%attempt, "payment verified, order confirmed");

        // Stage 5 (best effort): a failed confirmation email never reverses
        // the order.
        if let Err(error) =
            email::dispatch_confirmation(self.backend.as_ref(), &draft, self.currency).await
        {
            warn!(%attempt, error = %error, "confirmation email dispatch failed");
        }

        Ok(CallbackOutcome::Finalized)
    }

    /// The user acknowledged the confirmation: clear the cart, reset the
    /// checkout form, return the view to idle, and close the pipeline.
    /// No-op unless the pipeline is [`CheckoutPhase::Confirmed`].
    pub fn acknowledge_confirmation(&self) {
        {
            let mut inner = self.lock();
            if inner.phase != CheckoutPhase::Confirmed {
                return;
            }
            inner.phase = CheckoutPhase::Idle;
            inner.pipeline = None;
        }

        self.session.with_cart(|cart| cart.clear());
        self.session
            .with_customer(|form| *form = CustomerInfo::default());
        self.session.with_view(|view| view.complete_order());
        self.submit_request.clear();
        info!("order finalized, session reset");
    }

    /// Abandon the open pipeline (checkout closed, or back to the cart).
    /// No order is considered placed; in-flight responses for the attempt
    /// will be discarded rather than cancelled. A confirmed pipeline is not
    /// abandonable - it awaits [`acknowledge_confirmation`](Self::acknowledge_confirmation).
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if inner.phase == CheckoutPhase::Confirmed {
            return;
        }
        if inner.pipeline.is_some() {
            info!("checkout pipeline abandoned");
        }
        inner.phase = CheckoutPhase::Idle;
        inner.pipeline = None;
        drop(inner);
        self.submit_request.clear();
    }
}
