//! End-to-end checkout pipeline tests against an in-memory backend.
//!
//! The mock records every endpoint call so the tests can assert not just
//! outcomes but which network calls were (and were not) made.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Notify;

use tableside_core::{
    CurrencyCode, CustomerInfo, ItemId, MenuItem, OrderDraft, PaymentId, PaymentIntent,
    PaymentIntentId, ProviderCallback, VERIFICATION_SENTINEL, VerificationResponse,
};
use tableside_orderflow::backend::{BackendError, OrderBackend};
use tableside_orderflow::checkout::{CallbackOutcome, CheckoutPhase, SubmitOutcome};
use tableside_orderflow::error::ErrorKind;
use tableside_orderflow::session::Session;
use tableside_orderflow::view::ViewState;

// =============================================================================
// Mock backend
// =============================================================================

#[derive(Default)]
struct MockBackend {
    calls: Mutex<Vec<&'static str>>,
    fail_order: AtomicBool,
    fail_intent: AtomicBool,
    fail_verification_transport: AtomicBool,
    fail_email: AtomicBool,
    /// Message the verification endpoint answers with.
    verification_message: Mutex<String>,
    /// Amount requested from the payment-initiation endpoint.
    intent_amounts: Mutex<Vec<Decimal>>,
    /// `(email, body)` pairs handed to the email endpoint.
    emails: Mutex<Vec<(String, String)>>,
    /// When set, `create_order` blocks until `release_order` is notified.
    hold_order: AtomicBool,
    release_order: Notify,
}

fn locked<T>(lock: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    fn new() -> Arc<Self> {
        let mock = Self {
            verification_message: Mutex::new(VERIFICATION_SENTINEL.to_owned()),
            ..Self::default()
        };
        Arc::new(mock)
    }

    fn calls(&self) -> Vec<&'static str> {
        locked(&self.calls).clone()
    }

    fn record(&self, endpoint: &'static str) {
        locked(&self.calls).push(endpoint);
    }

    fn server_error() -> BackendError {
        BackendError::Api {
            status: 500,
            message: "internal error".to_owned(),
        }
    }
}

#[async_trait]
impl OrderBackend for MockBackend {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, BackendError> {
        self.record("meals");
        Ok(vec![item("p1", Decimal::new(1000, 2))])
    }

    async fn create_order(&self, _draft: &OrderDraft) -> Result<(), BackendError> {
        self.record("orders");
        if self.hold_order.load(Ordering::SeqCst) {
            self.release_order.notified().await;
        }
        if self.fail_order.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        Ok(())
    }

    async fn create_payment_intent(
        &self,
        amount: Decimal,
    ) -> Result<PaymentIntent, BackendError> {
        self.record("payment/orders");
        if self.fail_intent.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        locked(&self.intent_amounts).push(amount);
        Ok(PaymentIntent {
            id: PaymentIntentId::new("pay_1"),
            amount,
            currency: "USD".to_owned(),
        })
    }

    async fn verify_payment(
        &self,
        _callback: &ProviderCallback,
    ) -> Result<VerificationResponse, BackendError> {
        self.record("payment/verify");
        if self.fail_verification_transport.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        Ok(VerificationResponse {
            message: locked(&self.verification_message).clone(),
        })
    }

    async fn send_confirmation_email(
        &self,
        email: &str,
        email_body: &str,
    ) -> Result<(), BackendError> {
        self.record("send-email");
        if self.fail_email.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }
        locked(&self.emails).push((email.to_owned(), email_body.to_owned()));
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn item(id: &str, price: Decimal) -> MenuItem {
    MenuItem {
        id: ItemId::new(id),
        name: format!("Item {id}"),
        description: String::new(),
        image: format!("images/{id}.jpg"),
        price,
    }
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Ada Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        street: "12 Analytical Ln".to_owned(),
        postal_code: "12345".to_owned(),
        city: "London".to_owned(),
    }
}

fn callback(intent: &str) -> ProviderCallback {
    ProviderCallback {
        intent_id: PaymentIntentId::new(intent),
        payment_id: PaymentId::new("pmt_1"),
        signature: "sig".to_owned(),
    }
}

/// A session at the checkout overlay with `p1` (price 10) twice in the cart.
fn session_at_checkout(mock: &Arc<MockBackend>) -> Session {
    let session = Session::new(
        Arc::clone(mock) as Arc<dyn OrderBackend>,
        CurrencyCode::USD,
    );
    let p1 = item("p1", Decimal::new(1000, 2));
    session.state().with_cart(|cart| {
        cart.add_item(&p1);
        cart.add_item(&p1);
    });
    session.state().with_view(|view| {
        view.show_cart();
        view.go_to_checkout();
    });
    session
}

fn line_count(session: &Session) -> usize {
    session.state().with_cart(|cart| cart.lines().len())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn validation_failure_never_reaches_the_network() {
    let mock = MockBackend::new();
    let session = session_at_checkout(&mock);

    let mut incomplete = customer();
    incomplete.name = "   ".to_owned();

    let err = session
        .checkout()
        .submit(incomplete)
        .await
        .expect_err("missing name must fail validation");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("full name"));
    assert!(mock.calls().is_empty(), "no network call may be issued");
    assert_eq!(session.checkout().phase(), CheckoutPhase::Idle);
}

#[tokio::test]
async fn verified_payment_finalizes_cart_view_and_email() {
    let mock = MockBackend::new();
    let session = session_at_checkout(&mock);

    let outcome = session
        .checkout()
        .submit(customer())
        .await
        .expect("submission succeeds");

    let SubmitOutcome::HandedOff(intent) = outcome else {
        panic!("expected a provider handoff");
    };
    assert_eq!(intent.id, PaymentIntentId::new("pay_1"));
    assert_eq!(intent.amount, Decimal::new(2000, 2));
    assert_eq!(session.checkout().phase(), CheckoutPhase::AwaitingProvider);

    // Amount was the cart-total snapshot.
    assert_eq!(*locked(&mock.intent_amounts), vec![Decimal::new(2000, 2)]);

    let disposition = session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect("verification succeeds");
    assert_eq!(disposition, CallbackOutcome::Finalized);
    assert_eq!(session.checkout().phase(), CheckoutPhase::Confirmed);

    // Confirmation email was attempted with the snapshot total.
    let emails = locked(&mock.emails).clone();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].0, "ada@example.com");
    assert!(emails[0].1.contains("$20.00"));

    // Cart survives until the user acknowledges.
    assert_eq!(line_count(&session), 1);

    session.checkout().acknowledge_confirmation();
    assert_eq!(line_count(&session), 0);
    assert_eq!(session.state().view_state(), ViewState::Idle);
    assert_eq!(
        session.state().with_customer(|c| c.clone()),
        CustomerInfo::default()
    );
    assert_eq!(session.checkout().phase(), CheckoutPhase::Idle);
    assert_eq!(
        mock.calls(),
        vec!["orders", "payment/orders", "payment/verify", "send-email"]
    );
}

#[tokio::test]
async fn non_sentinel_verification_fails_and_allows_resubmission() {
    let mock = MockBackend::new();
    *locked(&mock.verification_message) = "Payment failed".to_owned();
    let session = session_at_checkout(&mock);

    session
        .checkout()
        .submit(customer())
        .await
        .expect("submission succeeds");

    let err = session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect_err("non-sentinel message is a verification failure");

    assert_eq!(err.kind(), ErrorKind::PaymentVerification);
    assert_eq!(
        session.checkout().phase(),
        CheckoutPhase::Failed(ErrorKind::PaymentVerification)
    );

    // Cart and view untouched; no email.
    assert_eq!(line_count(&session), 1);
    assert_eq!(session.state().view_state(), ViewState::CheckoutOpen);
    assert!(locked(&mock.emails).is_empty());

    // Resubmission is accepted.
    *locked(&mock.verification_message) = VERIFICATION_SENTINEL.to_owned();
    let outcome = session
        .checkout()
        .submit(customer())
        .await
        .expect("resubmission succeeds");
    assert!(matches!(outcome, SubmitOutcome::HandedOff(_)));
}

#[tokio::test]
async fn verification_transport_failure_is_a_verification_failure() {
    let mock = MockBackend::new();
    mock.fail_verification_transport.store(true, Ordering::SeqCst);
    let session = session_at_checkout(&mock);

    session
        .checkout()
        .submit(customer())
        .await
        .expect("submission succeeds");

    let err = session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect_err("transport failure fails verification");
    assert_eq!(err.kind(), ErrorKind::PaymentVerification);
    assert_eq!(line_count(&session), 1);
}

#[tokio::test]
async fn order_creation_failure_leaves_everything_untouched() {
    let mock = MockBackend::new();
    mock.fail_order.store(true, Ordering::SeqCst);
    let session = session_at_checkout(&mock);

    let err = session
        .checkout()
        .submit(customer())
        .await
        .expect_err("order creation fails");

    assert_eq!(err.kind(), ErrorKind::OrderCreation);
    assert_eq!(
        session.checkout().phase(),
        CheckoutPhase::Failed(ErrorKind::OrderCreation)
    );
    assert_eq!(line_count(&session), 1);
    assert_eq!(session.state().view_state(), ViewState::CheckoutOpen);
    // Pipeline stopped before payment initiation.
    assert_eq!(mock.calls(), vec!["orders"]);

    // The user may resubmit without re-entering data.
    mock.fail_order.store(false, Ordering::SeqCst);
    let outcome = session
        .checkout()
        .submit(customer())
        .await
        .expect("retry succeeds");
    assert!(matches!(outcome, SubmitOutcome::HandedOff(_)));
}

#[tokio::test]
async fn payment_initiation_failure_opens_no_widget() {
    let mock = MockBackend::new();
    mock.fail_intent.store(true, Ordering::SeqCst);
    let session = session_at_checkout(&mock);

    let err = session
        .checkout()
        .submit(customer())
        .await
        .expect_err("payment initiation fails");

    assert_eq!(err.kind(), ErrorKind::PaymentInitiation);
    assert_eq!(mock.calls(), vec!["orders", "payment/orders"]);
    assert_eq!(line_count(&session), 1);
}

#[tokio::test]
async fn second_submit_is_rejected_while_first_is_in_flight() {
    let mock = MockBackend::new();
    mock.hold_order.store(true, Ordering::SeqCst);
    let session = session_at_checkout(&mock);

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.checkout().submit(customer()).await })
    };

    // Let the first submission reach the blocked order call.
    while mock.calls().is_empty() {
        tokio::task::yield_now().await;
    }

    let err = session
        .checkout()
        .submit(customer())
        .await
        .expect_err("second submit must be rejected");
    assert_eq!(err.kind(), ErrorKind::SubmissionInFlight);

    mock.hold_order.store(false, Ordering::SeqCst);
    mock.release_order.notify_one();

    let outcome = first
        .await
        .expect("task completes")
        .expect("first submit succeeds");
    assert!(matches!(outcome, SubmitOutcome::HandedOff(_)));

    // Exactly one order record was created.
    assert_eq!(
        mock.calls()
            .iter()
            .filter(|endpoint| **endpoint == "orders")
            .count(),
        1
    );
}

#[tokio::test]
async fn cancel_mid_flight_discards_the_late_response() {
    let mock = MockBackend::new();
    mock.hold_order.store(true, Ordering::SeqCst);
    let session = session_at_checkout(&mock);

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.checkout().submit(customer()).await })
    };
    while mock.calls().is_empty() {
        tokio::task::yield_now().await;
    }

    // User closes the checkout overlay before the order call resolves.
    session.checkout().cancel();
    session.state().with_view(|view| view.hide_checkout());

    mock.hold_order.store(false, Ordering::SeqCst);
    mock.release_order.notify_one();

    let outcome = pending
        .await
        .expect("task completes")
        .expect("abandonment is not an error");
    assert_eq!(outcome, SubmitOutcome::Abandoned);

    // The late success was discarded: no payment intent was requested and
    // no order is considered placed.
    assert_eq!(mock.calls(), vec!["orders"]);
    assert_eq!(session.checkout().phase(), CheckoutPhase::Idle);
    assert_eq!(line_count(&session), 1);
}

#[tokio::test]
async fn callback_after_cancellation_is_discarded() {
    let mock = MockBackend::new();
    let session = session_at_checkout(&mock);

    session
        .checkout()
        .submit(customer())
        .await
        .expect("submission succeeds");
    session.checkout().cancel();

    let disposition = session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect("discard is not an error");

    assert_eq!(disposition, CallbackOutcome::Discarded);
    assert!(!mock.calls().contains(&"payment/verify"));
    assert_eq!(line_count(&session), 1);
}

#[tokio::test]
async fn callback_for_a_different_intent_is_discarded() {
    let mock = MockBackend::new();
    let session = session_at_checkout(&mock);

    session
        .checkout()
        .submit(customer())
        .await
        .expect("submission succeeds");

    let disposition = session
        .checkout()
        .handle_provider_callback(callback("pay_other"))
        .await
        .expect("discard is not an error");

    assert_eq!(disposition, CallbackOutcome::Discarded);
    assert_eq!(session.checkout().phase(), CheckoutPhase::AwaitingProvider);

    // The genuine callback still finalizes.
    let disposition = session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect("verification succeeds");
    assert_eq!(disposition, CallbackOutcome::Finalized);
}

#[tokio::test]
async fn duplicate_callback_is_discarded() {
    let mock = MockBackend::new();
    let session = session_at_checkout(&mock);

    session
        .checkout()
        .submit(customer())
        .await
        .expect("submission succeeds");
    session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect("first callback finalizes");

    let disposition = session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect("duplicate is discarded, not applied");
    assert_eq!(disposition, CallbackOutcome::Discarded);

    // Verification ran exactly once.
    assert_eq!(
        mock.calls()
            .iter()
            .filter(|endpoint| **endpoint == "payment/verify")
            .count(),
        1
    );
}

#[tokio::test]
async fn email_failure_never_reverses_the_order() {
    let mock = MockBackend::new();
    mock.fail_email.store(true, Ordering::SeqCst);
    let session = session_at_checkout(&mock);

    session
        .checkout()
        .submit(customer())
        .await
        .expect("submission succeeds");

    let disposition = session
        .checkout()
        .handle_provider_callback(callback("pay_1"))
        .await
        .expect("email failure is non-fatal");

    assert_eq!(disposition, CallbackOutcome::Finalized);
    assert_eq!(session.checkout().phase(), CheckoutPhase::Confirmed);

    session.checkout().acknowledge_confirmation();
    assert_eq!(line_count(&session), 0);
    assert_eq!(session.state().view_state(), ViewState::Idle);
}

#[tokio::test]
async fn catalog_menu_is_cached() {
    let mock = MockBackend::new();
    let session = Session::new(
        Arc::clone(&mock) as Arc<dyn OrderBackend>,
        CurrencyCode::USD,
    );

    let first = session.catalog().menu().await.expect("fetch succeeds");
    let second = session.catalog().menu().await.expect("cache hit");

    assert_eq!(first, second);
    assert_eq!(
        mock.calls()
            .iter()
            .filter(|endpoint| **endpoint == "meals")
            .count(),
        1
    );
}
