//! Session-wide state shared between the UI and the orchestrator.
//!
//! The cart, the view-state machine, and the checkout form are process-wide
//! singletons with session lifetime. [`SessionState`] owns them behind
//! mutexes (there is no true parallelism in the UI - one interaction at a
//! time - the locks only make the sharing explicit), and [`Session`] bundles
//! them with the orchestrator and catalog into one cheaply-cloneable handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tableside_core::{CurrencyCode, CustomerInfo};

use crate::backend::OrderBackend;
use crate::cart::{CartStore, CartView};
use crate::catalog::CatalogClient;
use crate::checkout::CheckoutOrchestrator;
use crate::view::{ViewState, ViewStateMachine};

/// The mutable singletons of one ordering session.
#[derive(Debug, Default)]
pub struct SessionState {
    cart: Mutex<CartStore>,
    view: Mutex<ViewStateMachine>,
    customer: Mutex<CustomerInfo>,
}

fn unpoisoned<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the cart store.
    pub fn with_cart<R>(&self, f: impl FnOnce(&mut CartStore) -> R) -> R {
        f(&mut unpoisoned(&self.cart))
    }

    /// Run `f` with exclusive access to the view-state machine.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut ViewStateMachine) -> R) -> R {
        f(&mut unpoisoned(&self.view))
    }

    /// Run `f` with exclusive access to the checkout form model.
    pub fn with_customer<R>(&self, f: impl FnOnce(&mut CustomerInfo) -> R) -> R {
        f(&mut unpoisoned(&self.customer))
    }

    /// The currently active view state.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        unpoisoned(&self.view).state().clone()
    }

    /// Render the cart for display.
    #[must_use]
    pub fn cart_view(&self, currency: CurrencyCode) -> CartView {
        CartView::from_store(&unpoisoned(&self.cart), currency)
    }
}

/// One handle over everything a UI collaborator needs.
///
/// Cheaply cloneable via `Arc`; clones share the same session.
#[derive(Clone)]
pub struct Session {
    state: Arc<SessionState>,
    checkout: Arc<CheckoutOrchestrator>,
    catalog: CatalogClient,
    currency: CurrencyCode,
}

impl Session {
    /// Create a fresh session: empty cart, `Idle` view, no pipeline.
    #[must_use]
    pub fn new(backend: Arc<dyn OrderBackend>, currency: CurrencyCode) -> Self {
        let state = Arc::new(SessionState::new());
        let checkout = Arc::new(CheckoutOrchestrator::new(
            Arc::clone(&backend),
            Arc::clone(&state),
            currency,
        ));
        let catalog = CatalogClient::new(backend);

        Self {
            state,
            checkout,
            catalog,
            currency,
        }
    }

    /// The shared mutable state (cart, view, checkout form).
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutOrchestrator {
        &self.checkout
    }

    /// The cached catalog client.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Display currency for formatted amounts.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Render the cart for display.
    #[must_use]
    pub fn cart_view(&self) -> CartView {
        self.state.cart_view(self.currency)
    }
}
