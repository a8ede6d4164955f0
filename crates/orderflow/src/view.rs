//! The view-state machine: which single overlay is visible.
//!
//! Exactly one of `Idle | CartOpen | CheckoutOpen | ItemDetail` holds at any
//! time. Every transition is a single atomic state replacement - entering a
//! state implicitly exits whichever was active, so two overlays can never be
//! visible together. The machine is cyclic and lives for the whole session.

use tableside_core::MenuItem;

/// The single currently-visible overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// No overlay; the menu is browsable.
    #[default]
    Idle,
    /// The cart overlay.
    CartOpen,
    /// The checkout overlay.
    CheckoutOpen,
    /// The detail overlay for one selected item. The selection is only
    /// meaningful in this state and is dropped on leaving it.
    ItemDetail(MenuItem),
}

/// Drives [`ViewState`] through its enumerated transitions.
///
/// Events that the transition table does not allow from the current state
/// are ignored (the overlays' own controls only fire legal events; a stray
/// event must not corrupt the single-overlay invariant).
#[derive(Debug, Clone, Default)]
pub struct ViewStateMachine {
    state: ViewState,
}

impl ViewStateMachine {
    /// Start in `Idle`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ViewState::Idle,
        }
    }

    /// The currently active state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// Open the cart overlay. Legal from any state.
    pub fn show_cart(&mut self) {
        self.state = ViewState::CartOpen;
    }

    /// Close the cart overlay.
    pub fn hide_cart(&mut self) {
        if self.state == ViewState::CartOpen {
            self.state = ViewState::Idle;
        }
    }

    /// Move from the cart to checkout.
    pub fn go_to_checkout(&mut self) {
        if self.state == ViewState::CartOpen {
            self.state = ViewState::CheckoutOpen;
        }
    }

    /// Close the checkout overlay.
    pub fn hide_checkout(&mut self) {
        if self.state == ViewState::CheckoutOpen {
            self.state = ViewState::Idle;
        }
    }

    /// Return from checkout to the cart.
    pub fn go_back_to_cart(&mut self) {
        if self.state == ViewState::CheckoutOpen {
            self.state = ViewState::CartOpen;
        }
    }

    /// A finished order leaves checkout for `Idle`.
    pub fn complete_order(&mut self) {
        if self.state == ViewState::CheckoutOpen {
            self.state = ViewState::Idle;
        }
    }

    /// Open the detail overlay for `item`. Legal from any state; selecting
    /// a new item while already in detail simply replaces the selection.
    pub fn show_item_detail(&mut self, item: MenuItem) {
        self.state = ViewState::ItemDetail(item);
    }

    /// Close the detail overlay, dropping the selection.
    pub fn hide_item_detail(&mut self) {
        if matches!(self.state, ViewState::ItemDetail(_)) {
            self.state = ViewState::Idle;
        }
    }
}
