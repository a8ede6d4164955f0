//! Tableside Orderflow - Client-resident order lifecycle core.
//!
//! This library coordinates everything between "user taps a menu item" and
//! "order confirmed": the cart, the single visible overlay, and the
//! asynchronous checkout pipeline that spans order creation, the external
//! payment provider, payment verification, and the confirmation email.
//!
//! # Architecture
//!
//! - [`cart`] - Ordered multiset of line items with a derived total
//! - [`view`] - Which single overlay (cart, checkout, item detail) is open
//! - [`checkout`] - The multi-stage checkout orchestrator
//! - [`backend`] - Typed client for the order/payment/email endpoints
//! - [`http`] - Pending/Success/Failed request lifecycle tracking
//! - [`catalog`] - Cached read-only menu fetch
//! - [`email`] - Confirmation email rendering and dispatch
//! - [`session`] - One handle bundling the process-wide state
//!
//! The core never renders anything; UI collaborators read the exposed state
//! and call the enumerated mutation APIs. There is no server in this crate
//! and nothing outlives the session.
//!
//! # Example
//!
//! ```rust,ignore
//! use tableside_orderflow::backend::HttpBackend;
//! use tableside_orderflow::config::OrderflowConfig;
//! use tableside_orderflow::session::Session;
//!
//! let config = OrderflowConfig::from_env()?;
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let session = Session::new(backend, config.currency);
//!
//! session.state().with_cart(|cart| cart.add_item(&item));
//! session.state().with_view(|view| view.show_cart());
//! let outcome = session.checkout().submit(customer).await?;
//! // hand `intent` to the provider widget; its callback feeds
//! // session.checkout().handle_provider_callback(payload).await
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod email;
pub mod error;
pub mod http;
pub mod session;
pub mod view;

pub use error::{CheckoutError, ErrorKind};
pub use session::Session;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a tracing subscriber honoring `RUST_LOG`.
///
/// Host applications that already configure tracing should skip this; it is
/// a convenience for examples and small embedders. Calling it twice panics,
/// as registering two global subscribers would.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
