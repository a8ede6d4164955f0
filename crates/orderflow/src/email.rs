//! Confirmation email rendering and dispatch.
//!
//! The email body is rendered from an Askama HTML template and posted to the
//! backend's email endpoint, which owns actual delivery. Dispatch is best
//! effort: the orchestrator logs failures and never lets them reverse a
//! confirmed order.

use askama::Template;
use thiserror::Error;
use tracing::debug;

use tableside_core::{CurrencyCode, CustomerInfo, OrderDraft, format_price};

use crate::backend::{BackendError, OrderBackend};

/// Errors that can occur while producing or dispatching the email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Template rendering failed.
    #[error("Failed to render email: {0}")]
    Render(#[from] askama::Error),

    /// The email endpoint rejected the dispatch.
    #[error("Failed to dispatch email: {0}")]
    Dispatch(#[from] BackendError),
}

/// One bill row in the confirmation email.
struct EmailLine {
    name: String,
    quantity: u32,
    amount: String,
}

/// HTML template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationEmail<'a> {
    customer: &'a CustomerInfo,
    lines: Vec<EmailLine>,
    total: String,
}

/// Render the confirmation email body for an order draft.
///
/// # Errors
///
/// Returns an error if template rendering fails.
pub fn render_confirmation(
    draft: &OrderDraft,
    currency: CurrencyCode,
) -> Result<String, EmailError> {
    let template = OrderConfirmationEmail {
        customer: &draft.customer,
        lines: draft
            .items
            .iter()
            .map(|line| EmailLine {
                name: line.item.name.clone(),
                quantity: line.quantity,
                amount: format_price(line.line_total(), currency),
            })
            .collect(),
        total: format_price(draft.total(), currency),
    };
    Ok(template.render()?)
}

/// Render and post the confirmation email for a finalized order.
///
/// # Errors
///
/// Returns an error if rendering or the dispatch request fails. Callers
/// treat this as non-fatal.
pub async fn dispatch_confirmation(
    backend: &dyn OrderBackend,
    draft: &OrderDraft,
    currency: CurrencyCode,
) -> Result<(), EmailError> {
    let body = render_confirmation(draft, currency)?;
    backend
        .send_confirmation_email(&draft.customer.email, &body)
        .await?;
    debug!(email = %draft.customer.email, "confirmation email dispatched");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tableside_core::{CartLine, ItemId, MenuItem};

    fn draft() -> OrderDraft {
        OrderDraft {
            items: vec![CartLine {
                item: MenuItem {
                    id: ItemId::new("m1"),
                    name: "Mac & Cheese".to_owned(),
                    description: String::new(),
                    image: "images/mac-and-cheese.jpg".to_owned(),
                    price: Decimal::new(1000, 2),
                },
                quantity: 2,
            }],
            customer: CustomerInfo {
                name: "Ada Lovelace".to_owned(),
                email: "ada@example.com".to_owned(),
                street: "12 Analytical Ln".to_owned(),
                postal_code: "12345".to_owned(),
                city: "London".to_owned(),
            },
        }
    }

    #[test]
    fn test_render_includes_customer_and_bill() {
        let html = render_confirmation(&draft(), CurrencyCode::USD).unwrap();

        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("12 Analytical Ln"));
        // Item name is HTML-escaped by the template engine.
        assert!(html.contains("Mac &amp; Cheese"));
        assert!(html.contains("$20.00"));
    }

    #[test]
    fn test_render_one_row_per_line() {
        let mut order = draft();
        order.items.push(CartLine {
            item: MenuItem {
                id: ItemId::new("m2"),
                name: "Pizza".to_owned(),
                description: String::new(),
                image: "images/pizza.jpg".to_owned(),
                price: Decimal::new(550, 2),
            },
            quantity: 1,
        });

        let html = render_confirmation(&order, CurrencyCode::USD).unwrap();
        assert!(html.contains("Pizza"));
        assert!(html.contains("$5.50"));
        assert!(html.contains("$25.50"));
    }
}
