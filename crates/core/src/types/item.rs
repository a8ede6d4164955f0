//! Orderable menu items supplied by the catalog collaborator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ItemId;

/// A catalog entry that can be added to a cart.
///
/// Items are owned by the external catalog; once fetched they are treated as
/// immutable and referenced (not copied-and-mutated) by cart entries. The
/// catalog serializes prices as JSON strings, hence `serde-with-str` on
/// [`Decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable, unique catalog identifier.
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Image reference, relative to the catalog host.
    pub image: String,
    /// Unit price in major currency units. Non-negative.
    pub price: Decimal,
}
