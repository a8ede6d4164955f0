//! Customer details collected on the checkout form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Customer details attached to an order draft.
///
/// Every field is required. The core enforces non-empty-after-trim only;
/// deeper format validation (email syntax and the like) belongs to the UI
/// layer. The wire key for the postal code is `postal-code`, matching the
/// checkout form field it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub street: String,
    #[serde(rename = "postal-code")]
    pub postal_code: String,
    pub city: String,
}

impl CustomerInfo {
    /// Returns the required fields that are empty after trimming.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<CustomerField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(CustomerField::Name);
        }
        if self.email.trim().is_empty() {
            missing.push(CustomerField::Email);
        }
        if self.street.trim().is_empty() {
            missing.push(CustomerField::Street);
        }
        if self.postal_code.trim().is_empty() {
            missing.push(CustomerField::PostalCode);
        }
        if self.city.trim().is_empty() {
            missing.push(CustomerField::City);
        }
        missing
    }

    /// True when every required field is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A required field of [`CustomerInfo`], used to report which fields are
/// missing from a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerField {
    Name,
    Email,
    Street,
    PostalCode,
    City,
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Name => "full name",
            Self::Email => "e-mail address",
            Self::Street => "street",
            Self::PostalCode => "postal code",
            Self::City => "city",
        };
        write!(f, "{label}")
    }
}
