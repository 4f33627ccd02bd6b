//! Postal address values.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which checkout role an address plays for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Billing,
    Shipping,
}

impl AddressType {
    /// The lowercase name used in forms and query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Shipping => "shipping",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an address type string that is neither billing nor shipping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown address type: {0} (expected billing or shipping)")]
pub struct AddressTypeError(pub String);

impl FromStr for AddressType {
    type Err = AddressTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "billing" => Ok(Self::Billing),
            "shipping" => Ok(Self::Shipping),
            _ => Err(AddressTypeError(s.to_owned())),
        }
    }
}

/// Every field of an address except its identity.
///
/// Address books are deduplicated on this value: two stored addresses with
/// equal `AddressData` are the same address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressData {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub street_address_1: String,
    pub street_address_2: String,
    pub city: String,
    pub city_area: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub country_area: String,
    pub phone: String,
}

impl AddressData {
    /// Trim surrounding whitespace from every field and upper-case the
    /// country code.
    #[must_use]
    pub fn normalized(self) -> Self {
        let trim = |s: String| -> String {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                s
            } else {
                trimmed.to_owned()
            }
        };

        Self {
            first_name: trim(self.first_name),
            last_name: trim(self.last_name),
            company_name: trim(self.company_name),
            street_address_1: trim(self.street_address_1),
            street_address_2: trim(self.street_address_2),
            city: trim(self.city),
            city_area: trim(self.city_area),
            postal_code: trim(self.postal_code),
            country: self.country.trim().to_ascii_uppercase(),
            country_area: trim(self.country_area),
            phone: trim(self.phone),
        }
    }
}
