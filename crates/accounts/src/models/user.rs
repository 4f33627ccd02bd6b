//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use greenleaf_core::{AddressId, AddressType, Email, UserId};

use super::address::Address;

/// A storefront account: customers and staff share this type.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, normalized.
    pub email: Email,
    /// Given name; may be empty.
    pub first_name: String,
    /// Family name; may be empty.
    pub last_name: String,
    /// Whether the account may use the dashboard.
    pub is_staff: bool,
    /// Whether the account may log in at all.
    pub is_active: bool,
    /// Whether the account implicitly holds every permission.
    pub is_superuser: bool,
    /// Stored avatar name relative to the media root.
    pub avatar: Option<String>,
    /// Address pre-selected for billing at checkout.
    pub default_billing_address_id: Option<AddressId>,
    /// Address pre-selected for shipping at checkout.
    pub default_shipping_address_id: Option<AddressId>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The default address of the given type, if one is set.
    #[must_use]
    pub const fn default_address_id(&self, address_type: AddressType) -> Option<AddressId> {
        match address_type {
            AddressType::Billing => self.default_billing_address_id,
            AddressType::Shipping => self.default_shipping_address_id,
        }
    }

    pub(crate) const fn set_default_address_id(
        &mut self,
        address_type: AddressType,
        address_id: AddressId,
    ) {
        match address_type {
            AddressType::Billing => self.default_billing_address_id = Some(address_id),
            AddressType::Shipping => self.default_shipping_address_id = Some(address_id),
        }
    }
}

/// First name to greet `user` with.
///
/// The account's own first name wins; otherwise the name on its default
/// billing address is used. `default_billing` must be that address (or
/// `None` when the user has none).
#[must_use]
pub fn display_first_name<'a>(user: &'a User, default_billing: Option<&'a Address>) -> Option<&'a str> {
    pick_name(&user.first_name, default_billing.map(|a| a.data.first_name.as_str()))
}

/// Last name counterpart of [`display_first_name`].
#[must_use]
pub fn display_last_name<'a>(user: &'a User, default_billing: Option<&'a Address>) -> Option<&'a str> {
    pick_name(&user.last_name, default_billing.map(|a| a.data.last_name.as_str()))
}

fn pick_name<'a>(own: &'a str, from_billing: Option<&'a str>) -> Option<&'a str> {
    if !own.is_empty() {
        return Some(own);
    }
    from_billing.filter(|name| !name.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use greenleaf_core::AddressData;

    use super::*;

    pub(crate) fn user(first_name: &str, last_name: &str) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("customer@example.com").unwrap(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            is_staff: false,
            is_active: true,
            is_superuser: false,
            avatar: None,
            default_billing_address_id: None,
            default_shipping_address_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn billing(first_name: &str, last_name: &str) -> Address {
        Address {
            id: AddressId::new(10),
            data: AddressData {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                ..AddressData::default()
            },
        }
    }

    #[test]
    fn test_own_name_wins_over_billing_address() {
        let user = user("Grace", "Hopper");
        let address = billing("Ada", "Lovelace");
        assert_eq!(display_first_name(&user, Some(&address)), Some("Grace"));
        assert_eq!(display_last_name(&user, Some(&address)), Some("Hopper"));
    }

    #[test]
    fn test_falls_back_to_billing_address() {
        let user = user("", "");
        let address = billing("Ada", "Lovelace");
        assert_eq!(display_first_name(&user, Some(&address)), Some("Ada"));
        assert_eq!(display_last_name(&user, Some(&address)), Some("Lovelace"));
    }

    #[test]
    fn test_nothing_without_name_or_billing_address() {
        let user = user("", "");
        assert_eq!(display_first_name(&user, None), None);
        assert_eq!(display_last_name(&user, Some(&billing("", ""))), None);
    }

    #[test]
    fn test_default_address_by_type() {
        let mut user = user("", "");
        user.set_default_address_id(AddressType::Shipping, AddressId::new(3));
        assert_eq!(user.default_address_id(AddressType::Shipping), Some(AddressId::new(3)));
        assert_eq!(user.default_address_id(AddressType::Billing), None);
    }
}
