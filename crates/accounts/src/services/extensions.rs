//! Plugin hooks for account operations.
//!
//! Installed plugins may rewrite an address before it is stored in a
//! user's address book or made one of their defaults (tax providers
//! validating a shipping address, normalizers, and so on).

use std::fmt;
use std::sync::Arc;

use greenleaf_core::{AddressData, AddressType};

use crate::models::User;

/// A plugin that can take part in account operations.
pub trait AccountPlugin: Send + Sync {
    /// Name shown in logs.
    fn name(&self) -> &'static str;

    /// Rewrite an address about to be saved for `user` as `address_type`.
    ///
    /// The default leaves the address unchanged.
    fn change_user_address(
        &self,
        address: AddressData,
        _address_type: AddressType,
        _user: &User,
    ) -> AddressData {
        address
    }
}

/// Ordered set of installed plugins.
///
/// Each hook passes the value through every plugin in installation order,
/// feeding one plugin's output to the next.
#[derive(Clone, Default)]
pub struct ExtensionsManager {
    plugins: Vec<Arc<dyn AccountPlugin>>,
}

impl ExtensionsManager {
    /// A manager with no plugins; every hook is the identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a plugin after the ones already present.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl AccountPlugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Run the `change_user_address` hook.
    #[must_use]
    pub fn change_user_address(
        &self,
        address: AddressData,
        address_type: AddressType,
        user: &User,
    ) -> AddressData {
        self.plugins.iter().fold(address, |address, plugin| {
            tracing::trace!(plugin = plugin.name(), %address_type, "change_user_address");
            plugin.change_user_address(address, address_type, user)
        })
    }
}

impl fmt::Debug for ExtensionsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

/// Trims every address field and upper-cases the country code.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressNormalizer;

impl AccountPlugin for AddressNormalizer {
    fn name(&self) -> &'static str {
        "address-normalizer"
    }

    fn change_user_address(
        &self,
        address: AddressData,
        _address_type: AddressType,
        _user: &User,
    ) -> AddressData {
        address.normalized()
    }
}
