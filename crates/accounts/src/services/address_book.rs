//! Address book and default address management.

use sqlx::PgPool;
use tracing::{debug, info};

use greenleaf_core::{AddressData, AddressType};

use super::{AccountError, ExtensionsManager};
use crate::db::{AddressRepository, RepositoryError, UserRepository};
use crate::models::{Address, User, display_first_name, display_last_name};

/// Manages the addresses a user has saved and which ones are their
/// checkout defaults.
pub struct AddressBookService<'a> {
    users: UserRepository<'a>,
    addresses: AddressRepository<'a>,
    extensions: &'a ExtensionsManager,
}

impl<'a> AddressBookService<'a> {
    /// Create a new address book service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, extensions: &'a ExtensionsManager) -> Self {
        Self {
            users: UserRepository::new(pool),
            addresses: AddressRepository::new(pool),
            extensions,
        }
    }

    /// Save an address to the user's address book.
    ///
    /// The address first goes through the `change_user_address` plugin
    /// hook. If the book already holds an identical address that one is
    /// reused, otherwise a new one is added. The stored address then
    /// becomes the user's default of `address_type`, but only when the user
    /// has no default of that type yet.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if a database operation fails.
    pub async fn store_user_address(
        &self,
        user: &mut User,
        address: AddressData,
        address_type: AddressType,
    ) -> Result<Address, AccountError> {
        let data = self
            .extensions
            .change_user_address(address, address_type, user);

        let address = match self.addresses.find_in_address_book(user.id, &data).await? {
            Some(existing) => {
                debug!(user_id = %user.id, address_id = %existing.id, "address already in address book");
                existing
            }
            None => {
                let created = self.addresses.create_in_address_book(user.id, &data).await?;
                info!(user_id = %user.id, address_id = %created.id, "address added to address book");
                created
            }
        };

        if user.default_address_id(address_type).is_none() {
            self.set_default(user, &address, address_type).await?;
        }

        Ok(address)
    }

    /// Make `address` the user's default billing address.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the user no longer exists.
    /// Returns `AccountError::Repository` if the update fails.
    pub async fn set_user_default_billing_address(
        &self,
        user: &mut User,
        address: &Address,
    ) -> Result<(), AccountError> {
        self.set_default(user, address, AddressType::Billing).await
    }

    /// Make `address` the user's default shipping address.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the user no longer exists.
    /// Returns `AccountError::Repository` if the update fails.
    pub async fn set_user_default_shipping_address(
        &self,
        user: &mut User,
        address: &Address,
    ) -> Result<(), AccountError> {
        self.set_default(user, address, AddressType::Shipping).await
    }

    /// Replace the user's default address of `address_type`.
    ///
    /// The address goes through the `change_user_address` hook first, and
    /// any rewrite is saved back to it. The previous default, if any, is
    /// kept in the address book so it is not lost.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AddressNotFound` if `address` no longer exists.
    /// Returns `AccountError::UserNotFound` if the user no longer exists.
    /// Returns `AccountError::Repository` if a database operation fails.
    pub async fn change_user_default_address(
        &self,
        user: &mut User,
        address: Address,
        address_type: AddressType,
    ) -> Result<Address, AccountError> {
        let data = self
            .extensions
            .change_user_address(address.data.clone(), address_type, user);

        let address = if data == address.data {
            address
        } else {
            self.addresses
                .update(address.id, &data)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => AccountError::AddressNotFound,
                    other => other.into(),
                })?
        };

        if let Some(previous) = user.default_address_id(address_type) {
            self.addresses.add_to_address_book(user.id, previous).await?;
        }

        self.set_default(user, &address, address_type).await?;
        Ok(address)
    }

    /// First name to greet the user with, falling back to the name on
    /// their default billing address.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if loading the address fails.
    pub async fn user_first_name(&self, user: &User) -> Result<Option<String>, AccountError> {
        let billing = self.default_billing(user).await?;
        Ok(display_first_name(user, billing.as_ref()).map(str::to_owned))
    }

    /// Last name counterpart of [`Self::user_first_name`].
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if loading the address fails.
    pub async fn user_last_name(&self, user: &User) -> Result<Option<String>, AccountError> {
        let billing = self.default_billing(user).await?;
        Ok(display_last_name(user, billing.as_ref()).map(str::to_owned))
    }

    async fn default_billing(&self, user: &User) -> Result<Option<Address>, AccountError> {
        // Skip the query when the user's own names make the address moot.
        if !user.first_name.is_empty() && !user.last_name.is_empty() {
            return Ok(None);
        }
        match user.default_billing_address_id {
            Some(id) => Ok(self.addresses.get_by_id(id).await?),
            None => Ok(None),
        }
    }

    async fn set_default(
        &self,
        user: &mut User,
        address: &Address,
        address_type: AddressType,
    ) -> Result<(), AccountError> {
        self.users
            .set_default_address(user.id, address_type, address.id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AccountError::UserNotFound,
                other => other.into(),
            })?;

        user.set_default_address_id(address_type, address.id);
        info!(
            user_id = %user.id,
            address_id = %address.id,
            %address_type,
            "default address set"
        );
        Ok(())
    }
}
