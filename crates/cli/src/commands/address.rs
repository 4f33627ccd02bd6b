//! Address book commands.
//!
//! # Usage
//!
//! ```bash
//! gl-cli address add -e customer@example.com -t billing --json '{"first_name":"Ada","city":"London","country":"GB"}'
//! gl-cli address set-default -e customer@example.com -t shipping --id 12
//! gl-cli address list -e customer@example.com
//! ```

use greenleaf_accounts::db::AddressRepository;
use greenleaf_accounts::services::{AddressBookService, AddressNormalizer, ExtensionsManager};
use greenleaf_core::{AddressData, AddressId, AddressType};

use super::{CommandError, connect, find_user};

fn extensions() -> ExtensionsManager {
    ExtensionsManager::new().with_plugin(AddressNormalizer)
}

/// Store an address in the user's address book.
pub async fn add(email: &str, address_type: AddressType, json: &str) -> Result<(), CommandError> {
    let data: AddressData = serde_json::from_str(json)
        .map_err(|e| CommandError::InvalidInput(format!("address JSON: {e}")))?;

    let (_, pool) = connect().await?;
    let mut user = find_user(&pool, email).await?;
    let extensions = extensions();

    let address = AddressBookService::new(&pool, &extensions)
        .store_user_address(&mut user, data, address_type)
        .await?;

    let is_default = user.default_address_id(address_type) == Some(address.id);
    tracing::info!(
        "Stored address {} for {} ({address_type}{})",
        address.id,
        user.email,
        if is_default { ", default" } else { "" }
    );
    Ok(())
}

/// Make an existing address the user's default of the given type.
pub async fn set_default(email: &str, address_type: AddressType, id: i32) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;
    let mut user = find_user(&pool, email).await?;

    let address = AddressRepository::new(&pool)
        .get_by_id(AddressId::new(id))
        .await?
        .ok_or_else(|| CommandError::InvalidInput(format!("no address with id {id}")))?;

    let extensions = extensions();
    let address = AddressBookService::new(&pool, &extensions)
        .change_user_default_address(&mut user, address, address_type)
        .await?;

    tracing::info!(
        "Default {address_type} address for {} is now {}",
        user.email,
        address.id
    );
    Ok(())
}

/// List the user's address book.
pub async fn list(email: &str) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;
    let user = find_user(&pool, email).await?;

    let addresses = AddressRepository::new(&pool).list_for_user(user.id).await?;
    tracing::info!("{} address(es) for {}", addresses.len(), user.email);

    for address in addresses {
        let mut marks = Vec::new();
        if user.default_billing_address_id == Some(address.id) {
            marks.push("default billing");
        }
        if user.default_shipping_address_id == Some(address.id) {
            marks.push("default shipping");
        }
        let data = &address.data;
        tracing::info!(
            "  [{}] {} {}, {}, {} {} {} {}",
            address.id,
            data.first_name,
            data.last_name,
            data.street_address_1,
            data.postal_code,
            data.city,
            data.country,
            marks.join(", ")
        );
    }
    Ok(())
}
