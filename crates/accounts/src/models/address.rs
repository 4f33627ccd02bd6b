//! Stored address.

use serde::{Deserialize, Serialize};

use greenleaf_core::{AddressData, AddressId};

/// An address row: its identity plus its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(flatten)]
    pub data: AddressData,
}
