//! Address Data

use crate::domain::addresses::records::AddressUuid;

/// New Address Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub uuid: AddressUuid,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,

    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}
