//! Identifier newtypes and small value objects for the order domain.

use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::money::Currency;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Identifier of an order line.
    LineId
}

string_id! {
    /// Identifier of a fulfillment.
    FulfillmentId
}

string_id! {
    /// Identifier of a single line within a fulfillment.
    FulfillmentLineId
}

string_id! {
    /// Identifier of an order-level discount.
    DiscountId
}

string_id! {
    /// Identifier of a warehouse.
    WarehouseId
}

/// The warehouse a fulfillment ships from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
}

impl Warehouse {
    /// Creates a new warehouse reference.
    pub fn new(id: impl Into<WarehouseId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Reference to the user who performed an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub email: String,
}

impl UserRef {
    /// Creates a new user reference.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Weak reference to another order (e.g. a replacement order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub id: OrderId,
    pub number: Option<String>,
}

/// The sales channel an order belongs to.
///
/// The channel's currency is the currency of every monetary amount on
/// the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub currency_code: Currency,
    pub is_active: bool,
}

impl Channel {
    /// Creates an active channel in the given currency.
    pub fn new(currency_code: Currency) -> Self {
        Self {
            currency_code,
            is_active: true,
        }
    }
}
