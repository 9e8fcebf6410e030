//! Entities shared by the storage, domain and HTTP layers.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, PvzId, ReceptionId, UserId};

/// Returned when a stored or submitted value names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the wire/database representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// The three cities pickup points may be opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "Москва")]
    Moscow,
    #[serde(rename = "Санкт-Петербург")]
    SaintPetersburg,
    #[serde(rename = "Казань")]
    Kazan,
}

text_enum!(City, "city", {
    Moscow => "Москва",
    SaintPetersburg => "Санкт-Петербург",
    Kazan => "Казань",
});

/// Reception lifecycle status.
///
/// ```text
/// in_progress ──close──► close
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceptionStatus {
    /// Products may be added and removed.
    InProgress,
    /// Terminal; the reception's products are frozen.
    Close,
}

text_enum!(ReceptionStatus, "reception status", {
    InProgress => "in_progress",
    Close => "close",
});

impl ReceptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ReceptionStatus::InProgress)
    }
}

/// Product categories accepted at a pickup point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "электроника")]
    Electronics,
    #[serde(rename = "одежда")]
    Clothes,
    #[serde(rename = "обувь")]
    Shoes,
}

text_enum!(ProductType, "product type", {
    Electronics => "электроника",
    Clothes => "одежда",
    Shoes => "обувь",
});

/// Account role. Employees run receptions, moderators manage pickup points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Employee,
    Moderator,
}

text_enum!(UserRole, "user role", {
    Employee => "employee",
    Moderator => "moderator",
});

/// A pickup point. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pvz {
    pub id: PvzId,
    pub city: City,
    pub registered_at: DateTime<Utc>,
}

/// A goods-intake session at a pickup point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reception {
    pub id: ReceptionId,
    pub pvz_id: PvzId,
    pub status: ReceptionStatus,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a reception; status and timestamp are assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewReception {
    pub id: ReceptionId,
    pub pvz_id: PvzId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub reception_id: ReceptionId,
    pub product_type: ProductType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
    pub token: String,
}

/// A reception together with the products that matched a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceptionProducts {
    pub reception: Reception,
    pub products: Vec<Product>,
}

/// A pickup point with its matching receptions, as returned by the listing search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PvzReceptions {
    pub pvz: Pvz,
    pub receptions: Vec<ReceptionProducts>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_round_trips_through_text() {
        for city in City::ALL {
            assert_eq!(city.as_str().parse::<City>().unwrap(), *city);
        }
    }

    #[test]
    fn unknown_city_is_rejected() {
        let err = "Новосибирск".parse::<City>().unwrap_err();
        assert_eq!(err.kind, "city");
        assert!(err.to_string().contains("Новосибирск"));
    }

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&City::Kazan).unwrap(), "\"Казань\"");
        assert_eq!(
            serde_json::to_string(&ReceptionStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<ProductType>("\"обувь\"").unwrap(),
            ProductType::Shoes
        );
        assert_eq!(
            serde_json::from_str::<UserRole>("\"moderator\"").unwrap(),
            UserRole::Moderator
        );
    }

    #[test]
    fn only_in_progress_is_active() {
        assert!(ReceptionStatus::InProgress.is_active());
        assert!(!ReceptionStatus::Close.is_active());
    }
}
