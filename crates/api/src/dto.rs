//! Wire representations. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use common::{
    City, Product, ProductId, ProductType, Pvz, PvzId, PvzReceptions, Reception, ReceptionId,
    ReceptionProducts, ReceptionStatus, User, UserId, UserRole,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PvzDto {
    pub id: PvzId,
    pub city: City,
    pub registration_date: DateTime<Utc>,
}

impl From<Pvz> for PvzDto {
    fn from(pvz: Pvz) -> Self {
        Self {
            id: pvz.id,
            city: pvz.city,
            registration_date: pvz.registered_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionDto {
    pub id: ReceptionId,
    pub date_time: DateTime<Utc>,
    pub pvz_id: PvzId,
    pub status: ReceptionStatus,
}

impl From<Reception> for ReceptionDto {
    fn from(reception: Reception) -> Self {
        Self {
            id: reception.id,
            date_time: reception.created_at,
            pvz_id: reception.pvz_id,
            status: reception.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub reception_id: ReceptionId,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            date_time: product.created_at,
            product_type: product.product_type,
            reception_id: product.reception_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceptionProductsDto {
    pub reception: ReceptionDto,
    pub products: Vec<ProductDto>,
}

impl From<ReceptionProducts> for ReceptionProductsDto {
    fn from(group: ReceptionProducts) -> Self {
        Self {
            reception: group.reception.into(),
            products: group.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PvzReceptionsDto {
    pub pvz: PvzDto,
    pub receptions: Vec<ReceptionProductsDto>,
}

impl From<PvzReceptions> for PvzReceptionsDto {
    fn from(group: PvzReceptions) -> Self {
        Self {
            pvz: group.pvz.into(),
            receptions: group.receptions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn product_uses_wire_field_names() {
        let product = Product {
            id: ProductId::new(),
            reception_id: ReceptionId::new(),
            product_type: ProductType::Electronics,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(ProductDto::from(product.clone())).unwrap();

        assert_eq!(value["type"], json!("электроника"));
        assert_eq!(value["receptionId"], json!(product.reception_id.to_string()));
        assert!(value.get("dateTime").is_some());
    }

    #[test]
    fn pvz_uses_registration_date() {
        let pvz = Pvz {
            id: PvzId::new(),
            city: City::SaintPetersburg,
            registered_at: Utc::now(),
        };
        let value = serde_json::to_value(PvzDto::from(pvz)).unwrap();

        assert_eq!(value["city"], json!("Санкт-Петербург"));
        assert!(value.get("registrationDate").is_some());
    }
}
