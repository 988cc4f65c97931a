use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::property::{House, Neighborhood, PaymentType, Square};
use crate::domain::user::{Role, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Storage failures, resolved to kinds at this boundary. Nothing above this
/// layer inspects database-native error codes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("duplicate key")]
    Duplicate,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct NewHouse {
    pub house_number: String,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub is_occupied: bool,
    pub has_paid: bool,
    pub payment_type: PaymentType,
    pub required_amount: i64,
    pub receipt_image: Option<String>,
    pub square_id: Uuid,
}

/// Partial update for a house. `None` leaves the column untouched; the nested
/// options carry an explicit NULL for nullable columns.
#[derive(Debug, Clone, Default)]
pub struct HouseUpdate {
    pub house_number: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<Option<String>>,
    pub is_occupied: Option<bool>,
    pub has_paid: Option<bool>,
    pub payment_type: Option<PaymentType>,
    pub required_amount: Option<i64>,
    pub last_payment_date: Option<Option<OffsetDateTime>>,
    pub receipt_image: Option<Option<String>>,
}

impl HouseUpdate {
    /// The monthly reset: obligation recomputed, payment state cleared.
    pub fn billing_reset(required_amount: i64) -> Self {
        Self {
            has_paid: Some(false),
            last_payment_date: Some(None),
            required_amount: Some(required_amount),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.house_number.is_none()
            && self.owner_name.is_none()
            && self.owner_phone.is_none()
            && self.is_occupied.is_none()
            && self.has_paid.is_none()
            && self.payment_type.is_none()
            && self.required_amount.is_none()
            && self.last_payment_date.is_none()
            && self.receipt_image.is_none()
    }
}

#[async_trait]
pub trait PropertyCatalog: Send + Sync {
    async fn list_neighborhoods(&self) -> Result<Vec<Neighborhood>, StoreError>;
    async fn create_neighborhood(&self, name: &str) -> Result<Neighborhood, StoreError>;
    async fn list_squares(&self, neighborhood_id: Uuid) -> Result<Vec<Square>, StoreError>;
    async fn create_square(&self, name: &str, neighborhood_id: Uuid)
        -> Result<Square, StoreError>;
    async fn list_houses(&self, square_id: Uuid) -> Result<Vec<House>, StoreError>;
    async fn find_house(&self, id: Uuid) -> Result<Option<House>, StoreError>;
    async fn house_number_taken(
        &self,
        square_id: Uuid,
        house_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;
    async fn create_house(&self, house: NewHouse) -> Result<House, StoreError>;
    async fn update_house(&self, id: Uuid, patch: HouseUpdate) -> Result<(), StoreError>;
    async fn delete_house(&self, id: Uuid) -> Result<(), StoreError>;
    async fn list_occupied_houses(&self) -> Result<Vec<House>, StoreError>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, StoreError>;
}
