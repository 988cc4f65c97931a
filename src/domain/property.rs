use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    SmallMeter,
    MediumMeter,
    LargeMeter,
}

impl PaymentType {
    /// Monthly obligation for this meter tier, in minor currency units.
    pub fn required_amount(self) -> i64 {
        match self {
            PaymentType::SmallMeter => 5_000,
            PaymentType::MediumMeter => 10_000,
            PaymentType::LargeMeter => 15_000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentType::SmallMeter => "SMALL_METER",
            PaymentType::MediumMeter => "MEDIUM_METER",
            PaymentType::LargeMeter => "LARGE_METER",
        }
    }

    /// Unknown tier text falls back to the smallest meter.
    pub fn from_db(s: &str) -> PaymentType {
        match s {
            "MEDIUM_METER" => PaymentType::MediumMeter,
            "LARGE_METER" => PaymentType::LargeMeter,
            _ => PaymentType::SmallMeter,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighborhood {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    pub id: Uuid,
    pub name: String,
    pub neighborhood_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: Uuid,
    pub house_number: String,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub is_occupied: bool,
    pub has_paid: bool,
    pub payment_type: PaymentType,
    pub required_amount: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_payment_date: Option<OffsetDateTime>,
    pub receipt_image: Option<String>,
    pub square_id: Uuid,
}
