use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Load lifecycle states. Transitions are not constrained: any state may be
/// set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum LoadStatus {
    #[default]
    Draft,
    Scheduled,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
    Cancelled,
}

impl LoadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadStatus::Draft => "Draft",
            LoadStatus::Scheduled => "Scheduled",
            LoadStatus::InTransit => "In Transit",
            LoadStatus::Delivered => "Delivered",
            LoadStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(LoadStatus::Draft),
            "Scheduled" => Ok(LoadStatus::Scheduled),
            "In Transit" => Ok(LoadStatus::InTransit),
            "Delivered" => Ok(LoadStatus::Delivered),
            "Cancelled" => Ok(LoadStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LoadRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub reference_number: String,
    pub customer_rate: Option<Decimal>,
    pub contact_name: String,
    pub carrier: Option<String>,
    pub carrier_payment_method: Option<String>,
    pub carrier_rate: Decimal,
    pub charge_service_fee_to_office: bool,
    pub load_type: String,
    pub service_type: String,
    pub service_given_as: String,
    pub commodity: String,
    pub booked_as: String,
    pub sold_as: String,
    pub weight: String,
    pub temperature: Option<String>,
    pub pickup_city_zip_code: Option<String>,
    pub pickup_phone: String,
    pub pickup_carrier: String,
    pub pickup_name: String,
    pub pickup_address: String,
    pub dropoff_city_zip_code: Option<String>,
    pub dropoff_phone: String,
    pub dropoff_carrier: String,
    pub dropoff_name: String,
    pub dropoff_address: String,
    pub branch_id: Uuid,
    pub status: String,
    pub status_changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A load's link to a file, joined with the file name
#[derive(Debug, Clone, FromRow)]
pub struct LoadFileRow {
    pub load_id: Uuid,
    pub file_id: Uuid,
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tokens_round_trip_through_text() {
        for status in [
            LoadStatus::Draft,
            LoadStatus::Scheduled,
            LoadStatus::InTransit,
            LoadStatus::Delivered,
            LoadStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<LoadStatus>(), Ok(status));
        }
    }

    #[test]
    fn in_transit_serializes_with_a_space() {
        assert_eq!(
            serde_json::to_string(&LoadStatus::InTransit).unwrap(),
            r#""In Transit""#
        );
    }

    #[test]
    fn default_status_is_draft() {
        assert_eq!(LoadStatus::default(), LoadStatus::Draft);
    }
}
