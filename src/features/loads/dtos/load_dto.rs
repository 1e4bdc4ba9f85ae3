use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::loads::models::{LoadRow, LoadStatus};
use crate::shared::patch::Patch;
use crate::shared::types::{de_lenient, de_limit, de_page, default_limit, default_page, SortOrder};
use crate::shared::validation::empty_update_error;

/// Pickup/dropoff stop details as submitted on creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadLocationDto {
    #[validate(length(min = 1, message = "City / Zipcode is required"))]
    pub city_zip_code: String,

    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Carrier is required"))]
    pub carrier: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

/// Partial stop details for updates; only present fields change
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLoadLocationDto {
    pub city_zip_code: Option<String>,
    pub phone: Option<String>,
    pub carrier: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
}

impl UpdateLoadLocationDto {
    pub fn is_empty(&self) -> bool {
        self.city_zip_code.is_none()
            && self.phone.is_none()
            && self.carrier.is_none()
            && self.name.is_none()
            && self.address.is_none()
    }
}

/// File reference carried on a load payload. The name may be omitted for ids
/// that already exist as file rows; unseen ids need one so the row can be
/// created.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadFileDto {
    pub id: Uuid,

    #[validate(length(min = 1, message = "File name cannot be empty"))]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadFileResponseDto {
    pub id: Uuid,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoadDto {
    pub customer_id: Uuid,

    #[validate(length(min = 1, message = "Reference Number is required"))]
    pub reference_number: String,

    #[validate(range(min = 0.0, message = "Customer Rate cannot be negative"))]
    pub customer_rate: Option<f64>,

    #[validate(length(min = 1, message = "Contact Name is required"))]
    pub contact_name: String,

    #[validate(length(min = 1, message = "Carrier is required"))]
    pub carrier: String,

    pub carrier_payment_method: Option<String>,

    #[validate(range(min = 0.0, message = "Carrier Rate cannot be negative"))]
    pub carrier_rate: f64,

    pub charge_service_fee_to_office: Option<bool>,

    #[validate(length(min = 1, message = "Load Type is required"))]
    pub load_type: String,

    #[validate(length(min = 1, message = "Service Type is required"))]
    pub service_type: String,

    #[validate(length(min = 1, message = "Service Given As is required"))]
    pub service_given_as: String,

    #[validate(length(min = 1, message = "Commodity is required"))]
    pub commodity: String,

    #[validate(length(min = 1, message = "Booked As is required"))]
    pub booked_as: String,

    #[validate(length(min = 1, message = "Sold As is required"))]
    pub sold_as: String,

    #[validate(length(min = 1, message = "Weight is required"))]
    pub weight: String,

    pub temperature: Option<String>,

    #[validate(nested)]
    pub pickup: LoadLocationDto,

    #[validate(nested)]
    pub dropoff: LoadLocationDto,

    pub status: Option<LoadStatus>,

    #[validate(nested)]
    pub files: Option<Vec<LoadFileDto>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_load_update_has_fields))]
pub struct UpdateLoadDto {
    pub customer_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Reference Number cannot be empty"))]
    pub reference_number: Option<String>,

    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub customer_rate: Patch<f64>,

    pub contact_name: Option<String>,
    pub carrier: Option<String>,

    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub carrier_payment_method: Patch<String>,

    #[validate(range(min = 0.0, message = "Carrier Rate cannot be negative"))]
    pub carrier_rate: Option<f64>,
    pub charge_service_fee_to_office: Option<bool>,
    pub load_type: Option<String>,
    pub service_type: Option<String>,
    pub service_given_as: Option<String>,
    pub commodity: Option<String>,
    pub booked_as: Option<String>,
    pub sold_as: Option<String>,
    pub weight: Option<String>,

    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub temperature: Patch<String>,

    #[validate(nested)]
    pub pickup: Option<UpdateLoadLocationDto>,

    #[validate(nested)]
    pub dropoff: Option<UpdateLoadLocationDto>,

    pub branch_id: Option<Uuid>,

    #[validate(nested)]
    pub files: Option<Vec<LoadFileDto>>,
}

fn validate_load_update_has_fields(dto: &UpdateLoadDto) -> Result<(), validator::ValidationError> {
    // range() cannot see through the tri-state wrapper
    if let Patch::Value(rate) = dto.customer_rate {
        if rate < 0.0 {
            return Err(validator::ValidationError::new("range")
                .with_message("Customer Rate cannot be negative".into()));
        }
    }

    let pickup_touched = dto.pickup.as_ref().is_some_and(|p| !p.is_empty());
    let dropoff_touched = dto.dropoff.as_ref().is_some_and(|d| !d.is_empty());

    let has_any = dto.customer_id.is_some()
        || dto.reference_number.is_some()
        || dto.customer_rate.is_set()
        || dto.contact_name.is_some()
        || dto.carrier.is_some()
        || dto.carrier_payment_method.is_set()
        || dto.carrier_rate.is_some()
        || dto.charge_service_fee_to_office.is_some()
        || dto.load_type.is_some()
        || dto.service_type.is_some()
        || dto.service_given_as.is_some()
        || dto.commodity.is_some()
        || dto.booked_as.is_some()
        || dto.sold_as.is_some()
        || dto.weight.is_some()
        || dto.temperature.is_set()
        || pickup_touched
        || dropoff_touched
        || dto.branch_id.is_some()
        || dto.files.is_some();

    if !has_any {
        return Err(empty_update_error(
            "At least one field is required to update the load",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLoadStatusDto {
    pub status: LoadStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadLocationResponseDto {
    pub city_zip_code: Option<String>,
    pub phone: String,
    pub carrier: String,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponseDto {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub reference_number: String,
    pub customer_rate: Option<f64>,
    pub contact_name: String,
    pub carrier: Option<String>,
    pub carrier_payment_method: Option<String>,
    pub carrier_rate: f64,
    pub charge_service_fee_to_office: bool,
    pub load_type: String,
    pub service_type: String,
    pub service_given_as: String,
    pub commodity: String,
    pub booked_as: String,
    pub sold_as: String,
    pub weight: String,
    pub temperature: Option<String>,
    pub pickup: LoadLocationResponseDto,
    pub dropoff: LoadLocationResponseDto,
    pub branch_id: Uuid,
    pub status: LoadStatus,
    pub status_changed_by: Option<String>,
    pub files: Vec<LoadFileResponseDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoadResponseDto {
    pub fn from_row(row: LoadRow, files: Vec<LoadFileResponseDto>) -> Self {
        Self {
            id: row.id,
            customer_id: row.customer_id,
            reference_number: row.reference_number,
            customer_rate: row.customer_rate.and_then(|r| r.to_f64()),
            contact_name: row.contact_name,
            carrier: row.carrier,
            carrier_payment_method: row.carrier_payment_method,
            carrier_rate: row.carrier_rate.to_f64().unwrap_or(0.0),
            charge_service_fee_to_office: row.charge_service_fee_to_office,
            load_type: row.load_type,
            service_type: row.service_type,
            service_given_as: row.service_given_as,
            commodity: row.commodity,
            booked_as: row.booked_as,
            sold_as: row.sold_as,
            weight: row.weight,
            temperature: row.temperature,
            pickup: LoadLocationResponseDto {
                city_zip_code: row.pickup_city_zip_code,
                phone: row.pickup_phone,
                carrier: row.pickup_carrier,
                name: row.pickup_name,
                address: row.pickup_address,
            },
            dropoff: LoadLocationResponseDto {
                city_zip_code: row.dropoff_city_zip_code,
                phone: row.dropoff_phone,
                carrier: row.dropoff_carrier,
                name: row.dropoff_name,
                address: row.dropoff_address,
            },
            branch_id: row.branch_id,
            status: row.status.parse().unwrap_or_default(),
            status_changed_by: row.status_changed_by,
            files,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadDetailsResponseDto {
    pub load: LoadResponseDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadListResponseDto {
    pub loads: Vec<LoadResponseDto>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoadResponseDto {
    pub message: String,
    pub load_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLoadStatusResponseDto {
    pub message: String,
    pub load_id: Uuid,
    pub status: LoadStatus,
    pub status_changed_by: Option<String>,
}

/// Sortable load columns; raw column names never come from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum LoadSortField {
    ReferenceNumber,
    Status,
    #[default]
    CreatedAt,
    CustomerId,
}

impl LoadSortField {
    pub fn as_column(self) -> &'static str {
        match self {
            LoadSortField::ReferenceNumber => "reference_number",
            LoadSortField::Status => "status",
            LoadSortField::CreatedAt => "created_at",
            LoadSortField::CustomerId => "customer_id",
        }
    }
}

impl FromStr for LoadSortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "referenceNumber" => Ok(LoadSortField::ReferenceNumber),
            "status" => Ok(LoadSortField::Status),
            "createdAt" => Ok(LoadSortField::CreatedAt),
            "customerId" => Ok(LoadSortField::CustomerId),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListLoadsQuery {
    /// Zero-based page index
    #[serde(default = "default_page", deserialize_with = "de_page")]
    pub page: i64,

    /// Page size (clamped server-side)
    #[serde(default = "default_limit", deserialize_with = "de_limit")]
    pub limit: i64,

    #[serde(default, deserialize_with = "de_lenient")]
    #[param(value_type = Option<LoadSortField>)]
    pub sort_field: LoadSortField,

    #[serde(default, deserialize_with = "de_lenient")]
    #[param(value_type = Option<SortOrder>)]
    pub sort_order: SortOrder,

    /// Substring filter over reference number, contact name, carrier and commodity
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn empty_update_is_rejected_at_the_schema_stage() {
        let dto: UpdateLoadDto = serde_json::from_str("{}").unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn an_empty_location_object_does_not_count_as_a_field() {
        let dto: UpdateLoadDto = serde_json::from_str(r#"{"pickup": {}}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn clearing_temperature_with_null_is_a_valid_update() {
        let dto: UpdateLoadDto = serde_json::from_str(r#"{"temperature": null}"#).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.temperature, Patch::Null);
    }

    #[test]
    fn negative_rates_fail_validation() {
        let dto: CreateLoadDto = serde_json::from_str(
            r#"{
                "customerId": "7b6f4a50-0000-0000-0000-000000000001",
                "referenceNumber": "REF-1",
                "contactName": "Dana",
                "carrier": "ACME Trucking",
                "carrierRate": -10.0,
                "loadType": "FTL",
                "serviceType": "Dry Van",
                "serviceGivenAs": "FTL",
                "commodity": "Paper",
                "bookedAs": "FTL",
                "soldAs": "FTL",
                "weight": "42000 lbs",
                "pickup": {"cityZipCode": "Austin 78701", "phone": "555-0101", "carrier": "ACME", "name": "Dock A", "address": "1 Main St"},
                "dropoff": {"cityZipCode": "Dallas 75201", "phone": "555-0102", "carrier": "ACME", "name": "Dock B", "address": "2 Elm St"}
            }"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn unknown_sort_token_falls_back_to_created_at() {
        let query: ListLoadsQuery = serde_urlencoded::from_str("sortField=weight").unwrap();
        assert_eq!(query.sort_field, LoadSortField::CreatedAt);
    }
}
