use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), Error> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidParam(format!(
                "{name} latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidParam(format!(
                "{name} longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Product {
    pub product_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub shared: Option<bool>,
    /// `None` for metered fares such as taxis.
    #[serde(default, rename = "price_details")]
    pub price_detail: Option<PriceDetail>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PriceDetail {
    pub distance_unit: Option<String>,
    pub currency_code: Option<String>,
    pub minimum: Option<f64>,
    pub base: Option<f64>,
    pub cost_per_minute: Option<f64>,
    pub cost_per_distance: Option<f64>,
    pub cancellation_fee: Option<f64>,
    pub service_fees: Vec<ServiceFee>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServiceFee {
    pub name: String,
    pub fee: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PriceEstimate {
    pub product_id: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Formatted estimate; a range, a flat amount, or "Metered".
    #[serde(default)]
    pub estimate: Option<String>,
    #[serde(default)]
    pub low_estimate: Option<f64>,
    #[serde(default)]
    pub high_estimate: Option<f64>,
    #[serde(default)]
    pub surge_multiplier: Option<f64>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TimeEstimate {
    pub product_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// ETA in seconds.
    #[serde(default)]
    pub estimate: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Promotion {
    pub display_text: Option<String>,
    pub localized_value: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserActivity {
    pub request_id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub request_time: Option<i64>,
    #[serde(default)]
    pub start_city: Option<ActivityCity>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActivityCity {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub display_name: Option<String>,
}

/// One page of ride history, echoing the paging parameters.
#[derive(Clone, Debug, Deserialize)]
pub struct UserActivityPage {
    pub offset: u32,
    pub limit: u32,
    pub count: u32,
    pub history: Vec<UserActivity>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserProfile {
    pub uuid: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "picture")]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub promo_code: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Ride {
    pub request_id: String,
    pub status: String,
    #[serde(default)]
    pub eta: Option<u32>,
    /// 1.0 means surge pricing is not in effect.
    #[serde(default)]
    pub surge_multiplier: Option<f64>,
    #[serde(default)]
    pub driver: Option<Driver>,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
    #[serde(default)]
    pub location: Option<RideLocation>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Driver {
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub phone_number: Option<String>,
    pub picture_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub make: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,
    pub picture_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RideLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub bearing: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RideEstimate {
    pub price: Option<EstimatePrice>,
    pub trip: Option<EstimateTrip>,
    /// Minutes until pickup.
    pub pickup_estimate: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EstimatePrice {
    pub surge_confirmation_href: Option<String>,
    pub surge_confirmation_id: Option<String>,
    pub surge_multiplier: Option<f64>,
    pub high_estimate: Option<f64>,
    pub low_estimate: Option<f64>,
    pub minimum: Option<f64>,
    pub display: Option<String>,
    pub currency_code: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EstimateTrip {
    pub distance_unit: Option<String>,
    pub duration_estimate: Option<u64>,
    pub distance_estimate: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RideReceipt {
    pub request_id: String,
    #[serde(default)]
    pub charges: Vec<ReceiptCharge>,
    #[serde(default)]
    pub charge_adjustments: Vec<ReceiptCharge>,
    #[serde(default)]
    pub surge_charge: Option<ReceiptCharge>,
    #[serde(default)]
    pub normal_fare: Option<String>,
    #[serde(default)]
    pub subtotal: Option<String>,
    #[serde(default)]
    pub total_charged: Option<String>,
    /// `None` when the fare was paid in full.
    #[serde(default)]
    pub total_owed: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub distance_label: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReceiptCharge {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RideMap {
    pub request_id: String,
    pub href: String,
}
