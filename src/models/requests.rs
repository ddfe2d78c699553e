use serde::{Deserialize, Serialize};

use crate::models::domain::{Driver, Passenger};

/// Input document for one batch run
///
/// ```json
/// {
///   "drivers": [{"id": "d1", "origin": {...}, "destination": {...}, "window": {...}}],
///   "passengers": [{"id": "p1", "origin": {...}, "destination": {...}, "window": {...}}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
}

impl BatchRequest {
    pub fn new(drivers: Vec<Driver>, passengers: Vec<Passenger>) -> Self {
        Self { drivers, passengers }
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty() || self.passengers.is_empty()
    }
}
