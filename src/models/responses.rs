use serde::{Deserialize, Serialize};

use crate::models::domain::{BatchConfig, Match};

/// Terminal state a driver reaches during a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DriverState {
    /// No free seats at the start of the batch
    Full,
    /// Nothing survived the filter pipeline
    NoCandidates,
    /// At least one passenger was seated
    Assigned { count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverOutcome {
    pub driver_id: String,
    #[serde(flatten)]
    pub state: DriverState,
}

/// Why a driver/passenger pair failed the hard constraints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum RejectionReason {
    OriginTooFar { distance_km: f64, max_km: f64 },
    DestinationTooFar { distance_km: f64, max_km: f64 },
    TimeWindowsDisjoint,
    NoSharedWeekday,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OriginTooFar { distance_km, max_km } => {
                write!(f, "origin too far: {:.2}km (max {}km)", distance_km, max_km)
            }
            Self::DestinationTooFar { distance_km, max_km } => {
                write!(f, "destination too far: {:.2}km (max {}km)", distance_km, max_km)
            }
            Self::TimeWindowsDisjoint => write!(f, "time windows do not overlap"),
            Self::NoSharedWeekday => write!(f, "no shared weekday"),
        }
    }
}

/// One driver evaluated against one unmatched passenger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairDiagnosis {
    pub driver_id: String,
    pub origin_distance_km: f64,
    pub destination_distance_km: f64,
    pub reasons: Vec<RejectionReason>,
}

impl PairDiagnosis {
    /// Passed every hard constraint; lost to capacity or an earlier driver
    pub fn is_compatible(&self) -> bool {
        self.reasons.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRejection {
    pub passenger_id: String,
    pub drivers: Vec<PairDiagnosis>,
}

/// Aggregate figures for one batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatistics {
    pub total_drivers: usize,
    pub total_passengers: usize,
    pub matched_passengers: usize,
    pub full_cars: usize,
    pub active_cars: usize,
    pub fleet_occupancy_percent: f64,
    pub total_revenue: f64,
}

/// Output document for one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub config: BatchConfig,
    pub statistics: BatchStatistics,
    pub matches: Vec<Match>,
    pub driver_outcomes: Vec<DriverOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejections: Vec<PassengerRejection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_outcome_serialization() {
        let outcome = DriverOutcome {
            driver_id: "d1".to_string(),
            state: DriverState::Assigned { count: 2 },
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["driverId"], "d1");
        assert_eq!(value["state"], "assigned");
        assert_eq!(value["count"], 2);
    }

    #[test]
    fn test_rejection_reason_display() {
        let reason = RejectionReason::OriginTooFar {
            distance_km: 1.234,
            max_km: 1.0,
        };
        assert_eq!(reason.to_string(), "origin too far: 1.23km (max 1km)");
        assert_eq!(
            RejectionReason::NoSharedWeekday.to_string(),
            "no shared weekday"
        );
    }
}
