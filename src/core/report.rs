use std::collections::{HashMap, HashSet};

use crate::core::filters::diagnose_pair;
use crate::models::{BatchConfig, BatchStatistics, Driver, Match, Passenger, PassengerRejection};

/// Aggregate fleet figures for a finished batch
///
/// Occupancy counts seats taken before the batch plus seats assigned by it.
pub fn compute_statistics(
    drivers: &[Driver],
    passengers: &[Passenger],
    matches: &[Match],
    config: &BatchConfig,
) -> BatchStatistics {
    let assigned: HashMap<&str, usize> = matches
        .iter()
        .map(|m| (m.driver_id.as_str(), m.passengers.len()))
        .collect();

    let mut full_cars = 0;
    let mut active_cars = 0;
    let mut seats_used = 0usize;
    let mut seats_total = 0usize;

    for driver in drivers {
        let seats = usize::from(driver.capacity.min(config.capacity_max));
        let added = assigned.get(driver.id()).copied().unwrap_or(0);
        let occupied = usize::from(driver.occupancy) + added;

        seats_total += seats;
        seats_used += occupied;
        if occupied >= seats {
            full_cars += 1;
        }
        if added > 0 {
            active_cars += 1;
        }
    }

    let fleet_occupancy_percent = if seats_total > 0 {
        seats_used as f64 / seats_total as f64 * 100.0
    } else {
        0.0
    };

    BatchStatistics {
        total_drivers: drivers.len(),
        total_passengers: passengers.len(),
        matched_passengers: assigned.values().sum(),
        full_cars,
        active_cars,
        fleet_occupancy_percent,
        total_revenue: matches.iter().map(Match::total_fare).sum(),
    }
}

/// Explain, driver by driver, why each unmatched passenger was left behind
///
/// Pairs with no reasons were feasible but lost to capacity or to an earlier
/// driver. Costs O(drivers × unmatched).
pub fn analyze_rejections(
    drivers: &[Driver],
    passengers: &[Passenger],
    unmatched_passenger_ids: &[String],
    config: &BatchConfig,
) -> Vec<PassengerRejection> {
    let unmatched: HashSet<&str> = unmatched_passenger_ids.iter().map(String::as_str).collect();

    passengers
        .iter()
        .filter(|p| unmatched.contains(p.id()))
        .map(|passenger| PassengerRejection {
            passenger_id: passenger.id().to_string(),
            drivers: drivers
                .iter()
                .map(|driver| diagnose_pair(driver, passenger, config.radius_km))
                .collect(),
        })
        .collect()
}
