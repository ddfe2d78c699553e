use std::cmp::Ordering;

use crate::models::{BatchConfig, CandidatePair, Driver, Passenger, ScoringWeights};

/// Calculate how well a passenger fits a driver's route
///
/// Scoring formula:
/// score = w_o / max(origin_km, ε) + w_d / max(destination_km, ε)
///
/// Higher is better. With non-negative weights the score never increases
/// as either distance grows; ε caps the score when points coincide.
#[inline]
pub fn calculate_score(
    origin_distance_km: f64,
    destination_distance_km: f64,
    weights: &ScoringWeights,
    epsilon_km: f64,
) -> f64 {
    weights.origin / origin_distance_km.max(epsilon_km)
        + weights.destination / destination_distance_km.max(epsilon_km)
}

/// Fare quoted to one passenger
///
/// fare = base_fare / C_max + base_fare * markup_percent / 100
///
/// The per-seat share always divides by the seat cap, not by the current
/// fill level; `_occupancy_at_assignment` does not enter the formula.
#[inline]
pub fn quote_fare(
    base_fare: f64,
    _occupancy_at_assignment: u8,
    markup_percent: f64,
    capacity_max: u8,
) -> f64 {
    base_fare / f64::from(capacity_max) + base_fare * markup_percent / 100.0
}

/// Build a scored candidate for a feasible pair; the fare is quoted at assignment
pub fn score_candidate(
    driver: &Driver,
    passenger: &Passenger,
    origin_distance_km: f64,
    destination_distance_km: f64,
    config: &BatchConfig,
) -> CandidatePair {
    CandidatePair {
        driver_id: driver.id().to_string(),
        passenger_id: passenger.id().to_string(),
        origin_distance_km,
        destination_distance_km,
        score: calculate_score(
            origin_distance_km,
            destination_distance_km,
            &config.weights,
            config.epsilon_km,
        ),
        quoted_fare: 0.0,
    }
}

/// Total order: score descending, then passenger id ascending
#[inline]
pub fn compare_candidates(a: &CandidatePair, b: &CandidatePair) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.passenger_id.cmp(&b.passenger_id))
}

/// Sort candidates best first
pub fn rank_candidates(candidates: &mut [CandidatePair]) {
    candidates.sort_by(compare_candidates);
}
