use crate::core::{
    filters::filter_candidates,
    report::{analyze_rejections, compute_statistics},
    scoring::{compare_candidates, quote_fare, score_candidate},
    spatial::SpatialIndex,
    validation::{validate_batch, MatchError},
};
use crate::models::{
    AssignedPassenger, BatchConfig, BatchReport, Driver, DriverOutcome, DriverState, Match,
    Passenger,
};

/// Everything one batch produced
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One record per driver that seated someone, in driver input order
    pub matches: Vec<Match>,
    /// Terminal state of every driver, in driver input order
    pub driver_outcomes: Vec<DriverOutcome>,
    /// Ids of passengers still unmatched after the batch, in input order
    pub unmatched_passenger_ids: Vec<String>,
}

/// Batch matching orchestrator
///
/// # Pipeline Stages
/// 1. Validate the whole batch (fail fast, no partial results)
/// 2. Index the origins of every passenger not already matched
/// 3. Per driver, in input order: spatial query, exact constraint filter,
///    scoring and ranking, greedy assignment up to the free seats
/// 4. Retire assigned passengers from the index before the next driver
///
/// Drivers are processed strictly one after another: each driver only sees
/// passengers left over by the drivers before it. The caller's records are
/// never mutated; occupancy and matched flags live in batch-local state.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: BatchConfig,
}

impl MatchEngine {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Match a batch and return only the match records
    pub fn batch_match(
        &self,
        drivers: &[Driver],
        passengers: &[Passenger],
    ) -> Result<Vec<Match>, MatchError> {
        self.run(drivers, passengers).map(|outcome| outcome.matches)
    }

    /// Match a batch and keep per-driver states and leftovers
    pub fn run(&self, drivers: &[Driver], passengers: &[Passenger]) -> Result<BatchOutcome, MatchError> {
        validate_batch(drivers, passengers, &self.config)?;

        tracing::info!(
            "Matching batch: {} drivers, {} passengers, radius {}km",
            drivers.len(),
            passengers.len(),
            self.config.radius_km
        );

        // Batch-local pool state; the caller's flags are only read
        let mut claimed: Vec<bool> = passengers.iter().map(|p| p.matched).collect();
        let mut index = SpatialIndex::build(
            passengers
                .iter()
                .enumerate()
                .filter(|(_, p)| !p.matched)
                .map(|(i, p)| (i, p.info.origin)),
        );

        let mut matches = Vec::new();
        let mut driver_outcomes = Vec::with_capacity(drivers.len());

        for driver in drivers {
            let state = self.match_driver(driver, passengers, &mut index, &mut claimed, &mut matches);
            tracing::debug!("Driver {} -> {:?}", driver.id(), state);
            driver_outcomes.push(DriverOutcome {
                driver_id: driver.id().to_string(),
                state,
            });
        }

        let unmatched_passenger_ids: Vec<String> = passengers
            .iter()
            .zip(&claimed)
            .filter(|(_, taken)| !**taken)
            .map(|(p, _)| p.id().to_string())
            .collect();

        tracing::info!(
            "Batch complete: {} matches, {} passengers seated, {} left",
            matches.len(),
            matches.iter().map(|m| m.passengers.len()).sum::<usize>(),
            unmatched_passenger_ids.len()
        );

        Ok(BatchOutcome {
            matches,
            driver_outcomes,
            unmatched_passenger_ids,
        })
    }

    /// Run a batch and assemble the full report, optionally with rejection analysis
    pub fn report(
        &self,
        drivers: &[Driver],
        passengers: &[Passenger],
        with_rejections: bool,
    ) -> Result<BatchReport, MatchError> {
        let outcome = self.run(drivers, passengers)?;
        let statistics = compute_statistics(drivers, passengers, &outcome.matches, &self.config);
        let rejections = if with_rejections {
            analyze_rejections(drivers, passengers, &outcome.unmatched_passenger_ids, &self.config)
        } else {
            Vec::new()
        };

        Ok(BatchReport {
            config: self.config,
            statistics,
            matches: outcome.matches,
            driver_outcomes: outcome.driver_outcomes,
            rejections,
        })
    }

    fn match_driver(
        &self,
        driver: &Driver,
        passengers: &[Passenger],
        index: &mut SpatialIndex<usize>,
        claimed: &mut [bool],
        matches: &mut Vec<Match>,
    ) -> DriverState {
        let seats = driver.capacity.min(self.config.capacity_max);
        if driver.occupancy >= seats {
            return DriverState::Full;
        }

        // Stage 1: bounding-box query, minus anything already claimed
        let nearby = index
            .query(driver.info.origin, self.config.radius_km)
            .into_iter()
            .filter(|&i| !claimed[i])
            .map(move |i| (i, &passengers[i]));

        // Stage 2: exact origin, destination and schedule checks
        let feasible = filter_candidates(driver, nearby, self.config.radius_km);
        if feasible.is_empty() {
            return DriverState::NoCandidates;
        }

        // Stage 3: score and rank
        let mut ranked: Vec<(usize, _)> = feasible
            .into_iter()
            .map(|f| {
                let pair = score_candidate(
                    driver,
                    &passengers[f.key],
                    f.origin_distance_km,
                    f.destination_distance_km,
                    &self.config,
                );
                (f.key, pair)
            })
            .collect();
        ranked.sort_by(|(_, a), (_, b)| compare_candidates(a, b));

        // Stage 4: greedy assignment up to the free seats
        let slots = usize::from(seats - driver.occupancy);
        ranked.truncate(slots);

        let mut occupancy = driver.occupancy;
        let mut seated = Vec::with_capacity(ranked.len());
        let mut assigned: Vec<AssignedPassenger> = Vec::with_capacity(ranked.len());
        for (i, mut pair) in ranked {
            claimed[i] = true;
            pair.quoted_fare = quote_fare(
                self.config.base_fare,
                occupancy,
                self.config.markup_percent,
                self.config.capacity_max,
            );
            occupancy += 1;
            seated.push(i);
            assigned.push(pair.into());
        }
        index.remove(&seated);

        let count = assigned.len();
        matches.push(Match {
            driver_id: driver.id().to_string(),
            passengers: assigned,
        });

        DriverState::Assigned { count }
    }
}

/// Match one batch with the given configuration
///
/// Returns matches in driver input order; drivers that seat nobody are absent.
pub fn batch_match(
    drivers: &[Driver],
    passengers: &[Passenger],
    config: &BatchConfig,
) -> Result<Vec<Match>, MatchError> {
    MatchEngine::new(*config).batch_match(drivers, passengers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, DaySet, RiderInfo, TimeWindow};
    use chrono::NaiveTime;

    fn window() -> TimeWindow {
        TimeWindow::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            DaySet::WORKWEEK,
        )
    }

    fn create_driver(id: &str, lon: f64) -> Driver {
        Driver::new(RiderInfo::new(
            id,
            Coordinate::new(0.0, lon),
            Coordinate::new(1.0, lon),
            window(),
        ))
    }

    fn create_passenger(id: &str, lon: f64) -> Passenger {
        Passenger::new(RiderInfo::new(
            id,
            Coordinate::new(0.0, lon),
            Coordinate::new(1.0, lon),
            window(),
        ))
    }

    #[test]
    fn test_single_match() {
        let engine = MatchEngine::default();
        let drivers = vec![create_driver("d1", 0.0)];
        let passengers = vec![create_passenger("p1", 0.001)];

        let matches = engine.batch_match(&drivers, &passengers).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].driver_id, "d1");
        assert_eq!(matches[0].passenger_ids(), vec!["p1"]);
        assert!((matches[0].passengers[0].fare - 45.0).abs() < 1e-9);
        assert!(matches[0].passengers[0].score > 0.0);
    }

    #[test]
    fn test_caller_records_untouched() {
        let engine = MatchEngine::default();
        let drivers = vec![create_driver("d1", 0.0)];
        let passengers = vec![create_passenger("p1", 0.001)];
        let before = (drivers.clone(), passengers.clone());

        engine.batch_match(&drivers, &passengers).unwrap();
        assert_eq!((drivers, passengers), before);
    }

    #[test]
    fn test_pre_matched_passengers_are_skipped() {
        let engine = MatchEngine::default();
        let drivers = vec![create_driver("d1", 0.0)];
        let mut taken = create_passenger("p1", 0.0);
        taken.matched = true;
        let passengers = vec![taken, create_passenger("p2", 0.002)];

        let outcome = engine.run(&drivers, &passengers).unwrap();
        assert_eq!(outcome.matches[0].passenger_ids(), vec!["p2"]);
        assert!(outcome.unmatched_passenger_ids.is_empty());
    }

    #[test]
    fn test_driver_states() {
        let engine = MatchEngine::default();
        let mut full = create_driver("full", 0.0);
        full.occupancy = 4;
        let drivers = vec![full, create_driver("busy", 0.0), create_driver("far", 5.0)];
        let passengers = vec![create_passenger("p1", 0.0)];

        let outcome = engine.run(&drivers, &passengers).unwrap();
        let states: Vec<DriverState> = outcome.driver_outcomes.iter().map(|o| o.state).collect();
        assert_eq!(
            states,
            vec![
                DriverState::Full,
                DriverState::Assigned { count: 1 },
                DriverState::NoCandidates,
            ]
        );
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn test_partial_occupancy_limits_slots() {
        let engine = MatchEngine::default();
        let mut driver = create_driver("d1", 0.0);
        driver.occupancy = 3;
        let passengers: Vec<Passenger> = (0..3)
            .map(|i| create_passenger(&format!("p{}", i), i as f64 * 0.001))
            .collect();

        let matches = engine.batch_match(&[driver], &passengers).unwrap();
        assert_eq!(matches[0].passenger_ids(), vec!["p0"]);
    }

    #[test]
    fn test_invalid_input_yields_no_partial_result() {
        let engine = MatchEngine::default();
        let mut bad = create_passenger("bad", 0.0);
        bad.info.origin = Coordinate::new(120.0, 0.0);
        let passengers = vec![create_passenger("p1", 0.0), bad];

        let result = engine.batch_match(&[create_driver("d1", 0.0)], &passengers);
        assert!(matches!(result, Err(MatchError::InvalidInput { .. })));
    }

    #[test]
    fn test_report_includes_rejections() {
        let engine = MatchEngine::default();
        let drivers = vec![create_driver("d1", 0.0)];
        let passengers = vec![create_passenger("p1", 0.0), create_passenger("p2", 3.0)];

        let report = engine.report(&drivers, &passengers, true).unwrap();
        assert_eq!(report.statistics.matched_passengers, 1);
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.rejections[0].passenger_id, "p2");

        let report = engine.report(&drivers, &passengers, false).unwrap();
        assert!(report.rejections.is_empty());
    }
}
