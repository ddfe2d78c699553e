use crate::core::distance::haversine_distance;
use crate::models::{Driver, PairDiagnosis, Passenger, RejectionReason, TimeWindow};

/// A passenger that passed every hard constraint for a driver
#[derive(Debug, Clone, PartialEq)]
pub struct Feasible<K> {
    pub key: K,
    pub origin_distance_km: f64,
    pub destination_distance_km: f64,
}

/// Check that the passenger's drop-off is within `radius_km` of the driver's
#[inline]
pub fn validate_destination(driver: &Driver, passenger: &Passenger, radius_km: f64) -> bool {
    haversine_distance(driver.info.destination, passenger.info.destination) <= radius_km
}

/// Check that two half-open time-of-day intervals intersect
///
/// Inverted or zero-length intervals never overlap anything.
#[inline]
pub fn time_windows_overlap(a: &TimeWindow, b: &TimeWindow) -> bool {
    a.is_well_formed() && b.is_well_formed() && a.start < b.end && b.start < a.end
}

/// Check that two schedules overlap in time of day AND share a weekday
///
/// An empty weekday set never overlaps.
#[inline]
pub fn validate_schedule(driver_window: &TimeWindow, passenger_window: &TimeWindow) -> bool {
    time_windows_overlap(driver_window, passenger_window)
        && driver_window.days.intersects(&passenger_window.days)
}

/// Run the exact hard-constraint checks for one pair, cheapest rejects first
///
/// Returns the origin and destination distances when the pair is feasible.
#[inline]
pub fn check_pair(driver: &Driver, passenger: &Passenger, radius_km: f64) -> Option<(f64, f64)> {
    // The index only guarantees a bounding-box superset
    let origin_km = haversine_distance(driver.info.origin, passenger.info.origin);
    if origin_km > radius_km {
        tracing::trace!(
            "driver {} rejects passenger {}: origin {:.3}km",
            driver.id(),
            passenger.id(),
            origin_km
        );
        return None;
    }

    let destination_km = haversine_distance(driver.info.destination, passenger.info.destination);
    if destination_km > radius_km {
        tracing::trace!(
            "driver {} rejects passenger {}: destination {:.3}km",
            driver.id(),
            passenger.id(),
            destination_km
        );
        return None;
    }

    if !validate_schedule(&driver.info.window, &passenger.info.window) {
        tracing::trace!(
            "driver {} rejects passenger {}: schedule",
            driver.id(),
            passenger.id()
        );
        return None;
    }

    Some((origin_km, destination_km))
}

/// Reduce spatially-pruned candidates to those satisfying every hard constraint
///
/// Input order is preserved.
pub fn filter_candidates<'a, K, I>(driver: &Driver, candidates: I, radius_km: f64) -> Vec<Feasible<K>>
where
    I: IntoIterator<Item = (K, &'a Passenger)>,
{
    candidates
        .into_iter()
        .filter_map(|(key, passenger)| {
            check_pair(driver, passenger, radius_km).map(|(origin_km, destination_km)| Feasible {
                key,
                origin_distance_km: origin_km,
                destination_distance_km: destination_km,
            })
        })
        .collect()
}

/// Evaluate every constraint for a pair without short-circuiting
pub fn diagnose_pair(driver: &Driver, passenger: &Passenger, radius_km: f64) -> PairDiagnosis {
    let origin_km = haversine_distance(driver.info.origin, passenger.info.origin);
    let destination_km = haversine_distance(driver.info.destination, passenger.info.destination);

    let mut reasons = Vec::new();
    if origin_km > radius_km {
        reasons.push(RejectionReason::OriginTooFar {
            distance_km: origin_km,
            max_km: radius_km,
        });
    }
    if destination_km > radius_km {
        reasons.push(RejectionReason::DestinationTooFar {
            distance_km: destination_km,
            max_km: radius_km,
        });
    }
    if !time_windows_overlap(&driver.info.window, &passenger.info.window) {
        reasons.push(RejectionReason::TimeWindowsDisjoint);
    }
    if !driver.info.window.days.intersects(&passenger.info.window.days) {
        reasons.push(RejectionReason::NoSharedWeekday);
    }

    PairDiagnosis {
        driver_id: driver.id().to_string(),
        origin_distance_km: origin_km,
        destination_distance_km: destination_km,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, DaySet, RiderInfo};
    use chrono::{NaiveTime, Weekday};

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn window(start: u32, end: u32, days: DaySet) -> TimeWindow {
        TimeWindow::new(hm(start, 0), hm(end, 0), days)
    }

    fn create_driver(origin: Coordinate, destination: Coordinate) -> Driver {
        Driver::new(RiderInfo::new(
            "driver",
            origin,
            destination,
            window(8, 10, DaySet::WORKWEEK),
        ))
    }

    fn create_passenger(id: &str, origin: Coordinate, destination: Coordinate, window: TimeWindow) -> Passenger {
        Passenger::new(RiderInfo::new(id, origin, destination, window))
    }

    #[test]
    fn test_destination_within_radius() {
        let driver = create_driver(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        let near = create_passenger(
            "near",
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.001),
            window(8, 10, DaySet::WORKWEEK),
        );
        let far = create_passenger(
            "far",
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.045, 0.0),
            window(8, 10, DaySet::WORKWEEK),
        );

        assert!(validate_destination(&driver, &near, 1.0));
        assert!(!validate_destination(&driver, &far, 1.0));
    }

    #[test]
    fn test_schedule_overlap() {
        let base = window(8, 10, DaySet::WORKWEEK);
        assert!(validate_schedule(&base, &window(9, 11, DaySet::WORKWEEK)));
        // Half-open: touching at 10:00 is not an overlap
        assert!(!validate_schedule(&base, &window(10, 12, DaySet::WORKWEEK)));
        assert!(!validate_schedule(&base, &window(6, 7, DaySet::WORKWEEK)));
    }

    #[test]
    fn test_schedule_requires_shared_weekday() {
        let base = window(8, 10, DaySet::WORKWEEK);
        let saturday = window(8, 10, DaySet::from_days([Weekday::Sat]));
        assert!(time_windows_overlap(&base, &saturday));
        assert!(!validate_schedule(&base, &saturday));
    }

    #[test]
    fn test_malformed_windows_never_overlap() {
        let base = window(8, 10, DaySet::WORKWEEK);
        let inverted = window(10, 8, DaySet::WORKWEEK);
        let empty = window(9, 9, DaySet::WORKWEEK);
        let no_days = window(8, 10, DaySet::EMPTY);

        assert!(!validate_schedule(&base, &inverted));
        assert!(!validate_schedule(&inverted, &base));
        assert!(!validate_schedule(&base, &empty));
        assert!(!validate_schedule(&base, &no_days));
    }

    #[test]
    fn test_filter_candidates_keeps_only_feasible() {
        let driver = create_driver(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        let passengers = vec![
            create_passenger("ok", Coordinate::new(0.0, 0.001), Coordinate::new(1.0, 0.001), window(8, 10, DaySet::WORKWEEK)),
            create_passenger("origin", Coordinate::new(0.02, 0.0), Coordinate::new(1.0, 0.0), window(8, 10, DaySet::WORKWEEK)),
            create_passenger("dest", Coordinate::new(0.0, 0.0), Coordinate::new(1.05, 0.0), window(8, 10, DaySet::WORKWEEK)),
            create_passenger("late", Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0), window(18, 19, DaySet::WORKWEEK)),
        ];

        let feasible = filter_candidates(&driver, passengers.iter().enumerate(), 1.0);
        assert_eq!(feasible.len(), 1);
        assert_eq!(feasible[0].key, 0);
        assert!(feasible[0].origin_distance_km < 0.2);
        assert!(feasible[0].destination_distance_km < 0.2);
    }

    #[test]
    fn test_diagnose_pair_lists_every_reason() {
        let driver = create_driver(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        let passenger = create_passenger(
            "p",
            Coordinate::new(0.05, 0.0),
            Coordinate::new(1.05, 0.0),
            window(18, 19, DaySet::WEEKEND),
        );

        let diagnosis = diagnose_pair(&driver, &passenger, 1.0);
        assert!(!diagnosis.is_compatible());
        assert_eq!(diagnosis.reasons.len(), 4);
        assert_eq!(diagnosis.reasons[2], RejectionReason::TimeWindowsDisjoint);
        assert_eq!(diagnosis.reasons[3], RejectionReason::NoSharedWeekday);
    }

    #[test]
    fn test_diagnose_compatible_pair() {
        let driver = create_driver(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        let passenger = create_passenger(
            "p",
            Coordinate::new(0.0, 0.001),
            Coordinate::new(1.0, 0.001),
            window(9, 11, DaySet::WORKWEEK),
        );
        assert!(diagnose_pair(&driver, &passenger, 1.0).is_compatible());
    }
}
