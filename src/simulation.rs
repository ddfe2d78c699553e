//! Synthetic rider pools for demos and benchmarks.
//!
//! Riders live in a handful of residential neighborhoods and commute to a few
//! work areas, so origins and destinations cluster the way real commuter
//! demand does. Everything is drawn from a seeded RNG and is reproducible.

use std::f64::consts::PI;

use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::SimulationSettings;
use crate::models::{BatchConfig, BatchRequest, Coordinate, DaySet, Driver, Passenger, RiderInfo, TimeWindow};

/// Approximate length of one degree, used only to scatter points
const KM_PER_DEGREE: f64 = 111.32;

/// Earliest and latest commute start hours
const FIRST_COMMUTE_HOUR: u32 = 7;
const LAST_COMMUTE_HOUR: u32 = 11;

/// A named cluster center
#[derive(Debug, Clone)]
pub struct Cluster {
    pub name: String,
    pub center: Coordinate,
}

/// Uniform random point in a disk of `radius_km` around `center`
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, center: Coordinate, radius_km: f64) -> Coordinate {
    let r = radius_km / KM_PER_DEGREE;
    let w = r * rng.gen::<f64>().sqrt();
    let t = 2.0 * PI * rng.gen::<f64>();
    Coordinate::new(
        (center.lat + w * t.sin()).clamp(-90.0, 90.0),
        (center.lon + w * t.cos()).clamp(-180.0, 180.0),
    )
}

fn clusters<R: Rng + ?Sized>(
    rng: &mut R,
    prefix: &str,
    count: usize,
    center: Coordinate,
    radius_km: f64,
) -> Vec<Cluster> {
    (1..=count.max(1))
        .map(|i| Cluster {
            name: format!("{}_{}", prefix, i),
            center: random_point(rng, center, radius_km),
        })
        .collect()
}

/// Commute window one hour either side of a random start hour.
///
/// Two such windows overlap exactly when their hours differ by at most one.
fn commute_window<R: Rng + ?Sized>(rng: &mut R, weekend_share: f64) -> TimeWindow {
    let hour = rng.gen_range(FIRST_COMMUTE_HOUR..=LAST_COMMUTE_HOUR);
    let days = if rng.gen_bool(weekend_share.clamp(0.0, 1.0)) {
        DaySet::WEEKEND
    } else {
        DaySet::WORKWEEK
    };
    TimeWindow::new(
        NaiveTime::from_hms_opt(hour - 1, 0, 0).unwrap_or(NaiveTime::MIN),
        NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap_or(NaiveTime::MIN),
        days,
    )
}

fn sample_count<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// Generate a clustered pool of drivers and passengers
pub fn generate_pool(settings: &SimulationSettings, config: &BatchConfig) -> BatchRequest {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let city = Coordinate::new(settings.center_lat, settings.center_lon);

    let homes = clusters(&mut rng, "Neighborhood", settings.neighborhoods, city, settings.area_km * 0.7);
    let offices = clusters(&mut rng, "WorkArea", settings.work_areas, city, settings.area_km * 0.5);

    let num_drivers = sample_count(&mut rng, settings.min_drivers, settings.max_drivers);
    let num_passengers = sample_count(&mut rng, settings.min_passengers, settings.max_passengers);

    tracing::info!(
        "Generating pool: {} drivers, {} passengers across {} neighborhoods and {} work areas",
        num_drivers,
        num_passengers,
        homes.len(),
        offices.len()
    );

    let rider = |rng: &mut StdRng, id: String| {
        // `clusters` never returns an empty list
        let home = homes.choose(rng).map_or(city, |c| c.center);
        let office = offices.choose(rng).map_or(city, |c| c.center);
        RiderInfo::new(
            id,
            random_point(rng, home, settings.cluster_radius_km),
            random_point(rng, office, settings.cluster_radius_km),
            commute_window(rng, settings.weekend_share),
        )
    };

    let drivers = (0..num_drivers)
        .map(|i| Driver {
            info: rider(&mut rng, format!("D{:03}", i)),
            capacity: config.capacity_max,
            occupancy: 0,
        })
        .collect();

    let passengers = (0..num_passengers)
        .map(|i| Passenger::new(rider(&mut rng, format!("P{:03}", i))))
        .collect();

    BatchRequest::new(drivers, passengers)
}
