use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default search radius in kilometers
pub const DEFAULT_RADIUS_KM: f64 = 1.0;
/// Default seat cap per driver
pub const DEFAULT_CAPACITY_MAX: u8 = 4;
/// Default zero-distance guard used by the scorer
pub const DEFAULT_EPSILON_KM: f64 = 0.01;
/// Default full-ride fare
pub const DEFAULT_BASE_FARE: f64 = 100.0;
/// Default markup applied on top of the per-seat share
pub const DEFAULT_MARKUP_PERCENT: f64 = 20.0;

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside [-90, 90] x [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Set of active weekdays, stored as a 7-bit mask (bit 0 = Monday)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct DaySet(u8);

impl DaySet {
    pub const EMPTY: DaySet = DaySet(0);
    pub const WORKWEEK: DaySet = DaySet(0b0001_1111);
    pub const WEEKEND: DaySet = DaySet(0b0110_0000);
    pub const ALL: DaySet = DaySet(0b0111_1111);

    pub fn from_days<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        days.into_iter().fold(Self::EMPTY, |set, day| set.with(day))
    }

    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        DaySet(self.0 | Self::bit(day))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn intersects(&self, other: &DaySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Active days in Monday-first order
    pub fn days(&self) -> Vec<Weekday> {
        let mut day = Weekday::Mon;
        let mut days = Vec::with_capacity(self.len());
        for _ in 0..7 {
            if self.contains(day) {
                days.push(day);
            }
            day = day.succ();
        }
        days
    }

    #[inline]
    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }
}

impl From<Vec<Weekday>> for DaySet {
    fn from(days: Vec<Weekday>) -> Self {
        Self::from_days(days)
    }
}

impl From<DaySet> for Vec<Weekday> {
    fn from(set: DaySet) -> Self {
        set.days()
    }
}

/// Recurring availability: a half-open time-of-day interval on a set of weekdays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub days: DaySet,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime, days: DaySet) -> Self {
        Self { start, end, days }
    }

    /// Non-empty interval, i.e. `start < end`
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }
}

/// Fields shared by drivers and passengers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderInfo {
    pub id: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub window: TimeWindow,
}

impl RiderInfo {
    pub fn new(
        id: impl Into<String>,
        origin: Coordinate,
        destination: Coordinate,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            destination,
            window,
        }
    }
}

/// A rider offering seats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(flatten)]
    pub info: RiderInfo,
    #[serde(default = "default_capacity")]
    pub capacity: u8,
    #[serde(default)]
    pub occupancy: u8,
}

impl Driver {
    pub fn new(info: RiderInfo) -> Self {
        Self {
            info,
            capacity: DEFAULT_CAPACITY_MAX,
            occupancy: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Seats still open before any assignment in this batch
    pub fn free_seats(&self) -> u8 {
        self.capacity.saturating_sub(self.occupancy)
    }
}

fn default_capacity() -> u8 {
    DEFAULT_CAPACITY_MAX
}

/// A rider looking for a seat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    #[serde(flatten)]
    pub info: RiderInfo,
    #[serde(default)]
    pub matched: bool,
}

impl Passenger {
    pub fn new(info: RiderInfo) -> Self {
        Self {
            info,
            matched: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }
}

/// A validated driver/passenger pairing awaiting assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePair {
    pub driver_id: String,
    pub passenger_id: String,
    pub origin_distance_km: f64,
    pub destination_distance_km: f64,
    pub score: f64,
    pub quoted_fare: f64,
}

/// One passenger seated with a driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedPassenger {
    pub passenger_id: String,
    pub fare: f64,
    pub score: f64,
    pub origin_distance_km: f64,
    pub destination_distance_km: f64,
}

impl From<CandidatePair> for AssignedPassenger {
    fn from(pair: CandidatePair) -> Self {
        Self {
            passenger_id: pair.passenger_id,
            fare: pair.quoted_fare,
            score: pair.score,
            origin_distance_km: pair.origin_distance_km,
            destination_distance_km: pair.destination_distance_km,
        }
    }
}

/// All passengers assigned to one driver in a batch, best score first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub driver_id: String,
    pub passengers: Vec<AssignedPassenger>,
}

impl Match {
    pub fn passenger_ids(&self) -> Vec<&str> {
        self.passengers
            .iter()
            .map(|p| p.passenger_id.as_str())
            .collect()
    }

    pub fn fares(&self) -> Vec<f64> {
        self.passengers.iter().map(|p| p.fare).collect()
    }

    pub fn total_fare(&self) -> f64 {
        self.passengers.iter().map(|p| p.fare).sum()
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const WORLD: BoundingBox = BoundingBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    #[inline]
    pub fn contains(&self, point: Coordinate) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
    }
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScoringWeights {
    #[validate(range(min = 0.0))]
    pub origin: f64,
    #[validate(range(min = 0.0))]
    pub destination: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            origin: 1.0,
            destination: 1.0,
        }
    }
}

/// Parameters for one batch run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    #[validate(range(exclusive_min = 0.0))]
    pub radius_km: f64,
    #[validate(range(min = 1))]
    pub capacity_max: u8,
    #[validate(nested)]
    pub weights: ScoringWeights,
    #[validate(range(exclusive_min = 0.0))]
    pub base_fare: f64,
    #[validate(range(min = 0.0))]
    pub markup_percent: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub epsilon_km: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            capacity_max: DEFAULT_CAPACITY_MAX,
            weights: ScoringWeights::default(),
            base_fare: DEFAULT_BASE_FARE,
            markup_percent: DEFAULT_MARKUP_PERCENT,
            epsilon_km: DEFAULT_EPSILON_KM,
        }
    }
}
