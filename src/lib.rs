//! Carpool Match - batch matching engine for recurring carpool requests
//!
//! Pairs a pool of drivers with a pool of passengers whose pickup points,
//! drop-off points and commute schedules are close enough to each driver's
//! own. Each batch builds a k-d tree over passenger origins, pushes every
//! driver's spatial candidates through exact constraint checks, scores and
//! ranks the survivors, and seats the best ones greedily in driver order.

pub mod config;
pub mod core;
pub mod models;
pub mod simulation;

// Re-export commonly used types
pub use crate::core::{batch_match, haversine_distance, calculate_bounding_box, MatchEngine, MatchError, SpatialIndex};
pub use crate::models::{BatchConfig, BatchReport, BatchRequest, Coordinate, DaySet, Driver, Match, Passenger, RiderInfo, TimeWindow};
