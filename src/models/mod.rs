// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AssignedPassenger, BatchConfig, BoundingBox, CandidatePair, Coordinate, DaySet, Driver, Match,
    Passenger, RiderInfo, ScoringWeights, TimeWindow,
};
pub use requests::BatchRequest;
pub use responses::{
    BatchReport, BatchStatistics, DriverOutcome, DriverState, PairDiagnosis, PassengerRejection,
    RejectionReason,
};
