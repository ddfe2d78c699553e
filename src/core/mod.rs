// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod report;
pub mod scoring;
pub mod spatial;
pub mod validation;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use filters::{
    check_pair, diagnose_pair, filter_candidates, time_windows_overlap, validate_destination,
    validate_schedule, Feasible,
};
pub use matcher::{batch_match, BatchOutcome, MatchEngine};
pub use report::{analyze_rejections, compute_statistics};
pub use scoring::{calculate_score, compare_candidates, quote_fare, rank_candidates, score_candidate};
pub use spatial::SpatialIndex;
pub use validation::{validate_batch, validate_config, MatchError};
