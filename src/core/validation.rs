use std::collections::HashSet;

use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::models::{BatchConfig, Driver, Passenger, RiderInfo};

/// Errors that fail a whole batch before any matching starts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("invalid input for {subject}: {reason}")]
    InvalidInput { subject: String, reason: String },
}

impl MatchError {
    pub fn invalid(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::InvalidInput {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

impl From<ValidationErrors> for MatchError {
    fn from(errors: ValidationErrors) -> Self {
        MatchError::invalid("config", errors.to_string())
    }
}

/// Check configuration values
pub fn validate_config(config: &BatchConfig) -> Result<(), MatchError> {
    let numbers = [
        ("radius_km", config.radius_km),
        ("base_fare", config.base_fare),
        ("markup_percent", config.markup_percent),
        ("epsilon_km", config.epsilon_km),
        ("weights.origin", config.weights.origin),
        ("weights.destination", config.weights.destination),
    ];
    // Range rules let NaN through
    if let Some((name, _)) = numbers.iter().find(|(_, value)| !value.is_finite()) {
        return Err(MatchError::invalid("config", format!("{} must be finite", name)));
    }

    config.validate()?;
    Ok(())
}

fn validate_rider(subject: &str, info: &RiderInfo) -> Result<(), MatchError> {
    if info.id.trim().is_empty() {
        return Err(MatchError::invalid(subject, "empty id"));
    }
    if !info.origin.is_valid() {
        return Err(MatchError::invalid(
            subject,
            format!("origin ({}, {}) out of range", info.origin.lat, info.origin.lon),
        ));
    }
    if !info.destination.is_valid() {
        return Err(MatchError::invalid(
            subject,
            format!(
                "destination ({}, {}) out of range",
                info.destination.lat, info.destination.lon
            ),
        ));
    }
    if info.window.days.is_empty() {
        return Err(MatchError::invalid(subject, "empty weekday set"));
    }
    Ok(())
}

/// Validate a whole batch, reporting the first offending record
///
/// Config is checked first, then drivers in order, then passengers in order.
pub fn validate_batch(
    drivers: &[Driver],
    passengers: &[Passenger],
    config: &BatchConfig,
) -> Result<(), MatchError> {
    validate_config(config)?;

    let mut seen = HashSet::with_capacity(drivers.len());
    for driver in drivers {
        let subject = format!("driver {}", driver.id());
        validate_rider(&subject, &driver.info)?;

        if driver.capacity == 0 {
            return Err(MatchError::invalid(subject, "capacity must be at least 1"));
        }
        if driver.capacity > config.capacity_max {
            return Err(MatchError::invalid(
                subject,
                format!(
                    "capacity {} exceeds maximum {}",
                    driver.capacity, config.capacity_max
                ),
            ));
        }
        if driver.occupancy > driver.capacity {
            return Err(MatchError::invalid(
                subject,
                format!(
                    "occupancy {} exceeds capacity {}",
                    driver.occupancy, driver.capacity
                ),
            ));
        }
        if !seen.insert(driver.id()) {
            return Err(MatchError::invalid(subject, "duplicate driver id"));
        }
    }

    seen.clear();
    for passenger in passengers {
        let subject = format!("passenger {}", passenger.id());
        validate_rider(&subject, &passenger.info)?;

        if !seen.insert(passenger.id()) {
            return Err(MatchError::invalid(subject, "duplicate passenger id"));
        }
    }

    Ok(())
}
