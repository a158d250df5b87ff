//! Error types for the scheduling core

use crate::aircraft::AircraftId;
use crate::flight::FlightId;
use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Scheduling core errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed construction input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cargo would push the aircraft over its capacity
    #[error("Capacity exceeded on {aircraft}: requested {requested} kg, {available} kg available")]
    CapacityExceeded {
        aircraft: AircraftId,
        requested: f64,
        available: f64,
    },

    /// Same aircraft, overlapping time windows
    #[error("Flight {flight} conflicts with scheduled flight {existing}")]
    SchedulingConflict { flight: FlightId, existing: FlightId },

    /// Flight number already present in the schedule
    #[error("Duplicate flight: {0}")]
    DuplicateFlight(FlightId),

    /// Illegal state transition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Lookup miss
    #[error("Not found: {0}")]
    NotFound(String),

    /// Destroyed or unknown handle
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),
}

/// Stable numeric codes for callers across the handle boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    CapacityExceeded = 2,
    SchedulingConflict = 3,
    DuplicateFlight = 4,
    InvalidState = 5,
    NotFound = 6,
    InvalidHandle = 7,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Error::SchedulingConflict { .. } => ErrorCode::SchedulingConflict,
            Error::DuplicateFlight(_) => ErrorCode::DuplicateFlight,
            Error::InvalidState(_) => ErrorCode::InvalidState,
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::InvalidHandle(_) => ErrorCode::InvalidHandle,
        }
    }
}

pub(crate) fn require_id(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", field)));
    }
    Ok(())
}
