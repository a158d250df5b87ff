//! Airfreight scheduling core
//!
//! Aircraft, cargo and flights, with a schedule that refuses to double-book an
//! aircraft or overload it.
//!
//! - Flights on the same aircraft may not overlap; windows are half-open, so a
//!   flight may depart the minute the previous one arrives.
//! - Cargo on an aircraft never exceeds its capacity.
//! - Completing a flight is the only thing that offloads an aircraft.
//!
//! [`api::Registry`] exposes the same operations through generation-checked
//! handles for callers that cannot hold Rust references.

pub mod aircraft;
pub mod airport;
pub mod api;
pub mod cargo;
pub mod config;
pub mod error;
pub mod fleet;
pub mod flight;
pub mod scenario;
pub mod schedule;
pub mod time;

pub use aircraft::{Aircraft, AircraftId};
pub use airport::AirportId;
pub use cargo::{Cargo, CargoId};
pub use config::ScheduleConfig;
pub use error::{Error, ErrorCode, Result};
pub use fleet::{Fleet, SharedAircraft};
pub use flight::{Flight, FlightId, FlightStatus};
pub use schedule::{ReturnFlightReport, Schedule};
pub use time::Time;
