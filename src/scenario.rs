//! Loading a schedule and its cargo pool from a JSON scenario file

use crate::aircraft::Aircraft;
use crate::cargo::{Cargo, CargoId};
use crate::config::ScheduleConfig;
use crate::error::Error;
use crate::flight::Flight;
use crate::schedule::Schedule;
use crate::time::Time;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] Error),
}

#[derive(Deserialize)]
struct RawAircraft {
    id: String,
    capacity: f64,
}

#[derive(Deserialize)]
struct RawCargo {
    number: String,
    mass: f64,
    departure: String,
    destination: String,
    /// Defaults to `departure`
    current: Option<String>,
    #[serde(default)]
    arrival_time: u64,
    deadline: Option<u64>,
}

#[derive(Deserialize)]
struct RawFlight {
    id: String,
    origin: String,
    destination: String,
    departure_time: u64,
    arrival_time: u64,
    aircraft: String,
    /// Cargo numbers from the pool to put on board
    #[serde(default)]
    cargo: Vec<String>,
}

#[derive(Deserialize)]
struct RawScenario {
    #[serde(default)]
    config: ScheduleConfig,
    #[serde(default)]
    aircraft: Vec<RawAircraft>,
    #[serde(default)]
    cargo: Vec<RawCargo>,
    #[serde(default)]
    flights: Vec<RawFlight>,
}

/// A schedule built through the same validated operations a caller would
/// use, plus the pool of cargo available for loading.
pub struct Scenario {
    pub schedule: Schedule,
    pub cargo: HashMap<CargoId, Cargo>,
}

impl Scenario {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
        let data = std::fs::read_to_string(path)?;
        Scenario::from_json(&data)
    }

    /// Any rejected aircraft, flight or load aborts the whole scenario.
    pub fn from_json(data: &str) -> Result<Scenario, ScenarioError> {
        let raw: RawScenario = serde_json::from_str(data)?;

        let mut schedule = Schedule::new(raw.config);
        for a in raw.aircraft {
            schedule.register_aircraft(Aircraft::new(&a.id, a.capacity)?)?;
        }

        let mut cargo = HashMap::new();
        for c in raw.cargo {
            let current = c.current.as_deref().unwrap_or(&c.departure);
            let mut item = Cargo::new(
                &c.number,
                c.mass,
                &c.departure,
                &c.destination,
                current,
                Time(c.arrival_time),
            )?;
            if let Some(deadline) = c.deadline {
                item = item.with_deadline(Time(deadline));
            }
            if cargo.insert(item.number().clone(), item).is_some() {
                return Err(Error::InvalidArgument(format!("cargo {} listed twice", c.number)).into());
            }
        }

        for f in raw.flights {
            let flight = Flight::new(
                &f.id,
                &f.origin,
                &f.destination,
                Time(f.departure_time),
                Time(f.arrival_time),
                &f.aircraft,
            )?;
            let flight_id = flight.id().clone();
            schedule.add_flight(flight)?;
            for number in f.cargo {
                let item = cargo
                    .get(number.as_str())
                    .cloned()
                    .ok_or_else(|| Error::NotFound(format!("cargo {}", number)))?;
                schedule.add_cargo(&flight_id, item)?;
            }
        }

        tracing::info!(
            aircraft = schedule.fleet().len(),
            cargo = cargo.len(),
            flights = schedule.len(),
            "loaded scenario"
        );
        Ok(Scenario { schedule, cargo })
    }
}
