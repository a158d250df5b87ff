use crate::aircraft::{Aircraft, AircraftId};
use crate::airport::{airport_id, AirportId};
use crate::cargo::{Cargo, CargoId};
use crate::error::{require_id, Error, Result};
use crate::time::Time;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use tabled::Tabled;

pub type FlightId = Arc<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlightStatus {
    Scheduled,
    Completed,
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FlightStatus::Scheduled => write!(f, "Scheduled"),
            FlightStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// One leg flown by one aircraft.
///
/// Fields are read through getters; the window and status only change through
/// the validated constructor and [`Flight::complete`].
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct Flight {
    id: FlightId,
    aircraft_id: AircraftId,
    origin_id: AirportId,
    destination_id: AirportId,
    departure_time: Time,
    arrival_time: Time,
    status: FlightStatus,
    #[tabled(skip)]
    manifest: BTreeMap<CargoId, Cargo>,
}

impl Flight {
    pub fn new(
        id: &str,
        origin_id: &str,
        destination_id: &str,
        departure_time: Time,
        arrival_time: Time,
        aircraft_id: &str,
    ) -> Result<Flight> {
        require_id("flight number", id)?;
        require_id("aircraft id", aircraft_id)?;
        let origin_id = airport_id("flight origin", origin_id)?;
        let destination_id = airport_id("flight destination", destination_id)?;
        if origin_id == destination_id {
            return Err(Error::InvalidArgument(format!(
                "flight {} departs and arrives at {}",
                id, origin_id
            )));
        }
        if departure_time >= arrival_time {
            return Err(Error::InvalidArgument(format!(
                "flight {} departs at {} but arrives at {}",
                id, departure_time, arrival_time
            )));
        }
        Ok(Flight {
            id: Arc::from(id.trim()),
            aircraft_id: Arc::from(aircraft_id.trim()),
            origin_id,
            destination_id,
            departure_time,
            arrival_time,
            status: FlightStatus::Scheduled,
            manifest: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &FlightId {
        &self.id
    }

    pub fn aircraft_id(&self) -> &AircraftId {
        &self.aircraft_id
    }

    pub fn origin_id(&self) -> &AirportId {
        &self.origin_id
    }

    pub fn destination_id(&self) -> &AirportId {
        &self.destination_id
    }

    pub fn departure_time(&self) -> Time {
        self.departure_time
    }

    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    pub fn status(&self) -> FlightStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == FlightStatus::Completed
    }

    pub fn duration(&self) -> u64 {
        (self.arrival_time - self.departure_time).0
    }

    pub fn window(&self) -> (Time, Time) {
        (self.departure_time, self.arrival_time)
    }

    /// Same aircraft and overlapping half-open windows. Back-to-back flights
    /// (`arrival == other.departure`) do not conflict.
    pub fn conflicts_with(&self, other: &Flight) -> bool {
        self.aircraft_id == other.aircraft_id
            && Time::is_overlapping(&self.window(), &other.window())
    }

    pub fn manifest(&self) -> impl Iterator<Item = &Cargo> {
        self.manifest.values()
    }

    pub fn cargo_count(&self) -> usize {
        self.manifest.len()
    }

    pub fn manifest_mass(&self) -> f64 {
        self.manifest.values().map(|c| c.mass()).sum()
    }

    fn ensure_scheduled(&self) -> Result<()> {
        match self.status {
            FlightStatus::Scheduled => Ok(()),
            FlightStatus::Completed => Err(Error::InvalidState(format!(
                "flight {} is already completed",
                self.id
            ))),
        }
    }

    fn ensure_operated_by(&self, aircraft: &Aircraft) -> Result<()> {
        if aircraft.id() != &self.aircraft_id {
            return Err(Error::InvalidArgument(format!(
                "flight {} is operated by {}, not {}",
                self.id,
                self.aircraft_id,
                aircraft.id()
            )));
        }
        Ok(())
    }

    /// Loads cargo onto the operating aircraft and records it on this flight.
    ///
    /// Both the aircraft's current load and this flight's own manifest must
    /// stay within capacity. The two differ once a sibling flight's completion
    /// has emptied the aircraft.
    pub fn add_cargo(&mut self, cargo: Cargo, aircraft: &mut Aircraft) -> Result<()> {
        self.ensure_scheduled()?;
        self.ensure_operated_by(aircraft)?;
        if self.manifest.contains_key(cargo.number()) {
            return Err(Error::InvalidArgument(format!(
                "cargo {} is already on flight {}",
                cargo.number(),
                self.id
            )));
        }
        let manifest_mass = self.manifest_mass();
        if manifest_mass + cargo.mass() > aircraft.capacity() {
            return Err(Error::CapacityExceeded {
                aircraft: aircraft.id().clone(),
                requested: cargo.mass(),
                available: aircraft.capacity() - manifest_mass,
            });
        }
        aircraft.add_cargo_for(&self.id, cargo.clone())?;
        tracing::debug!(flight = %self.id, cargo = %cargo.number(), "loaded cargo");
        self.manifest.insert(cargo.number().clone(), cargo);
        Ok(())
    }

    /// The manifest is frozen once the flight is completed. Only cargo this
    /// flight loaded is taken off the aircraft.
    pub fn remove_cargo(&mut self, cargo_id: &str, aircraft: &mut Aircraft) -> Result<Cargo> {
        self.ensure_scheduled()?;
        self.ensure_operated_by(aircraft)?;
        let cargo = self
            .manifest
            .remove(cargo_id)
            .ok_or_else(|| Error::NotFound(format!("cargo {} on flight {}", cargo_id, self.id)))?;
        if aircraft.remove_cargo_for(&self.id, cargo_id).is_none() {
            tracing::debug!(flight = %self.id, cargo = %cargo_id, "cargo was no longer on board");
        }
        tracing::debug!(flight = %self.id, cargo = %cargo_id, "unloaded cargo");
        Ok(cargo)
    }

    /// Takes this flight's cargo back off the aircraft when the flight is
    /// dropped before completion. The manifest itself is left as is.
    pub(crate) fn release_cargo(&self, aircraft: &mut Aircraft) {
        if self.is_completed() || aircraft.id() != &self.aircraft_id {
            return;
        }
        for cargo in self.manifest.values() {
            if aircraft.remove_cargo_for(&self.id, cargo.number()).is_none() {
                tracing::warn!(
                    flight = %self.id,
                    cargo = %cargo.number(),
                    aircraft = %aircraft.id(),
                    "cargo not on board for this flight, left in place"
                );
            }
        }
    }

    /// `Scheduled -> Completed`.
    ///
    /// Completing a flight is what empties the aircraft: the manifest cargo is
    /// considered delivered at the destination and `aircraft.clear_all()` runs.
    pub fn complete(&mut self, aircraft: &mut Aircraft) -> Result<()> {
        self.ensure_scheduled()?;
        self.ensure_operated_by(aircraft)?;
        self.status = FlightStatus::Completed;
        for cargo in self.manifest.values_mut() {
            cargo.move_to(self.destination_id.clone());
        }
        let offloaded = aircraft.clear_all();
        tracing::info!(
            flight = %self.id,
            aircraft = %aircraft.id(),
            offloaded = offloaded.len(),
            "flight completed"
        );
        Ok(())
    }

    pub fn return_flight_id(&self) -> FlightId {
        Arc::from(format!("{}R", self.id))
    }

    /// Derives the return leg: swapped route, same aircraft and duration,
    /// departing `turnaround` minutes after this flight arrives, empty manifest.
    ///
    /// Fails with `InvalidArgument` if the return leg would end past the
    /// representable time horizon.
    pub fn create_return_flight(&self, turnaround: u64) -> Result<Flight> {
        let departure_time = self.arrival_time.checked_add(turnaround);
        let arrival_time = departure_time.and_then(|t| t.checked_add(self.duration()));
        let (Some(departure_time), Some(arrival_time)) = (departure_time, arrival_time) else {
            return Err(Error::InvalidArgument(format!(
                "return of flight {} after {} minutes overflows the time horizon",
                self.id, turnaround
            )));
        };
        Ok(Flight {
            id: self.return_flight_id(),
            aircraft_id: self.aircraft_id.clone(),
            origin_id: self.destination_id.clone(),
            destination_id: self.origin_id.clone(),
            departure_time,
            arrival_time,
            status: FlightStatus::Scheduled,
            manifest: BTreeMap::new(),
        })
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Flight #{} {} -> {} [{} - {}] on {} ({}, {} cargo)",
            self.id,
            self.origin_id,
            self.destination_id,
            self.departure_time,
            self.arrival_time,
            self.aircraft_id,
            self.status,
            self.manifest.len()
        )
    }
}
