//! Handle-based entry point for callers outside Rust's ownership model
//!
//! Every entity lives in a generation-checked [`Arena`] owned by a
//! [`Registry`]. Callers only ever see opaque handles; a destroyed or foreign
//! handle is reported as [`ErrorCode::InvalidHandle`] and never dereferenced.
//!
//! `*_create` failures come back as `Err`; callers that need a sentinel map
//! them to the handle type's `NULL`, which never resolves.
//!
//! A flight handle refers either to a draft the caller owns or to a read-only
//! snapshot from [`Registry::schedule_find_flight`]. Adding a draft to a
//! schedule moves it there and retires its handle.
//!
//! Lock order: arena → schedule → fleet → aircraft. Nothing locks an aircraft
//! and then reaches back for an arena or a schedule.

pub mod arena;
pub mod buffer;

use crate::aircraft::Aircraft;
use crate::cargo::Cargo;
use crate::config::ScheduleConfig;
use crate::error::{Error, ErrorCode};
use crate::fleet::{Fleet, SharedAircraft};
use crate::flight::Flight;
use crate::schedule::Schedule;
use crate::time::Time;
use arena::{Arena, RawHandle};
use buffer::{write_str, BufferWrite};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(RawHandle);

        impl $name {
            pub const NULL: $name = $name(RawHandle::NULL);

            pub fn is_null(&self) -> bool {
                self.0.is_null()
            }

            pub fn to_bits(self) -> u64 {
                self.0.to_bits()
            }

            pub fn from_bits(bits: u64) -> $name {
                $name(RawHandle::from_bits(bits))
            }
        }
    };
}

handle_type!(
    /// Opaque reference to a [`Cargo`]
    CargoHandle
);
handle_type!(
    /// Opaque reference to an [`Aircraft`]
    AircraftHandle
);
handle_type!(
    /// Opaque reference to a [`Flight`]
    FlightHandle
);
handle_type!(
    /// Opaque reference to a [`Schedule`]
    ScheduleHandle
);

/// Core error translated for the boundary: stable code plus message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

fn stale(kind: &str, handle: RawHandle) -> ApiError {
    tracing::debug!(kind, handle = handle.to_bits(), "rejected stale handle");
    Error::InvalidHandle(format!("{} handle {:#x}", kind, handle.to_bits())).into()
}

type SharedSchedule = Arc<RwLock<Schedule>>;

/// Flight arena slot.
#[derive(Debug, Clone)]
struct FlightEntry {
    flight: Flight,
    /// Copy of a scheduled flight; never mutated through its handle.
    snapshot: bool,
}

impl FlightEntry {
    fn draft(flight: Flight) -> FlightEntry {
        FlightEntry { flight, snapshot: false }
    }

    fn ensure_draft(&self) -> crate::Result<()> {
        if self.snapshot {
            return Err(Error::InvalidState(format!(
                "flight {} is a schedule snapshot, change it through the schedule",
                self.flight.id()
            )));
        }
        Ok(())
    }
}

/// Owner of every entity reachable through handles.
#[derive(Default)]
pub struct Registry {
    config: ScheduleConfig,
    fleet: Arc<Fleet>,
    cargo: RwLock<Arena<Cargo>>,
    aircraft: RwLock<Arena<SharedAircraft>>,
    flights: RwLock<Arena<FlightEntry>>,
    schedules: RwLock<Arena<SharedSchedule>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Schedules created by this registry inherit `config`.
    pub fn with_config(config: ScheduleConfig) -> Registry {
        Registry {
            config,
            ..Registry::default()
        }
    }

    pub fn fleet(&self) -> &Arc<Fleet> {
        &self.fleet
    }

    fn with_cargo<R>(&self, handle: CargoHandle, f: impl FnOnce(&Cargo) -> R) -> ApiResult<R> {
        self.cargo
            .read()
            .get(handle.0)
            .map(f)
            .ok_or_else(|| stale("cargo", handle.0))
    }

    fn shared_aircraft(&self, handle: AircraftHandle) -> ApiResult<SharedAircraft> {
        self.aircraft
            .read()
            .get(handle.0)
            .cloned()
            .ok_or_else(|| stale("aircraft", handle.0))
    }

    fn with_aircraft<R>(&self, handle: AircraftHandle, f: impl FnOnce(&mut Aircraft) -> R) -> ApiResult<R> {
        let shared = self.shared_aircraft(handle)?;
        let mut aircraft = shared.lock();
        Ok(f(&mut aircraft))
    }

    fn with_flight<R>(&self, handle: FlightHandle, f: impl FnOnce(&Flight) -> R) -> ApiResult<R> {
        self.flights
            .read()
            .get(handle.0)
            .map(|entry| f(&entry.flight))
            .ok_or_else(|| stale("flight", handle.0))
    }

    /// Runs `f` on a draft flight and the aircraft operating it, both locked.
    fn with_flight_and_aircraft<R>(
        &self,
        handle: FlightHandle,
        f: impl FnOnce(&mut Flight, &mut Aircraft) -> crate::Result<R>,
    ) -> ApiResult<R> {
        let mut flights = self.flights.write();
        let entry = flights.get_mut(handle.0).ok_or_else(|| stale("flight", handle.0))?;
        entry.ensure_draft()?;
        let shared = self.fleet.get(entry.flight.aircraft_id())?;
        let mut aircraft = shared.lock();
        Ok(f(&mut entry.flight, &mut aircraft)?)
    }

    fn shared_schedule(&self, handle: ScheduleHandle) -> ApiResult<SharedSchedule> {
        self.schedules
            .read()
            .get(handle.0)
            .cloned()
            .ok_or_else(|| stale("schedule", handle.0))
    }

    // Cargo

    pub fn cargo_create(
        &self,
        number: &str,
        mass: f64,
        departure: &str,
        destination: &str,
        current: &str,
        arrival_time: u64,
    ) -> ApiResult<CargoHandle> {
        let cargo = Cargo::new(number, mass, departure, destination, current, Time(arrival_time))?;
        Ok(CargoHandle(self.cargo.write().insert(cargo)))
    }

    pub fn cargo_destroy(&self, handle: CargoHandle) -> ApiResult<()> {
        self.cargo
            .write()
            .remove(handle.0)
            .map(|_| ())
            .ok_or_else(|| stale("cargo", handle.0))
    }

    pub fn cargo_number(&self, handle: CargoHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_cargo(handle, |c| write_str(c.number(), buffer))
    }

    pub fn cargo_departure(&self, handle: CargoHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_cargo(handle, |c| write_str(c.departure_id(), buffer))
    }

    pub fn cargo_destination(&self, handle: CargoHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_cargo(handle, |c| write_str(c.destination_id(), buffer))
    }

    pub fn cargo_current(&self, handle: CargoHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_cargo(handle, |c| write_str(c.current_id(), buffer))
    }

    pub fn cargo_mass(&self, handle: CargoHandle) -> ApiResult<f64> {
        self.with_cargo(handle, |c| c.mass())
    }

    pub fn cargo_arrival_time(&self, handle: CargoHandle) -> ApiResult<u64> {
        self.with_cargo(handle, |c| c.arrival_time().0)
    }

    pub fn cargo_move_to(&self, handle: CargoHandle, airport: &str) -> ApiResult<()> {
        let airport = crate::airport::airport_id("cargo location", airport)?;
        self.cargo
            .write()
            .get_mut(handle.0)
            .map(|c| c.move_to(airport))
            .ok_or_else(|| stale("cargo", handle.0))
    }

    pub fn cargo_to_string(&self, handle: CargoHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_cargo(handle, |c| write_str(&c.to_string(), buffer))
    }

    // Aircraft

    /// Registers the aircraft in the shared fleet as well.
    pub fn aircraft_create(&self, number: &str, capacity: f64) -> ApiResult<AircraftHandle> {
        let shared = self.fleet.register(Aircraft::new(number, capacity)?)?;
        Ok(AircraftHandle(self.aircraft.write().insert(shared)))
    }

    /// Flights still naming this aircraft fail with `NotFound` afterwards.
    pub fn aircraft_destroy(&self, handle: AircraftHandle) -> ApiResult<()> {
        let shared = self
            .aircraft
            .write()
            .remove(handle.0)
            .ok_or_else(|| stale("aircraft", handle.0))?;
        let id = shared.lock().id().clone();
        if let Ok(registered) = self.fleet.get(&id) {
            if Arc::ptr_eq(&registered, &shared) {
                self.fleet.remove(&id);
            }
        }
        Ok(())
    }

    pub fn aircraft_number(&self, handle: AircraftHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_aircraft(handle, |a| write_str(a.id(), buffer))
    }

    pub fn aircraft_capacity(&self, handle: AircraftHandle) -> ApiResult<f64> {
        self.with_aircraft(handle, |a| a.capacity())
    }

    pub fn aircraft_current_load(&self, handle: AircraftHandle) -> ApiResult<f64> {
        self.with_aircraft(handle, |a| a.current_load())
    }

    pub fn aircraft_available_capacity(&self, handle: AircraftHandle) -> ApiResult<f64> {
        self.with_aircraft(handle, |a| a.available_capacity())
    }

    pub fn aircraft_can_carry(&self, handle: AircraftHandle, mass: f64) -> ApiResult<bool> {
        self.with_aircraft(handle, |a| a.can_carry(mass))
    }

    pub fn aircraft_cargo_count(&self, handle: AircraftHandle) -> ApiResult<usize> {
        self.with_aircraft(handle, |a| a.cargo_count())
    }

    /// Loads a copy of the cargo; the cargo handle stays valid.
    pub fn aircraft_add_cargo(&self, handle: AircraftHandle, cargo: CargoHandle) -> ApiResult<()> {
        let cargo = self.with_cargo(cargo, Cargo::clone)?;
        Ok(self.with_aircraft(handle, |a| a.add_cargo(cargo))??)
    }

    pub fn aircraft_remove_cargo(&self, handle: AircraftHandle, cargo_number: &str) -> ApiResult<()> {
        self.with_aircraft(handle, |a| a.remove_cargo(cargo_number).map(|_| ()))?
            .map_err(ApiError::from)
    }

    pub fn aircraft_clear_all(&self, handle: AircraftHandle) -> ApiResult<()> {
        self.with_aircraft(handle, |a| {
            a.clear_all();
        })
    }

    pub fn aircraft_to_string(&self, handle: AircraftHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_aircraft(handle, |a| write_str(&a.to_string(), buffer))
    }

    // Flight

    pub fn flight_create(
        &self,
        number: &str,
        departure: &str,
        destination: &str,
        departure_time: u64,
        arrival_time: u64,
        aircraft: AircraftHandle,
    ) -> ApiResult<FlightHandle> {
        let aircraft_id = self.with_aircraft(aircraft, |a| a.id().clone())?;
        let flight = Flight::new(
            number,
            departure,
            destination,
            Time(departure_time),
            Time(arrival_time),
            &aircraft_id,
        )?;
        Ok(FlightHandle(self.flights.write().insert(FlightEntry::draft(flight))))
    }

    /// Destroying a draft takes the cargo it loaded back off its aircraft.
    pub fn flight_destroy(&self, handle: FlightHandle) -> ApiResult<()> {
        let mut flights = self.flights.write();
        let entry = flights.remove(handle.0).ok_or_else(|| stale("flight", handle.0))?;
        if entry.snapshot {
            return Ok(());
        }
        if let Ok(shared) = self.fleet.get(entry.flight.aircraft_id()) {
            entry.flight.release_cargo(&mut shared.lock());
        }
        Ok(())
    }

    pub fn flight_number(&self, handle: FlightHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_flight(handle, |f| write_str(f.id(), buffer))
    }

    pub fn flight_departure(&self, handle: FlightHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_flight(handle, |f| write_str(f.origin_id(), buffer))
    }

    pub fn flight_destination(&self, handle: FlightHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_flight(handle, |f| write_str(f.destination_id(), buffer))
    }

    pub fn flight_aircraft(&self, handle: FlightHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_flight(handle, |f| write_str(f.aircraft_id(), buffer))
    }

    pub fn flight_departure_time(&self, handle: FlightHandle) -> ApiResult<u64> {
        self.with_flight(handle, |f| f.departure_time().0)
    }

    pub fn flight_arrival_time(&self, handle: FlightHandle) -> ApiResult<u64> {
        self.with_flight(handle, |f| f.arrival_time().0)
    }

    pub fn flight_duration(&self, handle: FlightHandle) -> ApiResult<u64> {
        self.with_flight(handle, |f| f.duration())
    }

    pub fn flight_is_completed(&self, handle: FlightHandle) -> ApiResult<bool> {
        self.with_flight(handle, |f| f.is_completed())
    }

    pub fn flight_cargo_count(&self, handle: FlightHandle) -> ApiResult<usize> {
        self.with_flight(handle, |f| f.cargo_count())
    }

    pub fn flight_conflicts_with(&self, handle: FlightHandle, other: FlightHandle) -> ApiResult<bool> {
        let flights = self.flights.read();
        let first = flights.get(handle.0).ok_or_else(|| stale("flight", handle.0))?;
        let second = flights.get(other.0).ok_or_else(|| stale("flight", other.0))?;
        Ok(first.flight.conflicts_with(&second.flight))
    }

    pub fn flight_add_cargo(&self, handle: FlightHandle, cargo: CargoHandle) -> ApiResult<()> {
        let cargo = self.with_cargo(cargo, Cargo::clone)?;
        self.with_flight_and_aircraft(handle, |f, a| f.add_cargo(cargo, a))
    }

    pub fn flight_remove_cargo(&self, handle: FlightHandle, cargo_number: &str) -> ApiResult<()> {
        self.with_flight_and_aircraft(handle, |f, a| f.remove_cargo(cargo_number, a).map(|_| ()))
    }

    pub fn flight_complete(&self, handle: FlightHandle) -> ApiResult<()> {
        self.with_flight_and_aircraft(handle, |f, a| f.complete(a))
    }

    pub fn flight_create_return(&self, handle: FlightHandle, turnaround: u64) -> ApiResult<FlightHandle> {
        let back = self.with_flight(handle, |f| f.create_return_flight(turnaround))??;
        Ok(FlightHandle(self.flights.write().insert(FlightEntry::draft(back))))
    }

    pub fn flight_to_string(&self, handle: FlightHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        self.with_flight(handle, |f| write_str(&f.to_string(), buffer))
    }

    // Schedule

    pub fn schedule_create(&self) -> ScheduleHandle {
        let schedule = Schedule::with_fleet(self.fleet.clone(), self.config);
        ScheduleHandle(self.schedules.write().insert(Arc::new(RwLock::new(schedule))))
    }

    pub fn schedule_destroy(&self, handle: ScheduleHandle) -> ApiResult<()> {
        self.schedules
            .write()
            .remove(handle.0)
            .map(|_| ())
            .ok_or_else(|| stale("schedule", handle.0))
    }

    /// Moves a draft into the schedule. On success the flight handle is
    /// retired; use [`Registry::schedule_find_flight`] to observe the scheduled
    /// flight. A rejected draft stays with the caller unchanged.
    pub fn schedule_add_flight(&self, handle: ScheduleHandle, flight: FlightHandle) -> ApiResult<()> {
        let schedule = self.shared_schedule(handle)?;
        let mut flights = self.flights.write();
        let entry = flights.get(flight.0).ok_or_else(|| stale("flight", flight.0))?;
        entry.ensure_draft()?;
        schedule.write().add_flight(entry.flight.clone())?;
        flights.remove(flight.0);
        Ok(())
    }

    pub fn schedule_remove_flight(&self, handle: ScheduleHandle, flight_number: &str) -> ApiResult<()> {
        let schedule = self.shared_schedule(handle)?;
        schedule.write().remove_flight(flight_number)?;
        Ok(())
    }

    /// Read-only snapshot of the scheduled flight under a fresh handle. Cargo
    /// and completion go through the `schedule_*` calls.
    pub fn schedule_find_flight(&self, handle: ScheduleHandle, flight_number: &str) -> ApiResult<FlightHandle> {
        let schedule = self.shared_schedule(handle)?;
        let flight = schedule
            .read()
            .find_flight(flight_number)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("flight {}", flight_number)))?;
        Ok(FlightHandle(self.flights.write().insert(FlightEntry {
            flight,
            snapshot: true,
        })))
    }

    pub fn schedule_complete_flight(&self, handle: ScheduleHandle, flight_number: &str) -> ApiResult<()> {
        let schedule = self.shared_schedule(handle)?;
        Ok(schedule.write().complete_flight(flight_number)?)
    }

    pub fn schedule_add_cargo(&self, handle: ScheduleHandle, flight_number: &str, cargo: CargoHandle) -> ApiResult<()> {
        let cargo = self.with_cargo(cargo, Cargo::clone)?;
        let schedule = self.shared_schedule(handle)?;
        Ok(schedule.write().add_cargo(flight_number, cargo)?)
    }

    /// Returns how many return flights were added.
    pub fn schedule_add_return_flights(&self, handle: ScheduleHandle) -> ApiResult<usize> {
        let schedule = self.shared_schedule(handle)?;
        let report = schedule.write().add_return_flights();
        Ok(report.added.len())
    }

    pub fn schedule_total_flights(&self, handle: ScheduleHandle) -> ApiResult<usize> {
        Ok(self.shared_schedule(handle)?.read().len())
    }

    pub fn schedule_completed_flights(&self, handle: ScheduleHandle) -> ApiResult<usize> {
        Ok(self.shared_schedule(handle)?.read().completed_count())
    }

    pub fn schedule_total_flight_time(&self, handle: ScheduleHandle, aircraft_number: &str) -> ApiResult<u64> {
        Ok(self.shared_schedule(handle)?.read().total_flight_time(aircraft_number))
    }

    pub fn schedule_is_valid(&self, handle: ScheduleHandle) -> ApiResult<bool> {
        Ok(self.shared_schedule(handle)?.read().is_valid())
    }

    /// One error per line.
    pub fn schedule_validation_errors(&self, handle: ScheduleHandle, buffer: &mut [u8]) -> ApiResult<BufferWrite> {
        let errors = self.shared_schedule(handle)?.read().validation_errors();
        Ok(write_str(&errors.join("\n"), buffer))
    }
}
