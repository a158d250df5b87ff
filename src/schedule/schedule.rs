use crate::aircraft::{Aircraft, AircraftId};
use crate::cargo::Cargo;
use crate::config::ScheduleConfig;
use crate::error::{Error, Result};
use crate::fleet::{Fleet, SharedAircraft};
use crate::flight::{Flight, FlightId, FlightStatus};
use crate::time::Time;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of deriving return legs for every active flight.
#[derive(Debug, Default)]
pub struct ReturnFlightReport {
    pub added: Vec<FlightId>,
    pub rejected: Vec<(FlightId, Error)>,
}

/// The authoritative set of flights for a fleet.
///
/// Every mutation takes `&mut self`, so a schedule shared between threads
/// sits behind a single lock; aircraft are locked only after it.
pub struct Schedule {
    fleet: Arc<Fleet>,
    config: ScheduleConfig,
    flights: Vec<Flight>,
    flights_index: HashMap<FlightId, usize>,
    aircraft_index: HashMap<AircraftId, Vec<usize>>,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::new(ScheduleConfig::default())
    }
}

impl Schedule {
    pub fn new(config: ScheduleConfig) -> Schedule {
        Schedule::with_fleet(Arc::new(Fleet::new()), config)
    }

    pub fn with_fleet(fleet: Arc<Fleet>, config: ScheduleConfig) -> Schedule {
        Schedule {
            fleet,
            config,
            flights: vec![],
            flights_index: HashMap::new(),
            aircraft_index: HashMap::new(),
        }
    }

    pub fn fleet(&self) -> &Arc<Fleet> {
        &self.fleet
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn set_turnaround(&mut self, turnaround: u64) {
        self.config.turnaround = turnaround;
    }

    pub fn register_aircraft(&self, aircraft: Aircraft) -> Result<SharedAircraft> {
        self.fleet.register(aircraft)
    }

    fn reindex(&mut self) {
        self.flights.sort_by(|a, b| {
            a.departure_time()
                .cmp(&b.departure_time())
                .then_with(|| a.id().cmp(b.id()))
        });
        self.flights_index = self
            .flights
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id().clone(), i))
            .collect();
        self.aircraft_index.clear();
        self.flights
            .iter()
            .enumerate()
            .for_each(|(i, f)| self.aircraft_index.entry(f.aircraft_id().clone()).or_default().push(i));
    }

    fn index_of(&self, flight_id: &str) -> Result<usize> {
        self.flights_index
            .get(flight_id)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("flight {}", flight_id)))
    }

    /// First active flight on the same aircraft whose window overlaps `flight`.
    fn find_conflict(&self, flight: &Flight) -> Option<&Flight> {
        self.aircraft_index.get(flight.aircraft_id()).and_then(|indices| {
            indices
                .iter()
                .map(|i| &self.flights[*i])
                .filter(|existing| !existing.is_completed())
                .find(|existing| existing.conflicts_with(flight))
        })
    }

    /// Validated insertion.
    ///
    /// Rejects a flight number already present, an aircraft the fleet does not
    /// know, an overlap with any active flight on the same aircraft, and a
    /// manifest heavier than the aircraft can carry. A rejected flight leaves
    /// the schedule unchanged.
    pub fn add_flight(&mut self, flight: Flight) -> Result<()> {
        if self.flights_index.contains_key(flight.id()) {
            tracing::warn!(flight = %flight.id(), "rejected duplicate flight");
            return Err(Error::DuplicateFlight(flight.id().clone()));
        }
        let aircraft = self.fleet.get(flight.aircraft_id())?;
        if let Some(existing) = self.find_conflict(&flight) {
            tracing::warn!(
                flight = %flight.id(),
                existing = %existing.id(),
                aircraft = %flight.aircraft_id(),
                "rejected conflicting flight"
            );
            return Err(Error::SchedulingConflict {
                flight: flight.id().clone(),
                existing: existing.id().clone(),
            });
        }
        {
            let aircraft = aircraft.lock();
            let mass = flight.manifest_mass();
            if mass > aircraft.capacity() {
                tracing::warn!(flight = %flight.id(), mass, "rejected overweight flight");
                return Err(Error::CapacityExceeded {
                    aircraft: aircraft.id().clone(),
                    requested: mass,
                    available: aircraft.capacity(),
                });
            }
        }
        tracing::debug!(
            flight = %flight.id(),
            aircraft = %flight.aircraft_id(),
            departure = %flight.departure_time(),
            arrival = %flight.arrival_time(),
            "scheduled flight"
        );
        self.flights.push(flight);
        self.reindex();
        self.assert_invariants();
        Ok(())
    }

    /// Drops a flight. Cargo it loaded and that is still on board is taken
    /// off the aircraft; cargo loaded for other flights stays.
    pub fn remove_flight(&mut self, flight_id: &str) -> Result<Flight> {
        let idx = self.index_of(flight_id)?;
        let flight = self.flights.remove(idx);
        match self.fleet.get(flight.aircraft_id()) {
            Ok(aircraft) => flight.release_cargo(&mut aircraft.lock()),
            Err(_) if flight.cargo_count() > 0 && !flight.is_completed() => {
                tracing::warn!(flight = %flight.id(), aircraft = %flight.aircraft_id(), "aircraft gone, cargo not unloaded")
            }
            Err(_) => {}
        }
        tracing::debug!(flight = %flight.id(), "removed flight");
        self.reindex();
        Ok(flight)
    }

    pub fn find_flight(&self, flight_id: &str) -> Option<&Flight> {
        self.flights_index.get(flight_id).map(|i| &self.flights[*i])
    }

    /// Completes a scheduled flight and offloads its aircraft.
    pub fn complete_flight(&mut self, flight_id: &str) -> Result<()> {
        let idx = self.index_of(flight_id)?;
        if self.flights[idx].is_completed() {
            return Err(Error::InvalidState(format!(
                "flight {} is already completed",
                flight_id
            )));
        }
        let aircraft = self.fleet.get(self.flights[idx].aircraft_id())?;
        let mut aircraft = aircraft.lock();
        self.flights[idx].complete(&mut aircraft)
    }

    pub fn add_cargo(&mut self, flight_id: &str, cargo: Cargo) -> Result<()> {
        let idx = self.index_of(flight_id)?;
        let aircraft = self.fleet.get(self.flights[idx].aircraft_id())?;
        let mut aircraft = aircraft.lock();
        self.flights[idx].add_cargo(cargo, &mut aircraft)
    }

    pub fn remove_cargo(&mut self, flight_id: &str, cargo_id: &str) -> Result<Cargo> {
        let idx = self.index_of(flight_id)?;
        let aircraft = self.fleet.get(self.flights[idx].aircraft_id())?;
        let mut aircraft = aircraft.lock();
        self.flights[idx].remove_cargo(cargo_id, &mut aircraft)
    }

    /// Return leg for `flight_id` using the configured turnaround. Not inserted.
    pub fn create_return_flight(&self, flight_id: &str) -> Result<Flight> {
        let idx = self.index_of(flight_id)?;
        self.flights[idx].create_return_flight(self.config.turnaround)
    }

    pub fn add_return_flight(&mut self, flight_id: &str) -> Result<FlightId> {
        let back = self.create_return_flight(flight_id)?;
        let id = back.id().clone();
        self.add_flight(back)?;
        tracing::info!(flight = %flight_id, return_flight = %id, "added return flight");
        Ok(id)
    }

    /// Derives and inserts a return leg for every active flight.
    pub fn add_return_flights(&mut self) -> ReturnFlightReport {
        let turnaround = self.config.turnaround;
        let candidates = self
            .active_flights()
            .map(|f| (f.return_flight_id(), f.create_return_flight(turnaround)))
            .collect::<Vec<_>>();

        let mut report = ReturnFlightReport::default();
        for (id, flight) in candidates {
            match flight.and_then(|f| self.add_flight(f)) {
                Ok(()) => report.added.push(id),
                Err(e) => report.rejected.push((id, e)),
            }
        }
        tracing::info!(
            added = report.added.len(),
            rejected = report.rejected.len(),
            "derived return flights"
        );
        report
    }

    /// Ordered by departure time.
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn active_flights(&self) -> impl Iterator<Item = &Flight> {
        self.flights.iter().filter(|f| f.status() == FlightStatus::Scheduled)
    }

    pub fn completed_flights(&self) -> impl Iterator<Item = &Flight> {
        self.flights.iter().filter(|f| f.status() == FlightStatus::Completed)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active_flights().count()
    }

    pub fn completed_count(&self) -> usize {
        self.completed_flights().count()
    }

    pub fn flights_by_aircraft(&self, aircraft_id: &str) -> Vec<&Flight> {
        self.aircraft_index
            .get(aircraft_id)
            .map(|indices| indices.iter().map(|i| &self.flights[*i]).collect())
            .unwrap_or_default()
    }

    pub fn flights_by_airport(&self, airport_id: &str) -> Vec<&Flight> {
        self.flights
            .iter()
            .filter(|f| &**f.origin_id() == airport_id || &**f.destination_id() == airport_id)
            .collect()
    }

    /// Flights departing within `[start, end]`.
    pub fn flights_in_range(&self, start: Time, end: Time) -> Vec<&Flight> {
        self.flights
            .iter()
            .filter(|f| f.departure_time() >= start && f.departure_time() <= end)
            .collect()
    }

    /// Minutes flown or scheduled for an aircraft.
    pub fn total_flight_time(&self, aircraft_id: &str) -> u64 {
        self.flights_by_aircraft(aircraft_id)
            .iter()
            .map(|f| f.duration())
            .sum()
    }

    /// Aircraft flying more than `max_daily_flight_time` minutes on any day,
    /// counting each flight towards the day it departs.
    pub fn overworked_aircraft(&self) -> Vec<AircraftId> {
        let daily = self.flights.iter().fold(
            HashMap::<(AircraftId, u64), u64>::new(),
            |mut acc, f| {
                *acc.entry((f.aircraft_id().clone(), f.departure_time().day()))
                    .or_default() += f.duration();
                acc
            },
        );
        let mut overworked = daily
            .into_iter()
            .filter(|(_, minutes)| *minutes > self.config.max_daily_flight_time)
            .map(|((ac_id, _), _)| ac_id)
            .collect::<Vec<_>>();
        overworked.sort();
        overworked.dedup();
        overworked
    }

    /// Urgent cargo on active flights that is past its deadline at `now`.
    pub fn overdue_cargo(&self, now: Time) -> Vec<(FlightId, Cargo)> {
        self.active_flights()
            .flat_map(|f| {
                f.manifest()
                    .filter(move |c| c.is_overdue(now))
                    .map(move |c| (f.id().clone(), c.clone()))
            })
            .collect()
    }

    /// Human-readable list of broken invariants; empty when the schedule is sound.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = vec![];
        for (ac_id, indices) in self.aircraft_index.iter() {
            match self.fleet.get(ac_id) {
                Ok(aircraft) => {
                    let capacity = aircraft.lock().capacity();
                    indices
                        .iter()
                        .map(|i| &self.flights[*i])
                        .filter(|f| !f.is_completed() && f.manifest_mass() > capacity)
                        .for_each(|f| {
                            errors.push(format!(
                                "Flight {} carries {} kg, aircraft {} takes {} kg",
                                f.id(),
                                f.manifest_mass(),
                                ac_id,
                                capacity
                            ))
                        });
                }
                Err(_) => errors.push(format!("Aircraft {} is not in the fleet", ac_id)),
            }

            let active = indices
                .iter()
                .map(|i| &self.flights[*i])
                .filter(|f| !f.is_completed())
                .collect::<Vec<_>>();
            for (n, first) in active.iter().enumerate() {
                for second in active.iter().skip(n + 1) {
                    if first.conflicts_with(second) {
                        errors.push(format!(
                            "Flight {} conflicts with flight {} on {}",
                            first.id(), second.id(), ac_id
                        ));
                    }
                }
            }
        }
        errors.sort();
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            config: &'a ScheduleConfig,
            aircraft: Vec<Aircraft>,
            flights: &'a [Flight],
        }
        serde_json::to_string_pretty(&Snapshot {
            config: &self.config,
            aircraft: self.fleet.snapshot(),
            flights: &self.flights,
        })
    }

    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        debug_assert!(
            self.flights
                .windows(2)
                .all(|fs| fs[0].departure_time() <= fs[1].departure_time()),
            "Departure ordering invariant violated"
        );
        debug_assert_eq!(
            self.flights.len(),
            self.flights_index.len(),
            "Unique flight number invariant violated"
        );
        for indices in self.aircraft_index.values() {
            let active = indices
                .iter()
                .map(|i| &self.flights[*i])
                .filter(|f| !f.is_completed())
                .collect::<Vec<_>>();
            debug_assert!(
                active.windows(2).all(|fs| fs[0].arrival_time() <= fs[1].departure_time()),
                "No-overlap per aircraft invariant violated"
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn assert_invariants(&self) {}
}
