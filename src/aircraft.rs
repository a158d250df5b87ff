use crate::cargo::{Cargo, CargoId};
use crate::error::{require_id, Error, Result};
use crate::flight::FlightId;
use crate::time::Time;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tabled::Tabled;

pub type AircraftId = Arc<str>;

/// An aircraft and the cargo currently on board.
///
/// `load` is a running total kept in step with `manifest`, so `can_carry`
/// is O(1). Invariant: `load <= capacity`, and capacity is fixed at construction.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct Aircraft {
    id: AircraftId,
    capacity: f64,
    #[tabled(rename = "load")]
    load: f64,
    #[tabled(skip)]
    manifest: BTreeMap<CargoId, Cargo>,
    /// Flight each piece of cargo was loaded for, if any
    #[tabled(skip)]
    #[serde(skip)]
    carriers: BTreeMap<CargoId, FlightId>,
}

impl Aircraft {
    pub fn new(id: &str, capacity: f64) -> Result<Aircraft> {
        require_id("aircraft id", id)?;
        if !(capacity > 0.0) || !capacity.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "aircraft {} capacity must be positive, got {}",
                id, capacity
            )));
        }
        Ok(Aircraft {
            id: Arc::from(id.trim()),
            capacity,
            load: 0.0,
            manifest: BTreeMap::new(),
            carriers: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> &AircraftId {
        &self.id
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn current_load(&self) -> f64 {
        self.load
    }

    pub fn available_capacity(&self) -> f64 {
        self.capacity - self.load
    }

    pub fn can_carry(&self, mass: f64) -> bool {
        self.load + mass <= self.capacity
    }

    pub fn add_cargo(&mut self, cargo: Cargo) -> Result<()> {
        if self.manifest.contains_key(cargo.number()) {
            return Err(Error::InvalidArgument(format!(
                "cargo {} is already on board {}",
                cargo.number(),
                self.id
            )));
        }
        if !self.can_carry(cargo.mass()) {
            return Err(Error::CapacityExceeded {
                aircraft: self.id.clone(),
                requested: cargo.mass(),
                available: self.available_capacity(),
            });
        }
        self.load += cargo.mass();
        self.manifest.insert(cargo.number().clone(), cargo);
        Ok(())
    }

    /// Like [`Aircraft::add_cargo`], remembering which flight the cargo travels on.
    pub(crate) fn add_cargo_for(&mut self, flight: &FlightId, cargo: Cargo) -> Result<()> {
        let number = cargo.number().clone();
        self.add_cargo(cargo)?;
        self.carriers.insert(number, flight.clone());
        Ok(())
    }

    pub fn remove_cargo(&mut self, cargo_id: &str) -> Result<Cargo> {
        let cargo = self.manifest.remove(cargo_id).ok_or_else(|| {
            Error::NotFound(format!("cargo {} on aircraft {}", cargo_id, self.id))
        })?;
        self.carriers.remove(cargo_id);
        // reset on empty so float drift cannot accumulate across load cycles
        self.load = if self.manifest.is_empty() {
            0.0
        } else {
            self.load - cargo.mass()
        };
        Ok(cargo)
    }

    /// Removes the cargo only if it was loaded for `flight`.
    pub(crate) fn remove_cargo_for(&mut self, flight: &str, cargo_id: &str) -> Option<Cargo> {
        match self.carriers.get(cargo_id) {
            Some(carrier) if &**carrier == flight => self.remove_cargo(cargo_id).ok(),
            _ => None,
        }
    }

    /// Offloads everything. Returns the cargo that was on board.
    pub fn clear_all(&mut self) -> Vec<Cargo> {
        self.load = 0.0;
        self.carriers.clear();
        std::mem::take(&mut self.manifest).into_values().collect()
    }

    pub fn find_cargo(&self, cargo_id: &str) -> Option<&Cargo> {
        self.manifest.get(cargo_id)
    }

    pub fn cargo_count(&self) -> usize {
        self.manifest.len()
    }

    pub fn manifest(&self) -> impl Iterator<Item = &Cargo> {
        self.manifest.values()
    }

    pub fn overdue_cargo(&self, now: Time) -> Vec<&Cargo> {
        self.manifest.values().filter(|c| c.is_overdue(now)).collect()
    }
}

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aircraft #{} ({:.2}/{:.2} kg, {} cargo)",
            self.id,
            self.load,
            self.capacity,
            self.manifest.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cargo(number: &str, mass: f64) -> Cargo {
        Cargo::new(number, mass, "JFK", "LAX", "JFK", Time(0)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_capacity() {
        assert!(matches!(Aircraft::new("N1", 0.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(Aircraft::new("N1", -1.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(Aircraft::new("", 10.0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_capacity_is_inclusive() {
        let mut aircraft = Aircraft::new("N1", 1000.0).unwrap();
        aircraft.add_cargo(cargo("C1", 600.0)).unwrap();
        assert!(aircraft.can_carry(400.0));
        assert!(!aircraft.can_carry(400.5));
        aircraft.add_cargo(cargo("C2", 400.0)).unwrap();
        assert_eq!(0.0, aircraft.available_capacity());
        assert!(aircraft.can_carry(0.0));
    }

    #[test]
    fn test_capacity_exceeded_leaves_manifest_untouched() {
        let mut aircraft = Aircraft::new("N1", 1000.0).unwrap();
        aircraft.add_cargo(cargo("C1", 800.0)).unwrap();
        let err = aircraft.add_cargo(cargo("C2", 300.0)).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { .. }));
        assert_eq!(1, aircraft.cargo_count());
        assert_eq!(800.0, aircraft.current_load());
    }

    #[test]
    fn test_duplicate_cargo_rejected() {
        let mut aircraft = Aircraft::new("N1", 1000.0).unwrap();
        aircraft.add_cargo(cargo("C1", 10.0)).unwrap();
        assert!(matches!(aircraft.add_cargo(cargo("C1", 10.0)), Err(Error::InvalidArgument(_))));
        assert_eq!(10.0, aircraft.current_load());
    }

    #[test]
    fn test_remove_cargo() {
        let mut aircraft = Aircraft::new("N1", 1000.0).unwrap();
        aircraft.add_cargo(cargo("C1", 300.0)).unwrap();
        aircraft.add_cargo(cargo("C2", 200.0)).unwrap();

        let removed = aircraft.remove_cargo("C1").unwrap();
        assert_eq!("C1", &**removed.number());
        assert_eq!(200.0, aircraft.current_load());
        assert!(aircraft.find_cargo("C1").is_none());
        assert!(matches!(aircraft.remove_cargo("C1"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_clear_all() {
        let mut aircraft = Aircraft::new("N1", 1000.0).unwrap();
        aircraft.add_cargo(cargo("C1", 300.0)).unwrap();
        aircraft.add_cargo(cargo("C2", 200.0)).unwrap();

        let offloaded = aircraft.clear_all();
        assert_eq!(2, offloaded.len());
        assert_eq!(0, aircraft.cargo_count());
        assert_eq!(0.0, aircraft.current_load());
        assert!(aircraft.clear_all().is_empty());
    }

    #[test]
    fn test_overdue_cargo() {
        let mut aircraft = Aircraft::new("N1", 1000.0).unwrap();
        aircraft.add_cargo(cargo("C1", 10.0).with_deadline(Time(100))).unwrap();
        aircraft.add_cargo(cargo("C2", 10.0)).unwrap();
        let overdue = aircraft.overdue_cargo(Time(200));
        assert_eq!(1, overdue.len());
        assert_eq!("C1", &**overdue[0].number());
    }

    #[test]
    fn test_remove_cargo_for_other_flight_is_refused() {
        let mut aircraft = Aircraft::new("N1", 1000.0).unwrap();
        aircraft.add_cargo_for(&Arc::from("F1"), cargo("C1", 300.0)).unwrap();

        assert!(aircraft.remove_cargo_for("F2", "C1").is_none());
        assert_eq!(300.0, aircraft.current_load());
        assert!(aircraft.remove_cargo_for("F1", "C1").is_some());
        assert_eq!(0.0, aircraft.current_load());
    }

    #[test]
    fn test_capacity_is_read_only() {
        let aircraft = Aircraft::new("N1", 1000.0).unwrap();
        assert_eq!(1000.0, aircraft.capacity());
        assert_eq!("N1", &**aircraft.id());
    }

    proptest! {
        #[test]
        fn test_remaining_capacity_after_two_loads(
            capacity in 1u32..100_000,
            first in 0.0f64..1.0,
            second in 0.0f64..1.0,
        ) {
            let capacity = capacity as f64;
            let m1 = (capacity * first * 0.5).floor().max(1.0).min(capacity / 2.0);
            let m2 = (capacity * second * 0.5).floor().max(1.0).min(capacity / 2.0);
            prop_assume!(m1 + m2 <= capacity);

            let mut aircraft = Aircraft::new("N1", capacity).unwrap();
            prop_assert!(aircraft.add_cargo(cargo("C1", m1)).is_ok());
            prop_assert!(aircraft.add_cargo(cargo("C2", m2)).is_ok());
            prop_assert!(aircraft.can_carry(0.0));
            prop_assert_eq!(capacity - m1 - m2, aircraft.available_capacity());
        }
    }
}
