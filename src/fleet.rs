use crate::aircraft::{Aircraft, AircraftId};
use crate::error::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

pub type SharedAircraft = Arc<Mutex<Aircraft>>;

/// Lookup table from aircraft id to the live aircraft.
///
/// Flights only carry an [`AircraftId`]; the fleet resolves it. The map lock is
/// held just long enough to clone the `Arc`, never while an aircraft is locked.
#[derive(Debug, Default)]
pub struct Fleet {
    aircraft: RwLock<HashMap<AircraftId, SharedAircraft>>,
}

impl Fleet {
    pub fn new() -> Fleet {
        Fleet::default()
    }

    pub fn register(&self, aircraft: Aircraft) -> Result<SharedAircraft> {
        let mut map = self.aircraft.write();
        if map.contains_key(aircraft.id()) {
            return Err(Error::InvalidArgument(format!(
                "aircraft {} is already registered",
                aircraft.id()
            )));
        }
        let id = aircraft.id().clone();
        let shared = Arc::new(Mutex::new(aircraft));
        map.insert(id.clone(), shared.clone());
        tracing::debug!(aircraft = %id, "registered aircraft");
        Ok(shared)
    }

    pub fn get(&self, id: &str) -> Result<SharedAircraft> {
        self.aircraft
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("aircraft {}", id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.aircraft.read().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<SharedAircraft> {
        self.aircraft.write().remove(id)
    }

    /// Sorted, so listings are deterministic.
    pub fn ids(&self) -> Vec<AircraftId> {
        let mut ids = self.aircraft.read().keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Copies of every aircraft, sorted by id.
    pub fn snapshot(&self) -> Vec<Aircraft> {
        self.ids()
            .iter()
            .filter_map(|id| self.get(id).ok())
            .map(|shared| shared.lock().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.aircraft.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let fleet = Fleet::new();
        let shared = fleet.register(Aircraft::new("N1", 1000.0).unwrap()).unwrap();
        let fetched = fleet.get("N1").unwrap();
        assert!(Arc::ptr_eq(&shared, &fetched));
        assert_eq!(1, fleet.len());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let fleet = Fleet::new();
        fleet.register(Aircraft::new("N1", 1000.0).unwrap()).unwrap();
        let err = fleet.register(Aircraft::new("N1", 50.0).unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(1000.0, fleet.get("N1").unwrap().lock().capacity());
    }

    #[test]
    fn test_unknown_aircraft() {
        let fleet = Fleet::new();
        assert!(matches!(fleet.get("N9"), Err(Error::NotFound(_))));
        assert!(fleet.remove("N9").is_none());
    }

    #[test]
    fn test_ids_sorted() {
        let fleet = Fleet::new();
        fleet.register(Aircraft::new("N2", 1.0).unwrap()).unwrap();
        fleet.register(Aircraft::new("N1", 1.0).unwrap()).unwrap();
        let ids = fleet.ids();
        assert_eq!(vec!["N1", "N2"], ids.iter().map(|id| &**id).collect::<Vec<_>>());
    }
}
