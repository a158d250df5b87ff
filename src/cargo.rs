use crate::airport::{airport_id, AirportId};
use crate::error::{require_id, Error, Result};
use crate::time::Time;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub type CargoId = Arc<str>;

/// A consignment with fixed identity, mass and routing.
///
/// Only `current_id` changes after construction; everything else is fixed.
/// Clones are independent values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cargo {
    number: CargoId,
    mass: f64,
    departure_id: AirportId,
    destination_id: AirportId,
    current_id: AirportId,
    arrival_time: Time,
    deadline: Option<Time>,
}

impl Cargo {
    pub fn new(
        number: &str,
        mass: f64,
        departure_id: &str,
        destination_id: &str,
        current_id: &str,
        arrival_time: Time,
    ) -> Result<Cargo> {
        require_id("cargo number", number)?;
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "cargo {} mass must be positive, got {}",
                number, mass
            )));
        }
        Ok(Cargo {
            number: Arc::from(number.trim()),
            mass,
            departure_id: airport_id("cargo departure", departure_id)?,
            destination_id: airport_id("cargo destination", destination_id)?,
            current_id: airport_id("cargo location", current_id)?,
            arrival_time,
            deadline: None,
        })
    }

    /// Marks the cargo as urgent: it must reach its destination by `deadline`.
    pub fn with_deadline(mut self, deadline: Time) -> Cargo {
        self.deadline = Some(deadline);
        self
    }

    pub fn number(&self) -> &CargoId {
        &self.number
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn departure_id(&self) -> &AirportId {
        &self.departure_id
    }

    pub fn destination_id(&self) -> &AirportId {
        &self.destination_id
    }

    pub fn current_id(&self) -> &AirportId {
        &self.current_id
    }

    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    pub fn deadline(&self) -> Option<Time> {
        self.deadline
    }

    pub fn move_to(&mut self, airport: AirportId) {
        self.current_id = airport;
    }

    pub fn has_reached_destination(&self) -> bool {
        self.current_id == self.destination_id
    }

    pub fn is_overdue(&self, now: Time) -> bool {
        self.deadline
            .map_or(false, |deadline| now > deadline && !self.has_reached_destination())
    }
}

impl fmt::Display for Cargo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cargo #{} ({:.2} kg) [{} -> {}, at {}] arrived {}",
            self.number, self.mass, self.departure_id, self.destination_id, self.current_id, self.arrival_time
        )?;
        if let Some(deadline) = self.deadline {
            write!(f, " due {}", deadline)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cargo(mass: f64) -> Result<Cargo> {
        Cargo::new("C1", mass, "JFK", "LAX", "JFK", Time(540))
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        assert!(matches!(cargo(0.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(cargo(-5.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(cargo(f64::NAN), Err(Error::InvalidArgument(_))));
        assert!(cargo(0.5).is_ok());
    }

    #[test]
    fn test_rejects_empty_identifiers() {
        assert!(Cargo::new("", 10.0, "JFK", "LAX", "JFK", Time(0)).is_err());
        assert!(Cargo::new("C1", 10.0, "", "LAX", "JFK", Time(0)).is_err());
        assert!(Cargo::new("C1", 10.0, "JFK", "", "JFK", Time(0)).is_err());
        assert!(Cargo::new("C1", 10.0, "JFK", "LAX", "", Time(0)).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = cargo(500.0).unwrap();
        let mut copy = original.clone();
        copy.move_to(Arc::from("LAX"));

        assert_eq!("JFK", &**original.current_id());
        assert!(copy.has_reached_destination());
        assert!(!original.has_reached_destination());
        assert_eq!(original.number(), copy.number());
        assert_eq!(original.mass(), copy.mass());
    }

    #[test]
    fn test_overdue_only_until_delivered() {
        let mut urgent = cargo(10.0).unwrap().with_deadline(Time(1000));
        assert!(!urgent.is_overdue(Time(1000)));
        assert!(urgent.is_overdue(Time(1001)));
        urgent.move_to(Arc::from("LAX"));
        assert!(!urgent.is_overdue(Time(1001)));
        assert!(!cargo(10.0).unwrap().is_overdue(Time(99_999)));
    }
}
