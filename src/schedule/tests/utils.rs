use crate::aircraft::Aircraft;
use crate::cargo::Cargo;
use crate::config::ScheduleConfig;
use crate::flight::Flight;
use crate::schedule::schedule::Schedule;
use crate::time::Time;
use proptest::prelude::Strategy;
use proptest::prop_oneof;
use proptest::strategy::Just;
use std::sync::Arc;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

/// 10:00 on day one, and so on.
pub fn at(hours: u64, minutes: u64) -> Time {
    Time(hours * 60 + minutes)
}

pub fn schedule_with(aircraft: &[(&str, f64)], config: ScheduleConfig) -> Schedule {
    let schedule = Schedule::new(config);
    for (aircraft_id, capacity) in aircraft {
        schedule
            .register_aircraft(Aircraft::new(aircraft_id, *capacity).unwrap())
            .unwrap();
    }
    schedule
}

pub fn schedule(aircraft: &[(&str, f64)]) -> Schedule {
    schedule_with(aircraft, ScheduleConfig::default())
}

pub fn flight(
    flight_id: &str,
    origin_id: &str,
    destination_id: &str,
    departure_time: Time,
    arrival_time: Time,
    aircraft_id: &str,
) -> Flight {
    Flight::new(
        flight_id,
        origin_id,
        destination_id,
        departure_time,
        arrival_time,
        aircraft_id,
    )
    .unwrap()
}

pub fn add_flight(
    schedule: &mut Schedule,
    flight_id: &str,
    origin_id: &str,
    destination_id: &str,
    departure_time: Time,
    arrival_time: Time,
    aircraft_id: &str,
) {
    schedule
        .add_flight(flight(
            flight_id,
            origin_id,
            destination_id,
            departure_time,
            arrival_time,
            aircraft_id,
        ))
        .unwrap();
}

pub fn cargo(number: &str, mass: f64, departure_id: &str, destination_id: &str) -> Cargo {
    Cargo::new(number, mass, departure_id, destination_id, departure_id, Time(0)).unwrap()
}

pub fn arb_id(prefix: &'static str) -> impl Strategy<Value = Arc<str>> {
    prop_oneof![
        Just(Arc::from(format!("{}_1", prefix))),
        Just(Arc::from(format!("{}_2", prefix))),
        Just(Arc::from(format!("{}_3", prefix))),
    ]
}

/// Flight number is filled in by the caller so every candidate is unique.
pub fn arb_leg() -> impl Strategy<Value = (Arc<str>, u64, u64)> {
    (arb_id("AC"), 0..2500u64, 10..600u64)
}
