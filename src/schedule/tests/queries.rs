use crate::config::ScheduleConfig;
use crate::schedule::tests::utils::{add_flight, at, id, schedule, schedule_with};
use crate::time::Time;

#[test]
fn test_flights_by_airport() {
    let mut schedule = schedule(&[("N1", 1000.0), ("N2", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(10, 0), at(18, 0), "N1");
    add_flight(&mut schedule, "F2", "ORD", "JFK", at(6, 0), at(9, 0), "N2");
    add_flight(&mut schedule, "F3", "ORD", "SFO", at(11, 0), at(13, 0), "N2");

    let ids = schedule
        .flights_by_airport("JFK")
        .iter()
        .map(|f| f.id().clone())
        .collect::<Vec<_>>();
    assert_eq!(vec![id("F2"), id("F1")], ids);
    assert!(schedule.flights_by_airport("SEA").is_empty());
}

#[test]
fn test_flights_in_range_is_inclusive() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(6, 0), at(8, 0), "N1");
    add_flight(&mut schedule, "F2", "LAX", "JFK", at(10, 0), at(12, 0), "N1");
    add_flight(&mut schedule, "F3", "JFK", "LAX", at(14, 0), at(16, 0), "N1");

    let ids = schedule
        .flights_in_range(at(6, 0), at(10, 0))
        .iter()
        .map(|f| f.id().clone())
        .collect::<Vec<_>>();
    assert_eq!(vec![id("F1"), id("F2")], ids);
}

#[test]
fn test_total_flight_time() {
    let mut schedule = schedule(&[("N1", 1000.0), ("N2", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(6, 0), at(8, 0), "N1");
    add_flight(&mut schedule, "F2", "LAX", "JFK", at(10, 0), at(12, 30), "N1");
    add_flight(&mut schedule, "F3", "ORD", "SFO", at(10, 0), at(11, 0), "N2");

    assert_eq!(270, schedule.total_flight_time("N1"));
    assert_eq!(60, schedule.total_flight_time("N2"));
    assert_eq!(0, schedule.total_flight_time("N9"));
}

#[test]
fn test_overworked_aircraft() {
    let config = ScheduleConfig {
        max_daily_flight_time: 8 * 60,
        ..ScheduleConfig::default()
    };
    let mut schedule = schedule_with(&[("N1", 1000.0), ("N2", 1000.0)], config);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(1, 0), at(6, 0), "N1");
    add_flight(&mut schedule, "F2", "LAX", "JFK", at(7, 0), at(11, 0), "N1");
    add_flight(&mut schedule, "F3", "ORD", "SFO", at(1, 0), at(6, 0), "N2");
    // second day, counted separately
    add_flight(&mut schedule, "F4", "SFO", "ORD", at(25, 0), at(29, 0), "N2");

    assert_eq!(vec![id("N1")], schedule.overworked_aircraft());
}

#[test]
fn test_validation_errors_empty_for_sound_schedule() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(6, 0), at(8, 0), "N1");
    assert!(schedule.validation_errors().is_empty());
}

#[test]
fn test_validation_reports_missing_aircraft() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(6, 0), at(8, 0), "N1");
    schedule.fleet().remove("N1");

    assert_eq!(
        vec!["Aircraft N1 is not in the fleet".to_string()],
        schedule.validation_errors()
    );
    assert!(!schedule.is_valid());
}

#[test]
fn test_to_json() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", Time(600), Time(1080), "N1");

    let json: serde_json::Value = serde_json::from_str(&schedule.to_json().unwrap()).unwrap();
    assert_eq!("F1", json["flights"][0]["id"]);
    assert_eq!(600, json["flights"][0]["departure_time"]);
    assert_eq!("Scheduled", json["flights"][0]["status"]);
    assert_eq!("N1", json["aircraft"][0]["id"]);
    assert_eq!(0, json["config"]["turnaround"]);
}
