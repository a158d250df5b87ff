use crate::error::Error;
use crate::schedule::tests::utils::{add_flight, at, cargo, schedule};

#[test]
fn test_cargo_loaded_through_schedule() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(10, 0), at(18, 0), "N1");

    schedule.add_cargo("F1", cargo("C1", 500.0, "JFK", "LAX")).unwrap();
    schedule.add_cargo("F1", cargo("C2", 500.0, "JFK", "LAX")).unwrap();

    let aircraft = schedule.fleet().get("N1").unwrap();
    assert_eq!(1000.0, aircraft.lock().current_load());
    assert!(aircraft.lock().can_carry(0.0));
    assert!(!aircraft.lock().can_carry(0.1));
    assert_eq!(2, schedule.find_flight("F1").unwrap().cargo_count());
}

#[test]
fn test_capacity_shared_across_flights_of_one_aircraft() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(10, 0), at(18, 0), "N1");
    add_flight(&mut schedule, "F2", "LAX", "JFK", at(19, 0), at(23, 0), "N1");

    schedule.add_cargo("F1", cargo("C1", 800.0, "JFK", "LAX")).unwrap();
    let result = schedule.add_cargo("F2", cargo("C2", 300.0, "LAX", "JFK"));

    assert!(matches!(result, Err(Error::CapacityExceeded { .. })));
    assert_eq!(0, schedule.find_flight("F2").unwrap().cargo_count());
}

#[test]
fn test_remove_cargo_through_schedule() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(10, 0), at(18, 0), "N1");
    schedule.add_cargo("F1", cargo("C1", 500.0, "JFK", "LAX")).unwrap();

    let removed = schedule.remove_cargo("F1", "C1").unwrap();
    assert_eq!(500.0, removed.mass());
    assert_eq!(0.0, schedule.fleet().get("N1").unwrap().lock().current_load());
    assert!(matches!(schedule.remove_cargo("F1", "C1"), Err(Error::NotFound(_))));
    assert!(matches!(
        schedule.add_cargo("F9", cargo("C1", 1.0, "JFK", "LAX")),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_overdue_cargo() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(10, 0), at(18, 0), "N1");
    schedule
        .add_cargo("F1", cargo("C1", 10.0, "JFK", "LAX").with_deadline(at(12, 0)))
        .unwrap();
    schedule.add_cargo("F1", cargo("C2", 10.0, "JFK", "LAX")).unwrap();

    assert!(schedule.overdue_cargo(at(11, 0)).is_empty());
    let overdue = schedule.overdue_cargo(at(13, 0));
    assert_eq!(1, overdue.len());
    assert_eq!("C1", &**overdue[0].1.number());

    schedule.complete_flight("F1").unwrap();
    assert!(schedule.overdue_cargo(at(13, 0)).is_empty());
}

#[test]
fn test_manifest_stays_within_capacity_after_sibling_completes() {
    let mut schedule = schedule(&[("N1", 1000.0)]);
    add_flight(&mut schedule, "F1", "JFK", "LAX", at(10, 0), at(18, 0), "N1");
    add_flight(&mut schedule, "F3", "LAX", "JFK", at(18, 0), at(23, 0), "N1");
    schedule.add_cargo("F3", cargo("C1", 600.0, "LAX", "JFK")).unwrap();

    schedule.complete_flight("F1").unwrap();
    assert_eq!(0.0, schedule.fleet().get("N1").unwrap().lock().current_load());

    let result = schedule.add_cargo("F3", cargo("C2", 600.0, "LAX", "JFK"));
    assert!(matches!(
        result,
        Err(Error::CapacityExceeded { requested, available, .. }) if requested == 600.0 && available == 400.0
    ));
    assert_eq!(600.0, schedule.find_flight("F3").unwrap().manifest_mass());
    assert!(schedule.is_valid());

    schedule.add_cargo("F3", cargo("C2", 400.0, "LAX", "JFK")).unwrap();
    assert_eq!(1000.0, schedule.find_flight("F3").unwrap().manifest_mass());
}
