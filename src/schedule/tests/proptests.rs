use crate::error::Error;
use crate::flight::Flight;
use crate::schedule::tests::utils::{arb_leg, schedule};
use crate::time::Time;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_no_overlap_invariant(
        legs in prop::collection::vec(arb_leg(), 1..40)
    ) {
        let mut schedule = schedule(&[("AC_1", 1000.0), ("AC_2", 1000.0), ("AC_3", 1000.0)]);

        for (n, (ac_id, dep, dur)) in legs.into_iter().enumerate() {
            let flight = Flight::new(
                &format!("FL_{}", n),
                "AP_1",
                "AP_2",
                Time(dep),
                Time(dep + dur),
                &ac_id,
            ).unwrap();
            let before = schedule.len();
            let conflicting = schedule
                .flights()
                .iter()
                .any(|existing| existing.conflicts_with(&flight));

            match schedule.add_flight(flight) {
                Ok(()) => prop_assert!(!conflicting),
                Err(Error::SchedulingConflict { .. }) => {
                    prop_assert!(conflicting);
                    prop_assert_eq!(before, schedule.len());
                }
                Err(e) => prop_assert!(false, "unexpected error {}", e),
            }
        }

        for ac_id in schedule.fleet().ids() {
            let assigned = schedule.flights_by_aircraft(&ac_id);
            for pair in assigned.windows(2) {
                prop_assert!(
                    pair[0].arrival_time() <= pair[1].departure_time(),
                    "\nOverlap on {}:\nFlight {} (ends {}) vs Flight {} (starts {})",
                    ac_id, pair[0].id(), pair[0].arrival_time(), pair[1].id(), pair[1].departure_time()
                );
            }
        }
        prop_assert!(schedule.is_valid());
    }
}
