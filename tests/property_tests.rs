//! Property-based tests for the transition protocol.
//!
//! These tests use proptest to verify properties hold across many
//! randomly generated declarations, attachment orders and traces.

use chrono::Utc;
use proptest::prelude::*;
use segue::builder::{BuildError, TransitionBuilder};
use segue::core::{FiredTransition, MachineHandle, Placement, TransitionTrace};
use segue::driver::{Machine, StateConfig};

prop_compose! {
    fn distinct_endpoints()(from in 0..64u32, offset in 1..63u32) -> (u32, u32) {
        (from, (from + offset) % 64)
    }
}

proptest! {
    #[test]
    fn declaration_reads_back_exactly(
        (from, to) in distinct_endpoints(),
        force in any::<bool>(),
        reentry in any::<bool>(),
    ) {
        let mut builder = TransitionBuilder::new().from(from).to(to);
        if force {
            builder = builder.force_instantly();
        }
        if reentry {
            builder = builder.allow_reentry();
        }
        let t = builder.build().unwrap();

        prop_assert_eq!(t.from(), &from);
        prop_assert_eq!(t.to(), &to);
        prop_assert_eq!(t.force_instantly(), force);
        prop_assert_eq!(t.allow_reentry(), reentry);
    }

    #[test]
    fn self_edge_requires_reentry(state in 0..64u32, force in any::<bool>()) {
        let mut builder = TransitionBuilder::new().from(state).to(state);
        if force {
            builder = builder.force_instantly();
        }
        prop_assert_eq!(
            builder.build().unwrap_err(),
            BuildError::SelfTransitionWithoutReentry
        );

        let allowed = TransitionBuilder::new()
            .from(state)
            .to(state)
            .allow_reentry()
            .build();
        prop_assert!(allowed.is_ok());
    }

    #[test]
    fn lateral_bind_never_classifies_as_exit((from, to) in distinct_endpoints()) {
        let handle = MachineHandle::next();
        let bound = TransitionBuilder::new()
            .from(from)
            .to(to)
            .build()
            .unwrap()
            .bind(handle, Placement::Lateral);

        prop_assert!(!bound.is_exit_transition());
        prop_assert_eq!(bound.machine(), handle);
    }

    #[test]
    fn reentry_guard_matches_its_definition(
        (active, to) in distinct_endpoints(),
        reentry in any::<bool>(),
    ) {
        let mut builder = TransitionBuilder::new().from(63 - to).to(to);
        if reentry {
            builder = builder.allow_reentry();
        }
        let bound = builder
            .build()
            .unwrap()
            .bind(MachineHandle::next(), Placement::Lateral);

        // Blocked exactly when the destination is the active state and
        // reentry was not allowed.
        prop_assert_eq!(bound.reentry_blocked(&to), !reentry);
        prop_assert!(!bound.reentry_blocked(&active));
    }

    #[test]
    fn first_declared_transition_wins_the_tick(
        targets in prop::collection::vec(1..50u32, 1..6),
    ) {
        let mut machine = Machine::new();
        machine.add_state(0u32, StateConfig::new()).unwrap();
        let mut seen = std::collections::HashSet::new();
        for &target in &targets {
            if seen.insert(target) {
                machine.add_state(target, StateConfig::new()).unwrap();
            }
            machine
                .add_transition(
                    TransitionBuilder::new().from(0).to(target).build().unwrap(),
                )
                .unwrap();
        }

        machine.start(0).unwrap();
        machine.tick().unwrap();
        prop_assert_eq!(machine.active_state(), Some(&targets[0]));
    }

    #[test]
    fn trace_preserves_firing_order(
        hops in prop::collection::vec(0..16u32, 1..10),
    ) {
        let mut trace = TransitionTrace::new();
        let mut expected_path = vec![99u32];
        let mut from = 99u32;
        for &to in &hops {
            trace = trace.record(FiredTransition {
                from,
                to,
                timestamp: Utc::now(),
                forced: false,
            });
            expected_path.push(to);
            from = to;
        }

        let path: Vec<u32> = trace.path().into_iter().copied().collect();
        prop_assert_eq!(path, expected_path);
    }

    #[test]
    fn trace_record_is_pure((from, to) in distinct_endpoints()) {
        let trace = TransitionTrace::new();
        let recorded = trace.record(FiredTransition {
            from,
            to,
            timestamp: Utc::now(),
            forced: false,
        });

        prop_assert_eq!(trace.fired().len(), 0);
        prop_assert_eq!(recorded.fired().len(), 1);
    }

    #[test]
    fn trace_roundtrips_through_json(
        hops in prop::collection::vec(0..16u32, 0..6),
        forced in any::<bool>(),
    ) {
        let mut trace = TransitionTrace::new();
        let mut from = 0u32;
        for &to in &hops {
            trace = trace.record(FiredTransition {
                from,
                to,
                timestamp: Utc::now(),
                forced,
            });
            from = to;
        }

        let json = serde_json::to_string(&trace).unwrap();
        let back: TransitionTrace<u32> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(back.fired().len(), trace.fired().len());
        prop_assert_eq!(back.path(), trace.path());
    }
}
