//! Property tests for discrete trajectories.

use proptest::prelude::*;

use crate::{DiscreteTrajectory, ForkId};
use nbody_geometry::{Barycentric, DegreesOfFreedom, Position, Velocity};
use nbody_quantities::Instant;
use nbody_quantities::si::*;

fn dof(x: f64) -> DegreesOfFreedom<Barycentric> {
    DegreesOfFreedom::new(
        Position::new(metres(x), metres(0.0), metres(0.0)),
        Velocity::zero(),
    )
}

proptest! {
    #[test]
    fn iteration_is_strictly_time_ordered(increments in prop::collection::vec(1.0e-3..1.0e3f64, 1..50)) {
        let mut trajectory = DiscreteTrajectory::new();
        let mut t = Instant::J2000;
        for dt in increments {
            t = t + seconds(dt);
            trajectory.append(ForkId::ROOT, t, dof(dt));
        }
        let times: Vec<Instant> = trajectory.iter(ForkId::ROOT).map(|(t, _)| *t).collect();
        prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn a_fork_extends_the_prefix_it_was_cut_at(
        increments in prop::collection::vec(0.5..10.0f64, 2..30),
        fork_at in 0usize..29,
    ) {
        let mut trajectory = DiscreteTrajectory::new();
        let mut t = Instant::J2000;
        let mut times = Vec::new();
        for dt in &increments {
            t = t + seconds(*dt);
            times.push(t);
            trajectory.append(ForkId::ROOT, t, dof(*dt));
        }
        let fork_index = fork_at.min(times.len() - 1);
        let fork = trajectory.new_fork_with_copy(ForkId::ROOT, times[fork_index]);
        // Before the fork point both views agree; the fork-point sample
        // itself is shared.
        let parent: Vec<Instant> = trajectory.iter(ForkId::ROOT).map(|(t, _)| *t).collect();
        let child: Vec<Instant> = trajectory.iter(fork).map(|(t, _)| *t).collect();
        prop_assert_eq!(&parent[..], &child[..]);
        prop_assert!(child.contains(&times[fork_index]));
        // Appending to the parent past the fork point leaves the fork
        // untouched.
        let far = *times.last().unwrap() + seconds(1.0e6);
        trajectory.append(ForkId::ROOT, far, dof(0.0));
        let child_after: Vec<Instant> = trajectory.iter(fork).map(|(t, _)| *t).collect();
        prop_assert_eq!(child, child_after);
    }
}
