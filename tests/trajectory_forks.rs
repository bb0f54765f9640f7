use nbody_core::geometry::{Barycentric, DegreesOfFreedom, Position, Velocity};
use nbody_core::quantities::si::*;
use nbody_core::quantities::{Instant, Quantity};
use nbody_core::trajectory::{DiscreteTrajectory, ForkId};

fn at(t: f64) -> Instant {
    Instant::J2000 + seconds(t)
}

fn dof(x: f64) -> DegreesOfFreedom<Barycentric> {
    DegreesOfFreedom::new(
        Position::new(metres(x), metres(0.0), metres(0.0)),
        Velocity::zero(),
    )
}

fn seed() -> (DiscreteTrajectory<Barycentric>, ForkId) {
    let mut trajectory = DiscreteTrajectory::new();
    for t in [0.0, 1.0, 2.0, 3.0] {
        trajectory.append(ForkId::ROOT, at(t), dof(t));
    }
    let fork = trajectory.new_fork_at(ForkId::ROOT, at(2.0));
    trajectory.append(fork, at(2.5), dof(2.5));
    trajectory.append(fork, at(3.5), dof(3.5));
    (trajectory, fork)
}

fn times(trajectory: &DiscreteTrajectory<Barycentric>, id: ForkId) -> Vec<f64> {
    trajectory
        .iter(id)
        .map(|(t, _)| (*t - Instant::J2000).si())
        .collect()
}

#[test]
fn the_fork_and_the_parent_interleave_independently() {
    let (trajectory, fork) = seed();
    assert_eq!(times(&trajectory, fork), vec![0.0, 1.0, 2.0, 2.5, 3.5]);
    assert_eq!(times(&trajectory, ForkId::ROOT), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn forgetting_before_the_fork_point_is_allowed() {
    // The fork is anchored at t = 2; trimming strictly-before times up to
    // 1.5 leaves the anchor in place.
    let (mut trajectory, fork) = seed();
    trajectory.forget_before(ForkId::ROOT, at(1.5));
    assert_eq!(times(&trajectory, ForkId::ROOT), vec![2.0, 3.0]);
    assert_eq!(times(&trajectory, fork), vec![2.0, 2.5, 3.5]);
}

#[test]
#[should_panic(expected = "would orphan a fork")]
fn forgetting_through_the_fork_point_is_fatal() {
    let (mut trajectory, _fork) = seed();
    trajectory.forget_before(ForkId::ROOT, at(2.5));
}

#[test]
fn deleting_the_fork_leaves_the_parent_untouched() {
    let (mut trajectory, fork) = seed();
    trajectory.delete_fork(fork);
    assert_eq!(times(&trajectory, ForkId::ROOT), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn appends_to_the_parent_do_not_leak_into_the_fork() {
    let (mut trajectory, fork) = seed();
    trajectory.append(ForkId::ROOT, at(4.0), dof(4.0));
    assert_eq!(times(&trajectory, fork), vec![0.0, 1.0, 2.0, 2.5, 3.5]);
}
