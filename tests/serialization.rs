use nbody_core::geometry::{Barycentric, DegreesOfFreedom, InertiaTensor, Position, RigidMotion, Velocity};
use nbody_core::physics::{Ephemeris, MassiveBody};
use nbody_core::pileup::{
    Part, PileUp, PileUpMessage, default_history_parameters, default_psychohistory_parameters,
};
use nbody_core::quantities::si::*;
use nbody_core::quantities::{Instant, Length, Quantity, Time};
use nbody_core::trajectory::{DiscreteTrajectory, ForkId};

fn round_trip<T>(value: &T) -> T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    serde_json::from_str(&serde_json::to_string(value).unwrap()).unwrap()
}

#[test]
fn quantities_round_trip_bit_for_bit() {
    let length: Length = metres(0.1 + 0.2);
    assert_eq!(round_trip(&length).si().to_bits(), length.si().to_bits());
    let time: Time = seconds(std::f64::consts::PI * 1.0e7);
    assert_eq!(round_trip(&time), time);
    let t = Instant::J2000 + seconds(1.0e9 + 1.0e-7);
    assert_eq!(round_trip(&t), t);
}

#[test]
fn trajectories_round_trip_with_their_forks() {
    let mut trajectory = DiscreteTrajectory::<Barycentric>::new();
    for i in 0..5 {
        trajectory.append(
            ForkId::ROOT,
            Instant::J2000 + seconds(i as f64),
            DegreesOfFreedom::new(
                Position::new(metres(i as f64), metres(0.0), metres(0.0)),
                Velocity::zero(),
            ),
        );
    }
    let fork = trajectory.new_fork_at_last(ForkId::ROOT);
    trajectory.append(
        fork,
        Instant::J2000 + seconds(10.0),
        DegreesOfFreedom::origin_at_rest(),
    );
    let read = round_trip(&trajectory);
    assert_eq!(read, trajectory);
    assert_eq!(read.size(fork), trajectory.size(fork));
}

#[test]
fn ephemerides_round_trip_with_identical_queries() {
    let mut ephemeris = Ephemeris::<Barycentric>::new(
        vec![MassiveBody::new(
            "Earth",
            gravitational_parameter(3.986004418e14),
        )],
        vec![DegreesOfFreedom::origin_at_rest()],
        Instant::J2000,
        metres(1.0e-3),
        default_history_parameters(),
    );
    ephemeris.prolong(Instant::J2000 + seconds(500.0));
    let read: Ephemeris<Barycentric> = round_trip(&ephemeris);
    assert_eq!(read, ephemeris);
    assert_eq!(read.t_max(), ephemeris.t_max());
    let t = Instant::J2000 + seconds(250.0);
    assert_eq!(
        read.trajectory(0).evaluate_position(t),
        ephemeris.trajectory(0).evaluate_position(t)
    );
}

#[test]
fn pile_up_messages_round_trip() {
    let parts = vec![
        Part::new(
            7,
            "pod",
            kilograms(2.0),
            InertiaTensor::from_diagonal(
                kilogram_square_metres(1.0),
                kilogram_square_metres(1.0),
                kilogram_square_metres(1.0),
            ),
            RigidMotion::non_rotating_from_target(DegreesOfFreedom::new(
                Position::new(metres(10.0), metres(0.0), metres(0.0)),
                Velocity::new(
                    metres_per_second(1.0),
                    metres_per_second(0.0),
                    metres_per_second(0.0),
                ),
            )),
        ),
    ];
    let pile_up = PileUp::new(
        parts,
        Instant::J2000,
        default_psychohistory_parameters(),
        default_history_parameters(),
        true,
        None,
    );
    let message = pile_up.write_to_message();
    let reread: PileUpMessage = round_trip(&message);
    assert_eq!(reread, message);
    let rebuilt = PileUp::read_from_message(reread, |id| pile_up.part(id).cloned(), None).unwrap();
    assert_eq!(rebuilt.write_to_message(), message);
    assert_eq!(rebuilt.angular_momentum(), pile_up.angular_momentum());
}

#[test]
fn deletion_callbacks_fire_on_drop() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let fired = Arc::new(AtomicBool::new(false));
    let observed = fired.clone();
    let pile_up = PileUp::new(
        vec![Part::new(
            1,
            "pod",
            kilograms(1.0),
            InertiaTensor::from_diagonal(
                kilogram_square_metres(1.0),
                kilogram_square_metres(1.0),
                kilogram_square_metres(1.0),
            ),
            RigidMotion::non_rotating_from_target(DegreesOfFreedom::origin_at_rest()),
        )],
        Instant::J2000,
        default_psychohistory_parameters(),
        default_history_parameters(),
        false,
        Some(Box::new(move || {
            fired.store(true, Ordering::SeqCst);
        })),
    );
    drop(pile_up);
    assert!(observed.load(Ordering::SeqCst));
}
