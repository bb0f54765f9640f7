//! Continuous trajectories: chains of Chebyshev segments fitted over
//! windows of fixed-step integration samples.

use serde::{Deserialize, Serialize};
use tracing::warn;

use nbody_geometry::{DegreesOfFreedom, Frame, Position, Velocity};
use nbody_numerics::{ChebyshevSeries, MAX_DEGREE};
use nbody_quantities::{Instant, Length};

/// Number of integration steps per fitted segment window.
pub const DIVISIONS: usize = 8;

/// An append-only sequence of touching Chebyshev segments covering an
/// ever-growing time interval.
///
/// The driver appends `(t, dof)` samples at its fixed integration step;
/// once a window of [`DIVISIONS`] steps has accumulated, a segment is
/// fitted against the piecewise-Hermite interpolant of the window (the
/// evaluator the fit error is measured against). The degree doubles until
/// the fit meets the tolerance; if the maximal degree is insufficient the
/// window is halved and fitting restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ContinuousTrajectory<F: Frame> {
    tolerance: Length,
    segments: Vec<ChebyshevSeries<F>>,
    pending: Vec<(Instant, DegreesOfFreedom<F>)>,
}

impl<F: Frame> ContinuousTrajectory<F> {
    pub fn new(tolerance: Length) -> Self {
        assert!(tolerance > Length::ZERO, "the fitting tolerance must be positive");
        Self {
            tolerance,
            segments: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Appends one fixed-step sample, fitting segments as windows fill.
    pub fn append(&mut self, t: Instant, dof: DegreesOfFreedom<F>) {
        if let Some(last) = self.last_time() {
            assert!(
                t > last,
                "non-monotonic append to a continuous trajectory: {t} after {last}"
            );
        }
        self.pending.push((t, dof));
        while self.pending.len() > DIVISIONS {
            self.fit_from_pending();
        }
    }

    /// Beginning of the covered interval, once a segment exists.
    pub fn t_min(&self) -> Option<Instant> {
        self.segments.first().map(|s| s.t_min())
    }

    /// End of the covered interval, once a segment exists.
    pub fn t_max(&self) -> Option<Instant> {
        self.segments.last().map(|s| s.t_max())
    }

    pub fn evaluate_position(&self, t: Instant) -> Position<F> {
        self.segment_containing(t).evaluate_position(t)
    }

    pub fn evaluate_velocity(&self, t: Instant) -> Velocity<F> {
        self.segment_containing(t).evaluate_velocity(t)
    }

    pub fn evaluate_degrees_of_freedom(&self, t: Instant) -> DegreesOfFreedom<F> {
        let segment = self.segment_containing(t);
        DegreesOfFreedom::new(segment.evaluate_position(t), segment.evaluate_velocity(t))
    }

    /// Drops the whole segments that end strictly before `t`.
    pub fn forget_before(&mut self, t: Instant) {
        self.segments.retain(|segment| segment.t_max() >= t);
    }

    fn segment_containing(&self, t: Instant) -> &ChebyshevSeries<F> {
        let (t_min, t_max) = match (self.t_min(), self.t_max()) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => panic!("evaluation of a continuous trajectory with no segments"),
        };
        assert!(
            t >= t_min && t <= t_max,
            "evaluation at {t} outside the covered interval [{t_min}, {t_max}]"
        );
        let index = self.segments.partition_point(|segment| segment.t_max() < t);
        &self.segments[index]
    }

    fn last_time(&self) -> Option<Instant> {
        self.pending
            .last()
            .map(|(t, _)| *t)
            .or_else(|| self.t_max())
    }

    /// Fits one segment from the front of the pending window, halving the
    /// window until the tolerance is met.
    fn fit_from_pending(&mut self) {
        let mut len = DIVISIONS; // number of steps consumed
        let segment = loop {
            let window = &self.pending[..=len];
            let t_min = window[0].0;
            let t_max = window[len].0;
            let evaluator = |t: Instant| hermite_evaluate(window, t);
            match ChebyshevSeries::fit_to_tolerance(&evaluator, t_min, t_max, self.tolerance) {
                Some(segment) => break segment,
                None if len > 1 => len /= 2,
                None => {
                    // A single-step window is a cubic, which the maximal
                    // degree represents almost exactly; meeting this arm
                    // means the tolerance is below rounding level.
                    let segment = ChebyshevSeries::fit(&evaluator, MAX_DEGREE, t_min, t_max);
                    warn!(
                        "accepting a segment over [{t_min}, {t_max}] with error {} above the \
                         tolerance {}",
                        segment.error_estimate(&evaluator),
                        self.tolerance
                    );
                    break segment;
                }
            }
        };
        self.segments.push(segment);
        // The window boundary starts the next one.
        self.pending.drain(..len);
    }
}

/// Cubic Hermite interpolation of the window samples: the positions and
/// velocities at consecutive samples define one cubic per step.
fn hermite_evaluate<F: Frame>(
    samples: &[(Instant, DegreesOfFreedom<F>)],
    t: Instant,
) -> Position<F> {
    let last = samples.len() - 1;
    let index = samples
        .partition_point(|(s, _)| *s <= t)
        .clamp(1, last)
        - 1;
    let (t0, d0) = samples[index];
    let (t1, d1) = samples[index + 1];
    let dt = t1 - t0;
    let s = (t - t0) / dt;
    let h00 = (1.0 + 2.0 * s) * (1.0 - s) * (1.0 - s);
    let h10 = s * (1.0 - s) * (1.0 - s);
    let h01 = s * s * (3.0 - 2.0 * s);
    let h11 = s * s * (s - 1.0);
    let p0 = d0.position.displacement_from_origin();
    let p1 = d1.position.displacement_from_origin();
    let m0 = d0.velocity * dt;
    let m1 = d1.velocity * dt;
    Position::origin() + p0 * h00 + m0 * h10 + p1 * h01 + m1 * h11
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbody_geometry::Barycentric;
    use nbody_quantities::si::*;
    use nbody_quantities::{Quantity, Time};

    /// A gentle circular motion, smooth at every derivative.
    fn circle(t: Instant) -> DegreesOfFreedom<Barycentric> {
        let omega = 2.0 * std::f64::consts::PI / 10_000.0;
        let phase = omega * t.since_j2000().si();
        let r = 1.0e6;
        DegreesOfFreedom::new(
            Position::new(metres(r * phase.cos()), metres(r * phase.sin()), metres(0.0)),
            Velocity::new(
                metres_per_second(-r * omega * phase.sin()),
                metres_per_second(r * omega * phase.cos()),
                metres_per_second(0.0),
            ),
        )
    }

    fn filled(step: Time, count: usize, tolerance: Length) -> ContinuousTrajectory<Barycentric> {
        let mut trajectory = ContinuousTrajectory::new(tolerance);
        for i in 0..count {
            let t = Instant::J2000 + step * i as f64;
            trajectory.append(t, circle(t));
        }
        trajectory
    }

    #[test]
    fn segments_cover_the_sampled_interval() {
        let trajectory = filled(seconds(10.0), 2 * DIVISIONS + 1, metres(1e-3));
        assert_eq!(trajectory.t_min(), Some(Instant::J2000));
        assert_eq!(
            trajectory.t_max(),
            Some(Instant::J2000 + seconds(10.0 * (2 * DIVISIONS) as f64))
        );
    }

    #[test]
    fn evaluation_stays_within_a_small_multiple_of_the_tolerance() {
        let tolerance = metres(1e-3);
        let trajectory = filled(seconds(10.0), 4 * DIVISIONS + 1, tolerance);
        let t_max = trajectory.t_max().unwrap();
        let mut t = trajectory.t_min().unwrap();
        let mut worst = Length::ZERO;
        while t <= t_max {
            let error = (trajectory.evaluate_position(t) - circle(t).position).norm();
            worst = worst.max(error);
            t = t + seconds(1.0);
        }
        // Documented bound: 4 × the fitting tolerance against the true
        // function (the fit is checked against the window interpolant).
        assert!(worst <= tolerance * 4.0, "worst error {worst}");
    }

    #[test]
    fn velocities_differentiate_positions() {
        let trajectory = filled(seconds(10.0), DIVISIONS + 1, metres(1e-4));
        let t = Instant::J2000 + seconds(40.0);
        let v = trajectory.evaluate_velocity(t);
        let expected = circle(t).velocity;
        assert!((v - expected).norm() < metres_per_second(1e-3));
    }

    #[test]
    fn forget_before_drops_whole_segments() {
        let mut trajectory = filled(seconds(10.0), 3 * DIVISIONS + 1, metres(1e-3));
        let boundary = Instant::J2000 + seconds(10.0 * DIVISIONS as f64);
        trajectory.forget_before(boundary + seconds(1.0));
        assert_eq!(
            trajectory.t_min(),
            Some(boundary)
        );
    }

    #[test]
    #[should_panic(expected = "outside the covered interval")]
    fn evaluation_outside_the_covered_interval_is_fatal() {
        let trajectory = filled(seconds(10.0), DIVISIONS + 1, metres(1e-3));
        trajectory.evaluate_position(Instant::J2000 + seconds(1e6));
    }

    #[test]
    #[should_panic(expected = "non-monotonic append")]
    fn non_monotonic_appends_are_fatal() {
        let mut trajectory = ContinuousTrajectory::<Barycentric>::new(metres(1e-3));
        trajectory.append(Instant::J2000, circle(Instant::J2000));
        trajectory.append(Instant::J2000, circle(Instant::J2000));
    }

    #[test]
    fn serialization_round_trips() {
        let trajectory = filled(seconds(10.0), DIVISIONS + 1, metres(1e-3));
        let json = serde_json::to_string(&trajectory).unwrap();
        let read: ContinuousTrajectory<Barycentric> = serde_json::from_str(&json).unwrap();
        assert_eq!(read, trajectory);
        let t = Instant::J2000 + seconds(35.0);
        assert_eq!(read.evaluate_position(t), trajectory.evaluate_position(t));
    }
}
