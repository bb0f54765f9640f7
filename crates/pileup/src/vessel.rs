//! Vessels: massless followers of the ephemeris.

use serde::{Deserialize, Serialize};
use tracing::debug;

use nbody_geometry::{Barycentric, DegreesOfFreedom};
use nbody_numerics::{AdaptiveStepParameters, FlowOutcome};
use nbody_physics::{Ephemeris, MasslessBody, no_intrinsic_acceleration};
use nbody_quantities::Instant;
use nbody_trajectory::{DiscreteTrajectory, ForkId};

/// A vessel: a massless body with an authoritative history, a
/// prolongation fork tracking the present, and optionally a prediction
/// fork extrapolating into the future.
#[derive(Serialize, Deserialize)]
pub struct Vessel {
    name: String,
    body: MasslessBody,
    /// Index of the parent celestial in the ephemeris.
    parent: usize,
    adaptive_step_parameters: AdaptiveStepParameters,
    history: DiscreteTrajectory<Barycentric>,
    prolongation: Option<ForkId>,
    prediction: Option<ForkId>,
}

impl Vessel {
    pub fn new(
        name: impl Into<String>,
        parent: usize,
        adaptive_step_parameters: AdaptiveStepParameters,
    ) -> Self {
        Self {
            name: name.into(),
            body: MasslessBody,
            parent,
            adaptive_step_parameters,
            history: DiscreteTrajectory::new(),
            prolongation: None,
            prediction: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &MasslessBody {
        &self.body
    }

    pub fn parent(&self) -> usize {
        self.parent
    }

    pub fn set_parent(&mut self, parent: usize) {
        self.parent = parent;
    }

    pub fn is_initialized(&self) -> bool {
        self.prolongation.is_some()
    }

    /// Seeds the history at `(t, dof)` and forks the prolongation there.
    pub fn create_history_and_fork_prolongation(
        &mut self,
        t: Instant,
        dof: DegreesOfFreedom<Barycentric>,
    ) {
        assert!(!self.is_initialized(), "the vessel is already initialized");
        self.history.append(ForkId::ROOT, t, dof);
        self.prolongation = Some(self.history.new_fork_at_last(ForkId::ROOT));
    }

    pub fn history(&self) -> &DiscreteTrajectory<Barycentric> {
        assert!(self.is_initialized(), "the vessel is not initialized");
        &self.history
    }

    pub fn prolongation(&self) -> ForkId {
        self.prolongation.expect("the vessel is not initialized")
    }

    /// Advances the prolongation to `t` against the frozen ephemeris.
    pub fn advance_time(
        &mut self,
        t: Instant,
        ephemeris: &Ephemeris<Barycentric>,
    ) -> FlowOutcome {
        let prolongation = self.prolongation();
        let outcome = ephemeris.flow_with_adaptive_step(
            &mut self.history,
            prolongation,
            no_intrinsic_acceleration,
            t,
            &self.adaptive_step_parameters,
        );
        debug!("advanced vessel {} to {t}: {outcome:?}", self.name);
        outcome
    }

    pub fn has_prediction(&self) -> bool {
        self.prediction.is_some()
    }

    pub fn prediction(&self) -> ForkId {
        self.prediction.expect("the vessel has no prediction")
    }

    /// Recomputes the prediction from the present state up to `t`.
    pub fn update_prediction(
        &mut self,
        t: Instant,
        ephemeris: &Ephemeris<Barycentric>,
        parameters: &AdaptiveStepParameters,
    ) -> FlowOutcome {
        self.delete_prediction();
        let prolongation = self.prolongation();
        let prediction = self.history.new_fork_at_last(prolongation);
        self.prediction = Some(prediction);
        ephemeris.flow_with_adaptive_step(
            &mut self.history,
            prediction,
            no_intrinsic_acceleration,
            t,
            parameters,
        )
    }

    pub fn delete_prediction(&mut self) {
        if let Some(prediction) = self.prediction.take() {
            self.history.delete_fork(prediction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbody_geometry::{Position, Velocity};
    use nbody_numerics::{
        AdaptiveStepIntegrator, FixedStepIntegrator, FixedStepParameters, UNLIMITED_MAX_STEPS,
    };
    use nbody_physics::MassiveBody;
    use nbody_quantities::si::*;

    const GM_EARTH: f64 = 3.986004418e14;

    fn ephemeris() -> Ephemeris<Barycentric> {
        Ephemeris::new(
            vec![MassiveBody::new(
                "Earth",
                gravitational_parameter(GM_EARTH),
            )],
            vec![DegreesOfFreedom::origin_at_rest()],
            Instant::J2000,
            metres(1e-3),
            FixedStepParameters::new(
                FixedStepIntegrator::McLachlanAtela1992Order5Optimal,
                seconds(10.0),
            ),
        )
    }

    fn parameters() -> AdaptiveStepParameters {
        AdaptiveStepParameters::new(
            AdaptiveStepIntegrator::DormandElMikkawyPrince1986Rkn434Fm,
            UNLIMITED_MAX_STEPS,
            metres(1.0),
            metres_per_second(1e-3),
        )
    }

    fn orbiting_dof() -> DegreesOfFreedom<Barycentric> {
        DegreesOfFreedom::new(
            Position::new(metres(7.0e6), metres(0.0), metres(0.0)),
            Velocity::new(
                metres_per_second(0.0),
                metres_per_second((GM_EARTH / 7.0e6).sqrt()),
                metres_per_second(0.0),
            ),
        )
    }

    #[test]
    fn initialization_creates_history_and_prolongation() {
        let mut vessel = Vessel::new("Enterprise", 0, parameters());
        assert!(!vessel.is_initialized());
        vessel.create_history_and_fork_prolongation(Instant::J2000, orbiting_dof());
        assert!(vessel.is_initialized());
        let prolongation = vessel.prolongation();
        assert_eq!(
            vessel.history().back(prolongation).unwrap().0,
            Instant::J2000
        );
        assert!(!vessel.has_prediction());
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn uninitialized_vessels_have_no_history() {
        let vessel = Vessel::new("Ghost", 0, parameters());
        vessel.history();
    }

    #[test]
    fn advancing_extends_the_prolongation() {
        let mut ephemeris = ephemeris();
        let t = Instant::J2000 + seconds(100.0);
        ephemeris.prolong(t);
        let mut vessel = Vessel::new("Enterprise", 0, parameters());
        vessel.create_history_and_fork_prolongation(Instant::J2000, orbiting_dof());
        let outcome = vessel.advance_time(t, &ephemeris);
        assert!(outcome.reached_final_time());
        let prolongation = vessel.prolongation();
        assert_eq!(vessel.history().back(prolongation).unwrap().0, t);
        // The authoritative history itself is untouched.
        assert_eq!(vessel.history().back(ForkId::ROOT).unwrap().0, Instant::J2000);
    }

    #[test]
    fn predictions_come_and_go() {
        let mut ephemeris = ephemeris();
        let t1 = Instant::J2000 + seconds(50.0);
        let t2 = Instant::J2000 + seconds(200.0);
        ephemeris.prolong(t2);
        let mut vessel = Vessel::new("Enterprise", 0, parameters());
        vessel.create_history_and_fork_prolongation(Instant::J2000, orbiting_dof());
        vessel.advance_time(t1, &ephemeris);
        let outcome = vessel.update_prediction(t2, &ephemeris, &parameters());
        assert!(outcome.reached_final_time());
        let prediction = vessel.prediction();
        assert_eq!(vessel.history().back(prediction).unwrap().0, t2);
        vessel.delete_prediction();
        assert!(!vessel.has_prediction());
    }

    #[test]
    fn serialization_requires_a_history() {
        let mut vessel = Vessel::new("Enterprise", 0, parameters());
        vessel.create_history_and_fork_prolongation(Instant::J2000, orbiting_dof());
        let json = serde_json::to_string(&vessel).unwrap();
        let read: Vessel = serde_json::from_str(&json).unwrap();
        assert!(read.is_initialized());
        assert_eq!(read.name(), "Enterprise");
        // A message missing its history fails loudly.
        assert!(serde_json::from_str::<Vessel>("{\"name\":\"x\"}").is_err());
    }
}
