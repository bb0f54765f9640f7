//! Massive, oblate and massless bodies.

use serde::{Deserialize, Serialize};

use nbody_geometry::{Frame, Vector};
use nbody_quantities::{GravitationalParameter, Length};

/// The non-spherical part of a body's gravity model: the J₂ zonal
/// harmonic about the given (unit) rotation axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Oblateness<F: Frame> {
    pub j2: f64,
    pub reference_radius: Length,
    pub axis: Vector<f64, F>,
}

/// A body with a gravitational parameter, optionally oblate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MassiveBody<F: Frame> {
    name: String,
    gravitational_parameter: GravitationalParameter,
    oblateness: Option<Oblateness<F>>,
}

impl<F: Frame> MassiveBody<F> {
    pub fn new(name: impl Into<String>, gravitational_parameter: GravitationalParameter) -> Self {
        assert!(
            gravitational_parameter > GravitationalParameter::ZERO,
            "massive bodies need a positive gravitational parameter"
        );
        Self {
            name: name.into(),
            gravitational_parameter,
            oblateness: None,
        }
    }

    pub fn oblate(
        name: impl Into<String>,
        gravitational_parameter: GravitationalParameter,
        j2: f64,
        reference_radius: Length,
        axis: Vector<f64, F>,
    ) -> Self {
        assert!(j2 > 0.0, "an oblate body needs a positive J2");
        assert!(
            reference_radius > Length::ZERO,
            "an oblate body needs a positive reference radius"
        );
        let norm = axis.norm();
        assert!(norm > 0.0, "the rotation axis must be nonzero");
        let mut body = Self::new(name, gravitational_parameter);
        body.oblateness = Some(Oblateness {
            j2,
            reference_radius,
            axis: axis / norm,
        });
        body
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gravitational_parameter(&self) -> GravitationalParameter {
        self.gravitational_parameter
    }

    pub fn oblateness(&self) -> Option<&Oblateness<F>> {
        self.oblateness.as_ref()
    }

    pub fn is_oblate(&self) -> bool {
        self.oblateness.is_some()
    }
}

/// The type tag for bodies without gravitational influence (vessels).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasslessBody;
