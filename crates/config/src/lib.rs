//! Configuration models and loaders for the N-body core.
//!
//! A system file enumerates bodies with their gravity models and either a
//! Cartesian initial state or Keplerian elements about a named parent, in
//! YAML or TOML.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

mod stabilize;

pub use stabilize::stabilize_jool_system;

use nbody_geometry::{DegreesOfFreedom, Icrs, Position, Vector, Velocity};
use nbody_numerics::FixedStepParameters;
use nbody_physics::{
    Ephemeris, KeplerianElements, MassiveBody, elements_to_relative_degrees_of_freedom,
};
use nbody_quantities::si::{
    degrees, gravitational_parameter, metres, metres_per_second, radians, radians_per_second,
    seconds,
};
use nbody_quantities::{Instant, Length};

/// A whole system: an epoch and its bodies.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    pub name: String,
    pub epoch_j2000_s: f64,
    pub bodies: Vec<BodyConfig>,
}

/// One body record. Exactly one of `initial_state` and `elements` must be
/// present.
#[derive(Debug, Deserialize, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub mu_m3_s2: f64,
    #[serde(default)]
    pub j2: Option<f64>,
    #[serde(default)]
    pub reference_radius_m: Option<f64>,
    #[serde(default)]
    pub axis_right_ascension_deg: Option<f64>,
    #[serde(default)]
    pub axis_declination_deg: Option<f64>,
    #[serde(default)]
    pub initial_state: Option<CartesianConfig>,
    #[serde(default)]
    pub elements: Option<ElementsConfig>,
}

/// A Cartesian initial state in the system frame.
#[derive(Debug, Deserialize, Clone)]
pub struct CartesianConfig {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
    pub vx_m_s: f64,
    pub vy_m_s: f64,
    pub vz_m_s: f64,
}

/// Keplerian elements about a parent body. Exactly one of
/// `semimajor_axis_m`, `period_s` and `mean_motion_rad_s` must be present.
#[derive(Debug, Deserialize, Clone)]
pub struct ElementsConfig {
    pub parent: String,
    #[serde(default)]
    pub semimajor_axis_m: Option<f64>,
    #[serde(default)]
    pub period_s: Option<f64>,
    #[serde(default)]
    pub mean_motion_rad_s: Option<f64>,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub longitude_of_ascending_node_deg: f64,
    pub argument_of_periapsis_deg: f64,
    pub mean_anomaly_rad: f64,
}

/// Errors that can occur while loading or resolving a system.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read the system file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("body `{name}` is not part of the system")]
    UnknownBody { name: String },
    #[error("body `{body}` orbits the unknown parent `{parent}`")]
    UnknownParent { body: String, parent: String },
    #[error("body `{name}` needs exactly one of a Cartesian state and Keplerian elements")]
    AmbiguousState { name: String },
    #[error("body `{name}` needs exactly one of semimajor axis, period and mean motion")]
    AmbiguousElements { name: String },
    #[error("bodies {names:?} cannot be resolved against their parents")]
    UnresolvedBodies { names: Vec<String> },
}

/// Load a system description from a YAML or TOML file.
pub fn load_system<P: AsRef<Path>>(path: P) -> Result<SystemConfig, ConfigError> {
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// A parsed system with its Keplerian records completed against their
/// parents, ready to build an [`Ephemeris`].
#[derive(Debug, Clone)]
pub struct SolarSystem {
    config: SystemConfig,
    elements: BTreeMap<String, KeplerianElements>,
}

impl SolarSystem {
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        let mut elements = BTreeMap::new();
        for body in &config.bodies {
            match (&body.initial_state, &body.elements) {
                (Some(_), None) => {}
                (None, Some(records)) => {
                    let given = usize::from(records.semimajor_axis_m.is_some())
                        + usize::from(records.period_s.is_some())
                        + usize::from(records.mean_motion_rad_s.is_some());
                    if given != 1 {
                        return Err(ConfigError::AmbiguousElements {
                            name: body.name.clone(),
                        });
                    }
                    let parent = config
                        .bodies
                        .iter()
                        .find(|candidate| candidate.name == records.parent)
                        .ok_or_else(|| ConfigError::UnknownParent {
                            body: body.name.clone(),
                            parent: records.parent.clone(),
                        })?;
                    let mut completed = KeplerianElements {
                        eccentricity: records.eccentricity,
                        semimajor_axis: records.semimajor_axis_m.map(metres),
                        period: records.period_s.map(seconds),
                        mean_motion: records.mean_motion_rad_s.map(radians_per_second),
                        inclination: degrees(records.inclination_deg),
                        longitude_of_ascending_node: degrees(
                            records.longitude_of_ascending_node_deg,
                        ),
                        argument_of_periapsis: degrees(records.argument_of_periapsis_deg),
                        mean_anomaly: radians(records.mean_anomaly_rad),
                    };
                    completed.complete(gravitational_parameter(parent.mu_m3_s2));
                    elements.insert(body.name.clone(), completed);
                }
                _ => {
                    return Err(ConfigError::AmbiguousState {
                        name: body.name.clone(),
                    });
                }
            }
        }
        Ok(Self { config, elements })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn epoch(&self) -> Instant {
        Instant::J2000 + seconds(self.config.epoch_j2000_s)
    }

    pub fn body_names(&self) -> impl Iterator<Item = &str> {
        self.config.bodies.iter().map(|body| body.name.as_str())
    }

    pub fn gravitational_parameter(&self, name: &str) -> Result<f64, ConfigError> {
        self.config
            .bodies
            .iter()
            .find(|body| body.name == name)
            .map(|body| body.mu_m3_s2)
            .ok_or_else(|| ConfigError::UnknownBody {
                name: name.to_string(),
            })
    }

    /// The completed elements of a Keplerian body.
    pub fn keplerian_elements(&self, name: &str) -> Result<&KeplerianElements, ConfigError> {
        self.elements
            .get(name)
            .ok_or_else(|| ConfigError::UnknownBody {
                name: name.to_string(),
            })
    }

    pub(crate) fn parent_name(&self, name: &str) -> Result<&str, ConfigError> {
        self.config
            .bodies
            .iter()
            .find(|body| body.name == name)
            .and_then(|body| body.elements.as_ref())
            .map(|elements| elements.parent.as_str())
            .ok_or_else(|| ConfigError::UnknownBody {
                name: name.to_string(),
            })
    }

    /// Replaces the completed elements of a Keplerian body.
    pub fn replace_elements(
        &mut self,
        name: &str,
        elements: KeplerianElements,
    ) -> Result<(), ConfigError> {
        if !self.elements.contains_key(name) {
            return Err(ConfigError::UnknownBody {
                name: name.to_string(),
            });
        }
        self.elements.insert(name.to_string(), elements);
        Ok(())
    }

    /// Resolves every body to barycentric-frame degrees of freedom at the
    /// epoch and builds the ephemeris.
    pub fn make_ephemeris(
        &self,
        fitting_tolerance: Length,
        parameters: FixedStepParameters,
    ) -> Result<Ephemeris<Icrs>, ConfigError> {
        let mut states: BTreeMap<&str, DegreesOfFreedom<Icrs>> = BTreeMap::new();
        for body in &self.config.bodies {
            if let Some(state) = &body.initial_state {
                states.insert(
                    body.name.as_str(),
                    DegreesOfFreedom::new(
                        Position::new(metres(state.x_m), metres(state.y_m), metres(state.z_m)),
                        Velocity::new(
                            metres_per_second(state.vx_m_s),
                            metres_per_second(state.vy_m_s),
                            metres_per_second(state.vz_m_s),
                        ),
                    ),
                );
            }
        }
        // Keplerian bodies resolve once their parent has a state; nested
        // moons may need several passes.
        loop {
            let mut progressed = false;
            for body in &self.config.bodies {
                if states.contains_key(body.name.as_str()) {
                    continue;
                }
                let records = body.elements.as_ref().expect("validated at construction");
                let Some(parent_state) = states.get(records.parent.as_str()).copied() else {
                    continue;
                };
                let elements = &self.elements[&body.name];
                let (displacement, velocity) =
                    elements_to_relative_degrees_of_freedom::<Icrs>(elements);
                states.insert(
                    body.name.as_str(),
                    DegreesOfFreedom::new(
                        parent_state.position + displacement,
                        parent_state.velocity + velocity,
                    ),
                );
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
        let unresolved: Vec<String> = self
            .config
            .bodies
            .iter()
            .filter(|body| !states.contains_key(body.name.as_str()))
            .map(|body| body.name.clone())
            .collect();
        if !unresolved.is_empty() {
            return Err(ConfigError::UnresolvedBodies { names: unresolved });
        }

        let mut bodies = Vec::with_capacity(self.config.bodies.len());
        let mut initial_states = Vec::with_capacity(self.config.bodies.len());
        for body in &self.config.bodies {
            bodies.push(match (body.j2, body.reference_radius_m) {
                (Some(j2), Some(radius)) => MassiveBody::oblate(
                    body.name.clone(),
                    gravitational_parameter(body.mu_m3_s2),
                    j2,
                    metres(radius),
                    rotation_axis(
                        body.axis_right_ascension_deg.unwrap_or(0.0),
                        body.axis_declination_deg.unwrap_or(90.0),
                    ),
                ),
                _ => MassiveBody::new(
                    body.name.clone(),
                    gravitational_parameter(body.mu_m3_s2),
                ),
            });
            initial_states.push(states[body.name.as_str()]);
        }
        Ok(Ephemeris::new(
            bodies,
            initial_states,
            self.epoch(),
            fitting_tolerance,
            parameters,
        ))
    }
}

/// Unit vector towards the given right ascension and declination.
fn rotation_axis(right_ascension_deg: f64, declination_deg: f64) -> Vector<f64, Icrs> {
    let ra = right_ascension_deg.to_radians();
    let dec = declination_deg.to_radians();
    Vector::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}
