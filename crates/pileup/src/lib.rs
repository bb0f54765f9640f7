//! Pile-ups: groups of touching or docked rigid parts integrated as one
//! point mass with angular-momentum bookkeeping, and the vessels whose
//! trajectories drive the ephemeris.

mod mechanical_system;
mod part;
mod pile_up;
mod vessel;

pub use mechanical_system::MechanicalSystem;
pub use part::{Part, PartId};
pub use pile_up::{
    ApparentBubble, NonRotatingPileUp, PileUp, PileUpMessage, PileUpReadError, RigidPart,
    default_history_parameters, default_psychohistory_parameters,
};
pub use vessel::Vessel;
