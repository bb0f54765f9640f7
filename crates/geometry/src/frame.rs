//! Reference frames as phantom types.

use std::marker::PhantomData;

use crate::grassmann::{Bivector, Vector};
use crate::inertia::InertiaTensor;
use nbody_quantities::Quantity;

/// Marker for a reference frame tag.
pub trait Frame: Copy + Clone + std::fmt::Debug + Default + PartialEq + 'static {}

/// Declares a new reference-frame tag.
#[macro_export]
macro_rules! declare_frame {
    ($(#[$attr:meta])* $vis:vis struct $name:ident) => {
        $(#[$attr])*
        #[derive(
            Debug,
            Default,
            Clone,
            Copy,
            PartialEq,
            Eq,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        $vis struct $name;

        impl $crate::Frame for $name {}
    };
}

declare_frame!(
    /// The non-rotating inertial frame at the solar-system barycentre.
    pub struct Barycentric
);
declare_frame!(
    /// The ICRS equator-of-J2000 frame used by body configurations.
    pub struct Icrs
);

/// The identity map between two frames whose axes are aligned.
///
/// Relabelling is still an explicit operation; there is no coercion.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity<From: Frame, To: Frame> {
    phantom: PhantomData<(From, To)>,
}

impl<From: Frame, To: Frame> Identity<From, To> {
    pub fn new() -> Self {
        Self {
            phantom: PhantomData,
        }
    }

    #[inline]
    pub fn map_vector<Q: Quantity>(&self, v: &Vector<Q, From>) -> Vector<Q, To> {
        Vector::from_coords(v.coords())
    }

    #[inline]
    pub fn map_bivector<Q: Quantity>(&self, b: &Bivector<Q, From>) -> Bivector<Q, To> {
        Bivector::from_coords(b.coords())
    }

    #[inline]
    pub fn map_inertia(&self, tensor: &InertiaTensor<From>) -> InertiaTensor<To> {
        InertiaTensor::from_matrix(tensor.matrix())
    }
}
