//! Chebyshev-series approximation of vector-valued functions of time.

use serde::{Deserialize, Serialize};

use nbody_geometry::{Displacement, Frame, Position, Velocity};
use nbody_quantities::{Instant, Length, Quantity, Time};

/// Smallest degree attempted when fitting to a tolerance.
pub const MIN_DEGREE: usize = 3;
/// Largest representable degree; fits never exceed it.
pub const MAX_DEGREE: usize = 17;

/// A vector-valued Chebyshev series over a closed time interval
/// `[t_min, t_max]`, evaluable anywhere inside with one Clenshaw
/// recurrence. The derivative series is formed at construction so velocity
/// queries are as cheap as position queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ChebyshevSeries<F: Frame> {
    t_min: Instant,
    t_max: Instant,
    coefficients: Vec<Displacement<F>>,
    derivative_coefficients: Vec<Velocity<F>>,
}

impl<F: Frame> ChebyshevSeries<F> {
    /// Interpolates `f` at the `degree + 1` Chebyshev–Lobatto points of
    /// `[t_min, t_max]`, reducing the samples to coefficients with a
    /// discrete cosine transform.
    pub fn fit(
        f: &dyn Fn(Instant) -> Position<F>,
        degree: usize,
        t_min: Instant,
        t_max: Instant,
    ) -> Self {
        assert!(degree >= 1, "degree must be at least 1");
        assert!(t_max > t_min, "empty fitting interval");
        let n = degree;
        let midpoint = t_min + (t_max - t_min) * 0.5;
        let half_width = (t_max - t_min) * 0.5;

        // Lobatto nodes x_k = cos(kπ/n), ordered from t_max down to t_min.
        let samples: Vec<Displacement<F>> = (0..=n)
            .map(|k| {
                let x = (k as f64 * std::f64::consts::PI / n as f64).cos();
                f(midpoint + half_width * x).displacement_from_origin()
            })
            .collect();

        // DCT-I with the boundary terms halved; the j = 0 and j = n
        // coefficients are halved once more so that evaluation is a plain
        // sum of c_j T_j.
        let mut coefficients = Vec::with_capacity(n + 1);
        for j in 0..=n {
            let mut sum = Displacement::<F>::zero();
            for (k, sample) in samples.iter().enumerate() {
                let weight = if k == 0 || k == n { 0.5 } else { 1.0 };
                let angle = std::f64::consts::PI * (j * k) as f64 / n as f64;
                sum += *sample * (weight * angle.cos());
            }
            let boundary = if j == 0 || j == n { 0.5 } else { 1.0 };
            coefficients.push(sum * (2.0 * boundary / n as f64));
        }

        let derivative_coefficients =
            Self::differentiate(&coefficients, (t_max - t_min) * 0.5);

        Self {
            t_min,
            t_max,
            coefficients,
            derivative_coefficients,
        }
    }

    /// Fits with the degree doubling from [`MIN_DEGREE`] up to
    /// [`MAX_DEGREE`] until the midpoint error estimate meets `tolerance`.
    /// Returns `None` when even the maximal degree is insufficient.
    pub fn fit_to_tolerance(
        f: &dyn Fn(Instant) -> Position<F>,
        t_min: Instant,
        t_max: Instant,
        tolerance: Length,
    ) -> Option<Self> {
        let mut degree = MIN_DEGREE;
        loop {
            let series = Self::fit(f, degree, t_min, t_max);
            if series.error_estimate(f) <= tolerance {
                return Some(series);
            }
            if degree == MAX_DEGREE {
                return None;
            }
            degree = (degree * 2).min(MAX_DEGREE);
        }
    }

    pub fn t_min(&self) -> Instant {
        self.t_min
    }

    pub fn t_max(&self) -> Instant {
        self.t_max
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn evaluate_position(&self, t: Instant) -> Position<F> {
        Position::origin() + self.clenshaw(&self.coefficients, t)
    }

    pub fn evaluate_velocity(&self, t: Instant) -> Velocity<F> {
        self.clenshaw(&self.derivative_coefficients, t)
    }

    /// Largest deviation from `f`, sampled at the interior midpoints
    /// between the Lobatto nodes (points not used by the fit).
    pub fn error_estimate(&self, f: &dyn Fn(Instant) -> Position<F>) -> Length {
        let n = self.degree();
        let midpoint = self.t_min + (self.t_max - self.t_min) * 0.5;
        let half_width = (self.t_max - self.t_min) * 0.5;
        let mut worst = Length::ZERO;
        for k in 0..n {
            let x = ((k as f64 + 0.5) * std::f64::consts::PI / n as f64).cos();
            let t = midpoint + half_width * x;
            let error = (self.evaluate_position(t) - f(t)).norm();
            worst = worst.max(error);
        }
        worst
    }

    fn scaled(&self, t: Instant) -> f64 {
        assert!(
            t >= self.t_min && t <= self.t_max,
            "evaluation at {t} outside the fitted interval [{}, {}]",
            self.t_min,
            self.t_max
        );
        // Map [t_min, t_max] onto [-1, 1].
        2.0 * ((t - self.t_min) / (self.t_max - self.t_min)) - 1.0
    }

    fn clenshaw<Q>(
        &self,
        coefficients: &[nbody_geometry::Vector<Q, F>],
        t: Instant,
    ) -> nbody_geometry::Vector<Q, F>
    where
        Q: Quantity + std::ops::Mul<f64, Output = Q>,
    {
        let x = self.scaled(t);
        let n = coefficients.len() - 1;
        let mut b1 = nbody_geometry::Vector::<Q, F>::zero();
        let mut b2 = nbody_geometry::Vector::<Q, F>::zero();
        for j in (1..=n).rev() {
            let b = coefficients[j] + b1 * (2.0 * x) - b2;
            b2 = b1;
            b1 = b;
        }
        coefficients[0] + b1 * x - b2
    }

    /// Coefficients of the derivative series, by the usual downward
    /// recurrence, including the chain-rule factor for the interval width.
    fn differentiate(
        coefficients: &[Displacement<F>],
        half_width: Time,
    ) -> Vec<Velocity<F>> {
        let n = coefficients.len() - 1;
        if n == 0 {
            return vec![Velocity::<F>::zero()];
        }
        // d_j = d_{j+2} + 2 (j+1) c_{j+1}, downwards, then d_0 is halved.
        let mut derivative = vec![Velocity::<F>::zero(); n];
        for j in (0..n).rev() {
            let above = if j + 2 < n {
                derivative[j + 2]
            } else {
                Velocity::zero()
            };
            derivative[j] = above + coefficients[j + 1] * (2.0 * (j + 1) as f64) / half_width;
        }
        derivative[0] = derivative[0] * 0.5;
        derivative
    }
}
