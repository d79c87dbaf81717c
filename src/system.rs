//! Dynamical systems: dx/dt = f(t, x)

/// System of ordinary differential equations driven by the integrator.
///
/// `rhs` must be a pure function of `(t, x)`. Embedded-pair steppers call it
/// many times per step, and event localization calls it again inside an
/// accepted step, so it must not carry side effects between calls.
///
/// A derivative containing NaN or infinity is not reported here; the
/// integrator detects the non-finite trial state it produces and stops with
/// [`IntegrationError::NonFiniteState`](crate::IntegrationError::NonFiniteState).
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side of the ODE system
    ///
    /// # Arguments
    /// * `t` - Current time
    /// * `x` - Current state vector
    /// * `dxdt` - Output: derivative dx/dt
    fn rhs(&self, t: f64, x: &[f64; N], dxdt: &mut [f64; N]);
}

impl<const N: usize, S: OdeSystem<N> + ?Sized> OdeSystem<N> for &S {
    fn rhs(&self, t: f64, x: &[f64; N], dxdt: &mut [f64; N]) {
        (**self).rhs(t, x, dxdt)
    }
}
