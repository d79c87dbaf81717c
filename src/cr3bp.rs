//! Circular restricted three-body problem in the rotating frame.
//!
//! Nondimensional units: the primaries are one length unit apart, the
//! rotation rate is one, and the total mass is one. The larger primary sits
//! at `(-mu, 0, 0)` and the smaller at `(1 - mu, 0, 0)`.
//!
//! Two state forms are supported:
//!
//! - 6 components: position and velocity `[x, y, z, vx, vy, vz]`
//! - 42 components: the 6-state followed by the state-transition matrix Φ in
//!   row-major order, `x[6 + 6 * i + j] = Φ[i][j]`, integrated with the
//!   variational equations `Φ̇ = A(x) Φ`

use crate::system::OdeSystem;

/// Components of the position/velocity state.
pub const STATE_DIM: usize = 6;

/// Components of the state augmented with the state-transition matrix.
pub const STM_STATE_DIM: usize = STATE_DIM + STATE_DIM * STATE_DIM;

/// CR3BP dynamics with mass parameter `mu = m2 / (m1 + m2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cr3bp {
    /// Mass parameter
    pub mu: f64,
}

/// Quantities shared by the equations of motion and their Jacobian.
struct Geometry {
    // offsets from each primary
    d1: [f64; 3],
    d2: [f64; 3],
    r1: f64,
    r2: f64,
    r1_3: f64,
    r2_3: f64,
    r1_5: f64,
    r2_5: f64,
}

impl Cr3bp {
    /// Create the model for a given mass parameter.
    pub fn new(mu: f64) -> Self {
        Self { mu }
    }

    fn geometry(&self, x: &[f64]) -> Geometry {
        let d1 = [x[0] + self.mu, x[1], x[2]];
        let d2 = [x[0] - 1.0 + self.mu, x[1], x[2]];
        let r1 = (d1[0] * d1[0] + d1[1] * d1[1] + d1[2] * d1[2]).sqrt();
        let r2 = (d2[0] * d2[0] + d2[1] * d2[1] + d2[2] * d2[2]).sqrt();
        let r1_3 = r1 * r1 * r1;
        let r2_3 = r2 * r2 * r2;
        Geometry {
            d1,
            d2,
            r1,
            r2,
            r1_3,
            r2_3,
            r1_5: r1_3 * r1 * r1,
            r2_5: r2_3 * r2 * r2,
        }
    }

    /// Pseudo-potential `U = (x² + y²)/2 + (1 - mu)/r1 + mu/r2`.
    pub fn pseudo_potential(&self, x: &[f64]) -> f64 {
        let g = self.geometry(x);
        0.5 * (x[0] * x[0] + x[1] * x[1]) + (1.0 - self.mu) / g.r1 + self.mu / g.r2
    }

    /// Jacobi constant `C = 2U - v²`, conserved along every trajectory.
    ///
    /// Only the first six components of `x` are read.
    pub fn jacobi_constant(&self, x: &[f64]) -> f64 {
        let v2 = x[3] * x[3] + x[4] * x[4] + x[5] * x[5];
        2.0 * self.pseudo_potential(x) - v2
    }

    /// Append an identity state-transition matrix to a 6-state.
    pub fn augment(x0: &[f64; STATE_DIM]) -> [f64; STM_STATE_DIM] {
        let mut x = [0.0; STM_STATE_DIM];
        x[..STATE_DIM].copy_from_slice(x0);
        for i in 0..STATE_DIM {
            x[STATE_DIM + STATE_DIM * i + i] = 1.0;
        }
        x
    }

    /// Position and velocity derivatives; writes `dxdt[..6]`.
    fn equations_of_motion(&self, x: &[f64], g: &Geometry, dxdt: &mut [f64]) {
        let m1 = 1.0 - self.mu;
        let m2 = self.mu;

        dxdt[0] = x[3];
        dxdt[1] = x[4];
        dxdt[2] = x[5];
        dxdt[3] = 2.0 * x[4] + x[0] - m1 * g.d1[0] / g.r1_3 - m2 * g.d2[0] / g.r2_3;
        dxdt[4] = -2.0 * x[3] + x[1] - m1 * g.d1[1] / g.r1_3 - m2 * g.d2[1] / g.r2_3;
        dxdt[5] = -m1 * g.d1[2] / g.r1_3 - m2 * g.d2[2] / g.r2_3;
    }

    /// Hessian of the pseudo-potential.
    fn potential_hessian(&self, g: &Geometry) -> [[f64; 3]; 3] {
        let m1 = 1.0 - self.mu;
        let m2 = self.mu;

        let mut hessian = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                let mut u = 3.0 * m1 * g.d1[i] * g.d1[j] / g.r1_5 + 3.0 * m2 * g.d2[i] * g.d2[j] / g.r2_5;
                if i == j {
                    u -= m1 / g.r1_3 + m2 / g.r2_3;
                }
                hessian[i][j] = u;
            }
        }
        // centrifugal term acts in the rotation plane only
        hessian[0][0] += 1.0;
        hessian[1][1] += 1.0;
        hessian
    }
}

impl OdeSystem<STATE_DIM> for Cr3bp {
    fn rhs(&self, _t: f64, x: &[f64; STATE_DIM], dxdt: &mut [f64; STATE_DIM]) {
        let g = self.geometry(x);
        self.equations_of_motion(x, &g, dxdt);
    }
}

impl OdeSystem<STM_STATE_DIM> for Cr3bp {
    #[allow(clippy::needless_range_loop)]
    fn rhs(&self, _t: f64, x: &[f64; STM_STATE_DIM], dxdt: &mut [f64; STM_STATE_DIM]) {
        let g = self.geometry(x);
        self.equations_of_motion(x, &g, dxdt);

        let hessian = self.potential_hessian(&g);
        let phi = |i: usize, j: usize| x[STATE_DIM + STATE_DIM * i + j];

        for j in 0..STATE_DIM {
            // upper block: d/dt Φ[i] = Φ[i + 3]
            for i in 0..3 {
                dxdt[STATE_DIM + STATE_DIM * i + j] = phi(i + 3, j);
            }
            // lower block: ∇²U Φ[0..3] + Ω Φ[3..6]
            for i in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += hessian[i][k] * phi(k, j);
                }
                sum += match i {
                    0 => 2.0 * phi(4, j),
                    1 => -2.0 * phi(3, j),
                    _ => 0.0,
                };
                dxdt[STATE_DIM + STATE_DIM * (i + 3) + j] = sum;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Tolerances;
    use crate::events::NoEvent;
    use crate::integrator::EventIntegrator;
    use crate::span::TimeSpan;
    use crate::stepper::Rkf78;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const EARTH_MOON_MU: f64 = 0.0121505856;
    const X0: [f64; 6] = [0.5, 0.1, 0.05, 0.0, 0.5, 0.02];

    fn integrate<const N: usize>(x0: &[f64; N], tf: f64) -> [f64; N]
    where
        Cr3bp: OdeSystem<N>,
    {
        let sys = Cr3bp::new(EARTH_MOON_MU);
        let mut integrator = EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-14, 1e-13), 1e-3);
        let solution = integrator
            .integrate_adaptive(&sys, &mut NoEvent::default(), x0, TimeSpan::new(0.0, tf).unwrap())
            .unwrap();
        *solution.trajectory.x.last().unwrap()
    }

    #[test]
    fn test_equal_masses_midpoint_is_equilibrium() {
        let sys = Cr3bp::new(0.5);
        let mut dxdt = [0.0; 6];
        OdeSystem::<6>::rhs(&sys, 0.0, &[0.0; 6], &mut dxdt);
        for d in dxdt {
            assert_abs_diff_eq!(d, 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_augmented_rhs_matches_state_rhs() {
        let sys = Cr3bp::new(EARTH_MOON_MU);
        let mut d6 = [0.0; 6];
        let mut d42 = [0.0; 42];
        OdeSystem::<6>::rhs(&sys, 0.0, &X0, &mut d6);
        OdeSystem::<42>::rhs(&sys, 0.0, &Cr3bp::augment(&X0), &mut d42);
        assert_eq!(&d42[..6], &d6[..]);

        // with Φ = I the STM derivative is the Jacobian itself
        assert_eq!(d42[6 + 3], 1.0);
        assert_eq!(d42[6 + 6 * 3 + 4], 2.0);
        assert_eq!(d42[6 + 6 * 4 + 3], -2.0);
    }

    #[test]
    fn test_stm_matches_finite_differences() {
        let tf = 0.5;
        let delta = 1e-6;
        let augmented = integrate(&Cr3bp::augment(&X0), tf);

        let mut max_diff: f64 = 0.0;
        for j in 0..6 {
            let mut plus = X0;
            let mut minus = X0;
            plus[j] += delta;
            minus[j] -= delta;
            let x_plus = integrate(&plus, tf);
            let x_minus = integrate(&minus, tf);

            for i in 0..6 {
                let fd = (x_plus[i] - x_minus[i]) / (2.0 * delta);
                let stm = augmented[6 + 6 * i + j];
                max_diff = max_diff.max((fd - stm).abs());
                assert_relative_eq!(stm, fd, epsilon = 1e-6, max_relative = 1e-5);
            }
        }
        println!("max |Φ - finite difference| = {:.3e}", max_diff);
    }

    #[test]
    fn test_jacobi_constant_conserved() {
        let sys = Cr3bp::new(EARTH_MOON_MU);
        let c0 = sys.jacobi_constant(&X0);
        let xf = integrate(&X0, 2.0);
        let cf = sys.jacobi_constant(&xf);

        println!("C0 = {:.15}, Cf = {:.15}", c0, cf);
        assert_relative_eq!(cf, c0, max_relative = 1e-11);
    }

    #[test]
    fn test_augment_identity() {
        let x = Cr3bp::augment(&X0);
        assert_eq!(&x[..6], &X0[..]);
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(x[6 + 6 * i + j], if i == j { 1.0 } else { 0.0 });
            }
        }
    }
}
