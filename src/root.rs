//! Bracketed root finding with Brent's method.
//!
//! Combines bisection, the secant method and inverse quadratic
//! interpolation. The bracket may be given in either order, which lets
//! backward integration localize events on a decreasing time interval.
//!
//! Reference: Brent, R.P. (1973). "Algorithms for Minimization without
//! Derivatives". Prentice-Hall.

use thiserror::Error;

/// A located root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// Abscissa of the root
    pub x: f64,
    /// Function value at `x`
    pub fx: f64,
    /// Function evaluations used
    pub iterations: usize,
}

/// Errors from Brent's method
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BrentError {
    /// The endpoint values have the same strict sign.
    #[error("root not bracketed: f({a}) = {fa}, f({b}) = {fb}")]
    NotBracketed {
        /// First endpoint
        a: f64,
        /// Second endpoint
        b: f64,
        /// Function value at `a`
        fa: f64,
        /// Function value at `b`
        fb: f64,
    },
    /// The bracket did not shrink below the tolerance in time.
    #[error("no convergence after {iterations} iterations, best estimate {best} (f = {f_best})")]
    MaxIterations {
        /// Best root estimate so far
        best: f64,
        /// Function value at the best estimate
        f_best: f64,
        /// Number of iterations performed
        iterations: usize,
    },
}

/// Brent root finder
#[derive(Debug, Clone, PartialEq)]
pub struct Brent {
    /// Convergence tolerance on the bracket width
    pub tol: f64,
    /// Maximum iterations
    pub max_iter: usize,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            tol: 1e-12,
            max_iter: 100,
        }
    }
}

impl Brent {
    /// Create a solver with the given tolerance and iteration limit.
    pub fn new(tol: f64, max_iter: usize) -> Self {
        Self { tol, max_iter }
    }

    /// Find a root of `f` between `a` and `b`, given `fa = f(a)` and `fb = f(b)`.
    ///
    /// An endpoint with a value of exactly zero is returned without
    /// evaluating `f`. [`Root::iterations`] counts evaluations of `f`.
    pub fn find_root<F>(&self, mut f: F, a: f64, fa: f64, b: f64, fb: f64) -> Result<Root, BrentError>
    where
        F: FnMut(f64) -> f64,
    {
        if fa * fb > 0.0 {
            return Err(BrentError::NotBracketed { a, b, fa, fb });
        }

        let mut bracket = Bracket::new(a, fa, b, fb);
        let mut iterations = 0;
        loop {
            if bracket.fb == 0.0 || bracket.width() <= self.tol {
                return Ok(Root {
                    x: bracket.b,
                    fx: bracket.fb,
                    iterations,
                });
            }
            if iterations == self.max_iter {
                return Err(BrentError::MaxIterations {
                    best: bracket.b,
                    f_best: bracket.fb,
                    iterations,
                });
            }

            let interpolated = bracket.interpolate().filter(|&s| bracket.accepts(s, self.tol));
            let bisected = interpolated.is_none();
            let s = interpolated.unwrap_or_else(|| bracket.midpoint());

            iterations += 1;
            bracket.advance(s, f(s), bisected);
        }
    }
}

/// Working state of one Brent search.
///
/// `b` is the best estimate and `a` the contrapoint, so `[a, b]` always
/// brackets the root. `c` and `d` are the two previous values of `b`.
struct Bracket {
    a: f64,
    fa: f64,
    b: f64,
    fb: f64,
    c: f64,
    fc: f64,
    d: f64,
    bisected: bool,
}

impl Bracket {
    fn new(a: f64, fa: f64, b: f64, fb: f64) -> Self {
        let mut bracket = Self {
            a,
            fa,
            b,
            fb,
            c: a,
            fc: fa,
            d: a,
            bisected: true,
        };
        bracket.keep_best();
        bracket.c = bracket.a;
        bracket.fc = bracket.fa;
        bracket.d = bracket.a;
        bracket
    }

    fn keep_best(&mut self) {
        if self.fa.abs() < self.fb.abs() {
            std::mem::swap(&mut self.a, &mut self.b);
            std::mem::swap(&mut self.fa, &mut self.fb);
        }
    }

    fn width(&self) -> f64 {
        (self.b - self.a).abs()
    }

    fn midpoint(&self) -> f64 {
        0.5 * (self.a + self.b)
    }

    /// Inverse quadratic interpolation through `a`, `b` and `c`, falling back
    /// to the secant through `a` and `b`. `None` when both are degenerate.
    fn interpolate(&self) -> Option<f64> {
        let Self { a, fa, b, fb, c, fc, .. } = *self;
        if fa != fc && fb != fc && fa != fb {
            Some(
                a * fb * fc / ((fa - fb) * (fa - fc))
                    + b * fa * fc / ((fb - fa) * (fb - fc))
                    + c * fa * fb / ((fc - fa) * (fc - fb)),
            )
        } else if fb != fa {
            Some(b - fb * (b - a) / (fb - fa))
        } else {
            None
        }
    }

    /// Whether an interpolated abscissa lies between `(3a + b) / 4` and `b`
    /// and shrinks the step at least as fast as bisection would.
    fn accepts(&self, s: f64, tol: f64) -> bool {
        let previous = if self.bisected {
            (self.b - self.c).abs()
        } else {
            (self.c - self.d).abs()
        };
        (s - (3.0 * self.a + self.b) / 4.0) * (s - self.b) <= 0.0
            && (s - self.b).abs() < previous / 2.0
            && previous >= tol
    }

    fn advance(&mut self, s: f64, fs: f64, bisected: bool) {
        self.d = self.c;
        self.c = self.b;
        self.fc = self.fb;
        if self.fa * fs < 0.0 {
            self.b = s;
            self.fb = fs;
        } else {
            self.a = s;
            self.fa = fs;
        }
        self.bisected = bisected;
        self.keep_best();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn solve<F: Fn(f64) -> f64>(brent: &Brent, f: F, a: f64, b: f64) -> Result<Root, BrentError> {
        let (fa, fb) = (f(a), f(b));
        brent.find_root(f, a, fa, b, fb)
    }

    #[test]
    fn test_sqrt_two() {
        let root = solve(&Brent::default(), |x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(root.x, 2f64.sqrt(), epsilon = 1e-12);
        assert!(root.fx.abs() < 1e-11);
        println!("sqrt(2) found in {} iterations", root.iterations);
    }

    #[test]
    fn test_reversed_bracket() {
        // f(x) = sin(x), root at π, bracket given high to low
        let root = solve(&Brent::default(), f64::sin, 4.0, 3.0).unwrap();
        assert_abs_diff_eq!(root.x, std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_not_bracketed() {
        let result = solve(&Brent::default(), |x| x * x + 1.0, -1.0, 1.0);
        assert!(matches!(result, Err(BrentError::NotBracketed { .. })));
    }

    #[test]
    fn test_zero_endpoint_returns_without_iterating() {
        let root = solve(&Brent::default(), |x| x - 1.0, 0.0, 1.0).unwrap();
        assert_eq!(root.x, 1.0);
        assert_eq!(root.iterations, 0);

        let root = solve(&Brent::default(), |x| x + 1.0, -1.0, 1.0).unwrap();
        assert_eq!(root.x, -1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn test_triple_root() {
        let root = solve(&Brent::new(1e-12, 200), |x| (x - 1.0).powi(3), 0.0, 2.0).unwrap();
        assert!((root.x - 1.0).abs() < 1e-4, "triple root {} should be near 1", root.x);
    }

    #[test]
    fn test_iteration_limit() {
        let brent = Brent::new(0.0, 3);
        let result = solve(&brent, |x| x.powi(3) - x - 2.0, 1.0, 2.0);
        match result {
            Err(BrentError::MaxIterations { best, iterations, .. }) => {
                assert_eq!(iterations, 3);
                assert!((1.0..=2.0).contains(&best));
            }
            other => panic!("expected MaxIterations, got {:?}", other),
        }
    }

    #[test]
    fn test_iterations_count_evaluations() {
        let mut evals = 0;
        let f = |x: f64| {
            evals += 1;
            x.powi(3) - x - 2.0
        };
        let root = Brent::default().find_root(f, 1.0, -2.0, 2.0, 4.0).unwrap();
        assert_eq!(root.iterations, evals);
        println!("cubic root in {} evaluations", evals);
    }

    #[test]
    fn test_cubic() {
        let root = solve(&Brent::default(), |x| x.powi(3) - x - 2.0, 1.0, 2.0).unwrap();
        assert!(root.fx.abs() < 1e-11);
        assert_abs_diff_eq!(root.x, 1.5213797068045676, epsilon = 1e-10);
    }
}
