//! State-transition matrix propagation to the second XZ crossing.
//!
//! Integrates the 42-component variational system and prints the
//! sensitivity of the crossing state to the initial state.
//!
//! Run with:
//!   cargo run --example stm_propagation

use event_integrator::{AxisCrossing, Cr3bp, EventIntegrator, Rkf78, Status, TimeSpan, Tolerances};

fn main() {
    let mu = 0.0121505856;
    let sys = Cr3bp::new(mu);

    // slightly inclined orbit about the larger primary
    let r: f64 = 0.25;
    let vy = r * (((1.0 - mu) / r.powi(3)).sqrt() - 1.0);
    let x0 = Cr3bp::augment(&[r - mu, 0.0, 0.0, 0.0, vy, 0.05]);

    let mut event = AxisCrossing::xz_plane(2);
    let mut integrator = EventIntegrator::new(Rkf78::new(), Tolerances::new(1e-13, 1e-13), 1e-3);
    let span = TimeSpan::new(0.0, 5.0).unwrap();

    let solution = match integrator.integrate_adaptive(&sys, &mut event, &x0, span) {
        Ok(solution) => solution,
        Err(failure) => {
            eprintln!("{}", failure);
            std::process::exit(1);
        }
    };

    println!("STM Propagation: Earth-Moon CR3BP");
    println!("  Status: {:?}", solution.status);
    if solution.status != Status::Terminated {
        return;
    }

    let t_cross = solution.events.t[1];
    let xf = &solution.events.x[1];
    println!("  Second XZ crossing at t = {:.10}", t_cross);
    println!();
    println!("  Φ(t, 0):");
    for i in 0..6 {
        let row: Vec<String> = (0..6)
            .map(|j| format!("{:12.5e}", xf[6 + 6 * i + j]))
            .collect();
        println!("    [{}]", row.join(" "));
    }

    // the CR3BP flow is symplectic, so det Φ stays one
    println!();
    println!("  det Φ = {:.12}", determinant(xf));
}

/// Determinant of the 6x6 STM block by Gaussian elimination.
fn determinant(x: &[f64; 42]) -> f64 {
    let mut m = [[0.0; 6]; 6];
    for (i, row) in m.iter_mut().enumerate() {
        row.copy_from_slice(&x[6 + 6 * i..12 + 6 * i]);
    }

    let mut det = 1.0;
    for col in 0..6 {
        let pivot = (col..6)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        if m[pivot][col] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            m.swap(pivot, col);
            det = -det;
        }
        det *= m[col][col];
        for row in col + 1..6 {
            let factor = m[row][col] / m[col][col];
            for k in col..6 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }
    det
}
