//! XZ-plane crossings of an Earth-Moon CR3BP orbit.
//!
//! Mirrors the plain-slice entry point: a 6-component initial state, a time
//! span and the number of crossings to stop at.
//!
//! Run with:
//!   cargo run --example xz_crossing

use event_integrator::{propagate, Cr3bp, Options};

fn main() {
    let mu = 0.0121505856;
    let r: f64 = 0.2;
    let x0 = [r - mu, 0.0, 0.0, 0.0, r * (((1.0 - mu) / r.powi(3)).sqrt() - 1.0), 0.0];

    let options = Options {
        abs_tol: 1e-12,
        rel_tol: 1e-12,
        initial_step: 1e-3,
        ..Default::default()
    };

    println!("XZ-Plane Crossings: Earth-Moon CR3BP (mu = {})", mu);
    println!("  Initial state: {:?}", x0);
    println!();

    let result = match propagate(&x0, &[0.0, 10.0], mu, 4, &options) {
        Ok(result) => result,
        Err(failure) => {
            eprintln!("{}", failure);
            std::process::exit(1);
        }
    };

    let sys = Cr3bp::new(mu);
    println!("  Status: {:?} after {} samples", result.status, result.t.len());
    println!("  {:>3}  {:>12}  {:>14}  {:>14}  {:>12}", "#", "t", "x", "vy", "y");
    for (k, (t, xe)) in result.te.iter().zip(&result.xe).enumerate() {
        println!(
            "  {:3}  {:12.8}  {:14.10}  {:14.10}  {:12.3e}",
            k + 1,
            t,
            xe[0],
            xe[4],
            xe[1]
        );
    }

    let c0 = sys.jacobi_constant(&x0);
    let cf = result.x.last().map(|x| sys.jacobi_constant(x)).unwrap_or(c0);
    println!();
    println!("  Jacobi constant drift: {:.3e}", (cf - c0).abs());
    println!("  Stats: {:?}", result.stats);
}
